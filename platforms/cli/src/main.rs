use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use turing_puzzle::{
    analyze, find_counterexample, generate_challenge, generate_challenge_with, resolve_challenge,
    Challenge, Machine, Outcome, RuleLoader, Solution, Symbol, ACCURACY_TRIALS, CHALLENGE_NAMES,
    MAX_STEPS,
};

#[derive(Parser, Debug)]
#[command(
    name = "turing-puzzle",
    version,
    about = "Turing machine puzzles: generate challenges and check rule sets against them",
    arg_required_else_help = true
)]
struct Cli {
    /// Print debug logs, including the instance a rule set failed on. RUST_LOG overrides this.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available challenges.
    List,
    /// Generate an instance of a challenge and print it.
    Show {
        /// Challenge index or name.
        challenge: String,
        /// Seed for the instance generator.
        #[arg(long)]
        seed: Option<u64>,
        /// Print the instance as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run a rule file on a single instance of its challenge.
    Run {
        /// Rule file (`.rules` text or `.json`).
        #[arg(short, long)]
        rules: PathBuf,
        /// Challenge index or name. Overrides the file's `challenge:` header.
        #[arg(short, long)]
        challenge: Option<String>,
        /// Seed for the instance generator.
        #[arg(long)]
        seed: Option<u64>,
        /// Print every transition.
        #[arg(short, long)]
        trace: bool,
    },
    /// Check whether a rule file solves every generated instance of its challenge.
    Validate {
        /// Rule file (`.rules` text or `.json`).
        #[arg(short, long)]
        rules: PathBuf,
        /// Challenge index or name. Overrides the file's `challenge:` header.
        #[arg(short, long)]
        challenge: Option<String>,
        /// Seed for the instance generator.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of instances to check.
        #[arg(long, default_value_t = ACCURACY_TRIALS, value_parser = trials_parser())]
        trials: usize,
    },
    /// Validate every rule file in a directory against the challenge named in its header.
    ValidateDir {
        directory: PathBuf,
        /// Seed for the instance generator.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of instances to check per file.
        #[arg(long, default_value_t = ACCURACY_TRIALS, value_parser = trials_parser())]
        trials: usize,
    },
}

/// Parses an instance count of at least one.
fn trials_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let passed = match cli.command {
        Commands::List => run_list()?,
        Commands::Show {
            challenge,
            seed,
            json,
        } => run_show(&challenge, seed, json)?,
        Commands::Run {
            rules,
            challenge,
            seed,
            trace,
        } => run_single(&rules, challenge.as_deref(), seed, trace)?,
        Commands::Validate {
            rules,
            challenge,
            seed,
            trials,
        } => {
            let solution = load_solution(&rules)?;
            run_validate(&solution, challenge.as_deref(), seed, trials)?
        }
        Commands::ValidateDir {
            directory,
            seed,
            trials,
        } => run_validate_dir(&directory, seed, trials)?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_solution(path: &Path) -> Result<Solution> {
    RuleLoader::load(path).with_context(|| format!("failed to load rules from {}", path.display()))
}

/// Picks the challenge from the command line, falling back to the file header.
fn target_index(solution: &Solution, reference: Option<&str>) -> Result<usize> {
    let Some(reference) = reference.or(solution.challenge.as_deref()) else {
        bail!("no challenge given: pass --challenge or add a `challenge:` header to the file");
    };

    resolve_challenge(reference).with_context(|| format!("unknown challenge '{reference}'"))
}

fn run_list() -> Result<bool> {
    for (index, name) in CHALLENGE_NAMES.iter().enumerate() {
        let challenge = generate_challenge(index)?;
        let states = match challenge.final_state() {
            Some(end) => format!("q0..q{}, ends in q{}", challenge.max_state, end),
            None => format!("q0..q{}", challenge.max_state),
        };
        println!("{index:>2}  {name:<24} {states}");
    }

    Ok(true)
}

fn run_show(reference: &str, seed: Option<u64>, json: bool) -> Result<bool> {
    let index = resolve_challenge(reference)?;
    let challenge = generate_challenge_with(index, &mut rng(seed))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&challenge)?);
        return Ok(true);
    }

    println!("#{index} {}", challenge.name);
    println!("start: {}", render_tape(&challenge.start_tape, Some(challenge.start_index)));
    println!("goal:  {}", render_tape(&challenge.goal_tape, None));

    let labels: Vec<String> = challenge
        .origin_states()
        .map(|state| challenge.state_label(state))
        .collect();
    println!("states: {}", labels.join(" "));
    if let Some(end) = challenge.final_state() {
        println!("must end in: {}", challenge.state_label(end));
    }
    println!("symbols: {}", challenge.allowed_characters.join(" "));

    if let Some(tip) = &challenge.tutorial_tip {
        println!("\n{tip}");
    }
    for hint in &challenge.hints {
        println!("hint: {hint}");
    }

    Ok(true)
}

fn run_single(
    path: &Path,
    reference: Option<&str>,
    seed: Option<u64>,
    trace: bool,
) -> Result<bool> {
    let solution = load_solution(path)?;
    let index = target_index(&solution, reference)?;
    let challenge = generate_challenge_with(index, &mut rng(seed))?;
    let mut machine = challenge.machine(&solution.rules);

    if trace {
        print_trace(&challenge, machine.clone());
    }

    let run = machine.run(&challenge.goal_tape, challenge.final_state());

    println!("{}: {} after {} steps", challenge.name, run.outcome, run.steps);
    println!("goal:    {}", render_tape(&challenge.goal_tape, None));
    println!("reached: {}", render_tape(machine.tape(), usize::try_from(machine.head()).ok()));

    let unused = solution.rules.len().saturating_sub(run.coverage.rules.len());
    if unused > 0 {
        println!("{unused} rule(s) never fired on this instance");
    }
    if let (Outcome::NoRule, Some(missing)) = (run.outcome, machine.missing_rule()) {
        println!(
            "no rule for {} reading '{}'",
            challenge.state_label(missing.state),
            missing.read
        );
    }

    Ok(run.outcome.is_accepted())
}

/// Steps a copy of the machine to completion, printing each configuration.
fn print_trace(challenge: &Challenge, mut machine: Machine) {
    let goal = &challenge.goal_tape;
    let final_state = challenge.final_state();

    print_configuration(challenge, &machine);
    while !machine.is_at_goal(goal, final_state) && machine.step_count() < MAX_STEPS {
        if machine.step().is_none() {
            break;
        }
        print_configuration(challenge, &machine);
    }
}

fn print_configuration(challenge: &Challenge, machine: &Machine) {
    println!(
        "{:>4}  {:<4} {}",
        machine.step_count(),
        challenge.state_label(machine.state()),
        render_tape(machine.tape(), usize::try_from(machine.head()).ok())
    );
}

fn run_validate(
    solution: &Solution,
    reference: Option<&str>,
    seed: Option<u64>,
    trials: usize,
) -> Result<bool> {
    let index = target_index(solution, reference)?;
    let mut rng = rng(seed);

    let sample = generate_challenge_with(index, &mut rng)?;
    if let Err(e) = analyze(&solution.rules, &sample) {
        warn!(challenge = %sample.name, "{e}");
    }

    let counterexample = find_counterexample(&solution.rules, trials, || {
        generate_challenge_with(index, &mut rng)
    })?;

    let Some(counterexample) = counterexample else {
        println!("✓ {}: solved {trials}/{trials} instances", sample.name);
        return Ok(true);
    };

    let challenge = &counterexample.challenge;
    println!("✗ {}: {}", challenge.name, counterexample.run.outcome);
    println!(
        "start:   {}",
        render_tape(&challenge.start_tape, Some(challenge.start_index))
    );
    println!("goal:    {}", render_tape(&challenge.goal_tape, None));
    println!("reached: {}", render_tape(&counterexample.final_tape, None));
    debug!(steps = counterexample.run.steps, "counterexample run");

    Ok(false)
}

fn run_validate_dir(directory: &Path, seed: Option<u64>, trials: usize) -> Result<bool> {
    let mut passed = true;

    for result in RuleLoader::load_dir(directory) {
        let ok = match result {
            Ok((path, solution)) => {
                println!("{}", path.display());
                match run_validate(&solution, None, seed, trials) {
                    Ok(ok) => ok,
                    Err(e) => {
                        println!("✗ {e:#}");
                        false
                    }
                }
            }
            Err(e) => {
                println!("✗ {e}");
                false
            }
        };
        passed &= ok;
    }

    Ok(passed)
}

/// Renders a tape with cells separated by spaces and the head cell in brackets.
fn render_tape(tape: &[Symbol], head: Option<usize>) -> String {
    tape.iter()
        .enumerate()
        .map(|(i, cell)| {
            if Some(i) == head {
                format!("[{cell}]")
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
