//! `bdm`: builds or loads a machine, runs it, and optionally saves the result.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::error;

use bitdevice::{
  programs::TAPE_SYMBOLS,
  tape_file,
  Fault,
  Machine,
  Program,
  RunOutcome,
  Snapshot,
  Step,
  DEFAULT_MAX_STEPS
};

#[derive(Parser, Debug)]
#[command(name = "bdm")]
#[command(about = "Runs Turing machines on the bit device", long_about = None)]
struct Cli {
  /// Built-in program: add1, sub1, bb3, bb4 or pal
  #[arg(short, long, conflicts_with = "input")]
  program: Option<Program>,

  /// Load a saved machine instead of building one
  #[arg(short, long, value_name = "FILE", conflicts_with = "random")]
  input: Option<PathBuf>,

  /// Build a random table with this many states
  #[arg(long, value_name = "STATES", conflicts_with = "program")]
  random: Option<usize>,

  /// Seed for `--random`; a fresh one is drawn and logged when absent
  #[arg(long, requires = "random")]
  seed: Option<u64>,

  /// Save the machine here when done
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,

  /// Execute a single instruction step
  #[arg(long)]
  single_step: bool,

  /// Do not print tape snapshots
  #[arg(short, long)]
  quiet: bool,

  /// Build or load the machine without running it
  #[arg(long)]
  no_exec: bool,

  /// Give up after this many instruction steps
  #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
  max_steps: usize,

  /// Print the program and register tables when done
  #[arg(long)]
  dump: bool,
}

fn main() {
  env_logger::init();

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let cli = Cli::parse();

  let mut machine = match open(&cli) {
    Some(machine) => machine,
    None          => process::exit(1)
  };

  if !cli.no_exec {
    if let Err(fault) = execute(&cli, &mut machine) {
      error!("run aborted: {}", fault);
      eprintln!("Fault: {}", fault);
      if cli.dump {
        eprintln!("{}", machine);
      }
      process::exit(2);
    }
  }

  if cli.dump {
    println!("{}", machine);
  }

  if let Some(path) = &cli.output {
    if let Err(failure) = tape_file::save(path, &machine) {
      eprintln!("{}", failure);
      process::exit(1);
    }
  }
}

/// The loaded or built machine, or `None` after reporting why there is none.
fn open(cli: &Cli) -> Option<Machine> {
  match (&cli.input, cli.random) {

    (Some(path), _) => match tape_file::load(path) {
      Ok(machine) => Some(machine),
      Err(failure) => {
        eprintln!("{}", failure);
        None
      }
    },

    (None, Some(states)) => {
      let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
      let built = Machine::random_table(states, TAPE_SYMBOLS, seed).and_then(|mut machine| {
        machine.set_head_position(TAPE_SYMBOLS / 2)?;
        Ok(machine)
      });
      match built {
        Ok(machine) => Some(machine),
        Err(fault) => {
          eprintln!("cannot build a random {}-state table: {}", states, fault);
          None
        }
      }
    }

    (None, None) => {
      let program = cli.program.unwrap_or(Program::Add1);
      match program.build() {
        Ok(machine) => Some(machine),
        Err(fault) => {
          eprintln!("cannot build {}: {}", program, fault);
          None
        }
      }
    }

  } // end match on machine source
}

fn execute(cli: &Cli, machine: &mut Machine) -> Result<(), Fault> {
  match cli.single_step {

    true => {
      let step = machine.step()?;
      if !cli.quiet {
        match step {
          Step::Executed(opcode) => println!("Executed {}", opcode),
          Step::Transition       => println!("Transition"),
          Step::Halted           => println!("Halted"),
        }
        println!("{}", Snapshot::capture(machine, 0)?);
      }
    }

    false => {
      let outcome = machine.run(cli.max_steps, cli.quiet)?;
      if !cli.quiet {
        match outcome {
          RunOutcome::Halted { steps, transitions } => {
            println!("Halted after {} steps ({} transitions)", steps, transitions);
          }
          RunOutcome::StepLimit { steps, transitions } => {
            println!("No halt within {} steps ({} transitions)", steps, transitions);
          }
        }
      }
    }

  } // end match single_step
  Ok(())
}
