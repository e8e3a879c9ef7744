/*!
  The fetch-decode-execute loop.

  A step works entirely through the register file, the way the bootstrap does:

   1. Fetch. Load the header field addresses, read the word count and the instruction pointer,
      read the opcode at the instruction pointer and load the halt sentinel.
   2. A transition entry has the head and the symbol under it checked first, halt state
      included. It then either ends the run, when the instruction pointer is the halt
      sentinel, or hands the state to the bootstrap: the state's offset goes into
      `ACTIVE_STATE_REG` and the instruction pointer moves to the bootstrap's first entry. The
      bootstrap's instructions then run on the following steps.
   3. A generic instruction has its three operands and `next` field read into registers, is
      executed, and, unless it is `Halt` or `Return`, leaves `next` in the instruction pointer.
      `Return` leaves the instruction pointer as its own write set it; `Halt` leaves it alone,
      so a halted machine stays halted.
*/

use std::convert::TryFrom;

use log::{debug, info, warn};

use crate::address::*;
use crate::bytecode::{Instruction, Opcode};
use crate::error::Fault;
use crate::machine::Machine;
use crate::registers::*;
use crate::render::Snapshot;

/// A safety bound on instruction steps, not a correctness requirement.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// What a single call to `Machine::step` did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
  /// A generic instruction ran.
  Executed(Opcode),
  /// A transition entry was fetched and handed to the bootstrap. The tape is unchanged so far.
  Transition,
  /// Nothing ran: the machine is halted.
  Halted,
}

impl Step {
  /// Only transitions are worth showing to a reader of the tape.
  pub fn is_printable(&self) -> bool {
    *self == Step::Transition
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunOutcome {
  Halted    { steps: usize, transitions: usize },
  /// The step bound was reached first.
  StepLimit { steps: usize, transitions: usize },
}

impl RunOutcome {

  pub fn is_halted(&self) -> bool {
    match self {
      RunOutcome::Halted { .. }    => true,
      RunOutcome::StepLimit { .. } => false
    }
  }

  /// Instruction steps taken, counting each transition hand-off as one.
  pub fn steps(&self) -> usize {
    match self {
      | RunOutcome::Halted { steps, .. }
      | RunOutcome::StepLimit { steps, .. } => *steps
    }
  }

  pub fn transitions(&self) -> usize {
    match self {
      | RunOutcome::Halted { transitions, .. }
      | RunOutcome::StepLimit { transitions, .. } => *transitions
    }
  }

}

/// How control continues after a generic instruction.
enum Flow {
  /// To the instruction's `next` entry.
  Advance,
  /// To wherever the instruction itself pointed the instruction pointer.
  Return,
  Halt,
}

impl Machine {

  /// Whether the next step would find the machine halted.
  pub fn is_halted(&self) -> Result<bool, Fault> {
    let offset = self.active_instruction_offset()?;
    let opcode = self.entry(self.check_entry_offset(offset)?)?.opcode();
    Ok(opcode == Opcode::Halt || (opcode == Opcode::Transition && offset == halt_offset()))
  }

  pub fn step(&mut self) -> Result<Step, Fault> {
    let (offset, opcode) = self.fetch()?;

    match opcode {

      Opcode::Transition => {
        // The halt state is a transition entry too, so a head moved off the tape by the last
        // transition faults here rather than halting.
        let position = self.head_position()?;
        let symbol = self.symbol_at(position)?;
        if self.compare(INSTRUCTION_PTR_REG, HALT_SENTINEL_REG)? == 0 {
          return Ok(Step::Halted);
        }
        debug!("state {:?} reads {} at position {}", state_index(offset), symbol, position);
        self.enter_bootstrap()?;
        Ok(Step::Transition)
      }

      _ => {
        let instruction = self.decode_operands(opcode)?;

        #[cfg(feature = "trace_computation")]
          println!("{:>6}: {}", offset, instruction);

        let flow = self.execute(&instruction, offset).map_err(|cause| {
          Fault::Execution { offset, instruction, cause: Box::new(cause) }
        })?;

        match flow {
          Flow::Advance => {
            self.load(instruction.next as i32, NEXT_REG)?;
            self.load(INSTRUCTION_POINTER_FIELD as i32, IP_ADDRESS_REG)?;
            self.word_write(NEXT_REG, IP_ADDRESS_REG)?;
            Ok(Step::Executed(opcode))
          }
          Flow::Return => Ok(Step::Executed(opcode)),
          Flow::Halt   => Ok(Step::Halted)
        }
      }

    } // end match opcode
  }

  /// Leaves the instruction pointer, the opcode and the halt sentinel in their registers.
  fn fetch(&mut self) -> Result<(BitOffset, Opcode), Fault> {
    self.load(WORD_COUNT_FIELD as i32, SIZE_ADDRESS_REG)?;
    self.load(INSTRUCTION_POINTER_FIELD as i32, IP_ADDRESS_REG)?;
    self.word_read(SIZE_ADDRESS_REG, PROGRAM_WORDS_REG)?;
    self.word_read(IP_ADDRESS_REG, INSTRUCTION_PTR_REG)?;

    let offset = self.register(INSTRUCTION_PTR_REG)? as BitOffset;
    self.check_entry_offset(offset)?;
    self.word_read(INSTRUCTION_PTR_REG, OPCODE_REG)?;
    self.load(halt_offset() as i32, HALT_SENTINEL_REG)?;

    let code = self.register(OPCODE_REG)? as u32;
    let opcode = Opcode::try_from(code)
                   .map_err(|_| Fault::InvalidOpcode { offset, opcode: code })?;
    Ok((offset, opcode))
  }

  fn enter_bootstrap(&mut self) -> Result<(), Fault> {
    self.word_read(IP_ADDRESS_REG, ACTIVE_STATE_REG)?;
    self.load(entry_offset(BOOTSTRAP_ENTRY) as i32, BOOTSTRAP_ENTRY_REG)?;
    self.word_write(BOOTSTRAP_ENTRY_REG, IP_ADDRESS_REG)
  }

  /// Reads the operand words and `next` following the opcode. `IP_ADDRESS_REG` holds 32, which
  /// is also the distance from one word to the next.
  fn decode_operands(&mut self, opcode: Opcode) -> Result<Instruction, Fault> {
    let mut args = [0i32; 3];
    let mut previous = INSTRUCTION_PTR_REG;
    for k in 0..3 {
      self.add(previous, IP_ADDRESS_REG, ARG_ADDRESS_REGS[k])?;
      self.word_read(ARG_ADDRESS_REGS[k], ARG_REGS[k])?;
      args[k] = self.register(ARG_REGS[k])?;
      previous = ARG_ADDRESS_REGS[k];
    }
    self.add(previous, IP_ADDRESS_REG, NEXT_ADDRESS_REG)?;
    self.word_read(NEXT_ADDRESS_REG, NEXT_REG)?;
    let next = self.register(NEXT_REG)? as BitOffset;
    Ok(Instruction::new(opcode, args, next))
  }

  fn execute(&mut self, instruction: &Instruction, offset: BitOffset) -> Result<Flow, Fault> {
    let [a, b, c] = instruction.args;
    match instruction.opcode {
      Opcode::ClearRegisters => self.clear_registers()?,
      Opcode::Load           => self.load(a, b)?,
      Opcode::WordRead       => self.word_read(a, b)?,
      Opcode::SymbolRead     => self.symbol_read(a, b)?,
      Opcode::Multiply       => self.multiply(a, b, c)?,
      Opcode::Add            => self.add(a, b, c)?,
      Opcode::WordWrite      => self.word_write(a, b)?,
      Opcode::SymbolWrite    => self.symbol_write(a, b)?,
      Opcode::Halt           => return Ok(Flow::Halt),
      Opcode::Return         => {
        self.word_write(a, b)?;
        return Ok(Flow::Return);
      }
      // `step` gives transition entries to the bootstrap before decoding.
      Opcode::Transition     => {
        return Err(Fault::InvalidOpcode { offset, opcode: instruction.opcode.code() });
      }
    }
    Ok(Flow::Advance)
  }

  // region Running

  /**
    Steps until the machine halts or `max_steps` steps have run. Unless `silent`, prints a
    snapshot of the tape before every transition and once more at the end.
  */
  pub fn run(&mut self, max_steps: usize, silent: bool) -> Result<RunOutcome, Fault> {
    let outcome = match silent {
      true  => self.run_with(max_steps, |_, _| Ok(()))?,
      false => {
        let outcome = self.run_with(max_steps, |machine, transition| {
          println!("{}", Snapshot::capture(machine, transition - 1)?);
          Ok(())
        })?;
        println!("{}", Snapshot::capture(self, outcome.transitions())?);
        outcome
      }
    };
    Ok(outcome)
  }

  /**
    Steps until the machine halts or `max_steps` steps have run, calling `observer` with the
    machine and the transition count each time a transition is handed to the bootstrap.
  */
  pub fn run_with<F>(&mut self, max_steps: usize, mut observer: F) -> Result<RunOutcome, Fault>
    where F: FnMut(&Machine, usize) -> Result<(), Fault>
  {
    let mut steps = 0;
    let mut transitions = 0;

    while steps < max_steps {
      match self.step()? {
        Step::Halted => {
          info!("halted after {} steps and {} transitions", steps, transitions);
          return Ok(RunOutcome::Halted { steps, transitions });
        }
        Step::Transition => {
          steps += 1;
          transitions += 1;
          observer(self, transitions)?;
        }
        Step::Executed(_) => {
          steps += 1;
        }
      }
    }

    match self.is_halted()? {
      true => {
        // Same check `step` makes before reporting the halt state.
        if self.active_instruction_offset()? == halt_offset() {
          self.head_position()?;
        }
        info!("halted after {} steps and {} transitions", steps, transitions);
        Ok(RunOutcome::Halted { steps, transitions })
      }
      false => {
        warn!("no halt within {} steps ({} transitions)", max_steps, transitions);
        Ok(RunOutcome::StepLimit { steps, transitions })
      }
    }
  }

  // endregion

}
