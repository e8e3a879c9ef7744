/*!
  Every entry in a program is a five-word record. Words are 32 bit little-endian, so an entry
  is 20 bytes, and an entry at index `i` begins at bit offset `(8 + 20i) * 8`. The first word
  is always the opcode, which decides how the remaining four are read:

  ```text
    generic instruction   [opcode][arg0][arg1][arg2][next]
    transition entry      [1235][sym:8 dir:8 pad:16][next0][next1][next2]
  ```

  A generic instruction carries up to three signed operands and the bit offset of the entry
  to run after it. A transition entry describes one Turing state: for each of the three
  symbols that can be under the head, the `sym` byte holds the symbol to write (a 2-bit field
  per read symbol, read symbol `k` at bits `2k`), the `dir` byte holds the head move in the
  same arrangement, and `next[k]` holds the bit offset of the following state's entry.

  Both forms have the same size, so transition entries sit in the same array as instructions
  and the interpreter tells them apart by opcode alone. Opcodes are an enum; operands are not
  variant payloads, since every generic instruction has the same shape in memory.
*/

use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::address::{Address, BitOffset, entry_offset};
use crate::registers::Register;
use crate::symbol::{Move, Symbol};

mod binary;
mod assembly;

pub use binary::{encode_entry, try_decode_entry, EncodedEntry, Word};
pub use assembly::{assemble, listing, AssemblyError};

/**
  Opcodes of the device. The numeric values are part of the buffer format. `Transition`
  never executes as an instruction: it marks a transition entry.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u32)]
pub enum Opcode {
  ClearRegisters = 0, // ClearRegisters
  Load,               // Load( value, r )
  WordRead,           // WordRead( ra, r )
  SymbolRead,         // SymbolRead( ra, r )
  Multiply,           // Multiply( r1, r2, r3 )
  Add,                // Add( r1, r2, r3 )
  WordWrite,          // WordWrite( rv, ra )
  SymbolWrite,        // SymbolWrite( rv, ra )
  Halt,               // Halt
  Return,             // Return( rv, ra )
  Transition = 1235,
}

impl Opcode {

  pub fn code(&self) -> Word {
    Into::<Word>::into(*self)
  }

  pub fn arity(&self) -> usize {
    match self {
      | Opcode::ClearRegisters
      | Opcode::Halt
      | Opcode::Transition => 0,

      | Opcode::Multiply
      | Opcode::Add => 3,

      _ => 2
    }
  }

  /// Whether operand `k` names a register rather than a constant.
  pub fn is_register_operand(&self, k: usize) -> bool {
    k < self.arity() && !(*self == Opcode::Load && k == 0)
  }

  /// `Halt` and `Return` never fall through to their `next` field.
  pub fn falls_through(&self) -> bool {
    match self {
      Opcode::Halt | Opcode::Return | Opcode::Transition => false,
      _ => true
    }
  }

}

/// An unencoded generic instruction. Operands beyond the opcode's arity are zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub opcode : Opcode,
  pub args   : [i32; 3],
  pub next   : BitOffset,
}

impl Instruction {

  pub fn new(opcode: Opcode, args: [i32; 3], next: BitOffset) -> Instruction {
    Instruction { opcode, args, next }
  }

  pub fn halt() -> Instruction {
    Instruction::new(Opcode::Halt, [0; 3], entry_offset(0))
  }

  pub fn load(value: i32, r: Register, next: BitOffset) -> Instruction {
    Instruction::new(Opcode::Load, [value, r, 0], next)
  }

  pub fn add(r1: Register, r2: Register, r3: Register, next: BitOffset) -> Instruction {
    Instruction::new(Opcode::Add, [r1, r2, r3], next)
  }

  pub fn multiply(r1: Register, r2: Register, r3: Register, next: BitOffset) -> Instruction {
    Instruction::new(Opcode::Multiply, [r1, r2, r3], next)
  }

  /// The operands the opcode actually reads.
  pub fn operands(&self) -> &[i32] {
    &self.args[..self.opcode.arity()]
  }

}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.opcode.arity() {
      0 => write!(f, "{}", self.opcode),
      _ => {
        let operands = self.operands()
                           .iter()
                           .map(i32::to_string)
                           .collect::<Vec<String>>()
                           .join(", ");
        write!(f, "{}({})", self.opcode, operands)
      }
    }
  }
}

/// One Turing state: what to write, where to move and where to go, per symbol read.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TransitionEntry {
  pub write : [Symbol; 3],
  pub moves : [Move; 3],
  pub next  : [BitOffset; 3],
}

impl Display for TransitionEntry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let arms = (0..3).map(|k| {
      let next = match Address::from_offset(self.next[k]) {
        Some(address) => address.to_string(),
        None          => format!("@{}", self.next[k])
      };
      format!("{}:{}{}{}", k, self.write[k].code(), self.moves[k].arrow(), next)
    }).collect::<Vec<String>>();
    write!(f, "Transition[{}]", arms.join(" "))
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Entry {
  Instruction(Instruction),
  Transition(TransitionEntry),
}

impl Entry {
  pub fn opcode(&self) -> Opcode {
    match self {
      Entry::Instruction(instruction) => instruction.opcode,
      Entry::Transition(_)            => Opcode::Transition
    }
  }
}

impl Display for Entry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Entry::Instruction(instruction) => {
        match (instruction.opcode.falls_through(), Address::from_offset(instruction.next)) {
          (true, Some(next)) => write!(f, "{} -> {}", instruction, next),
          (true, None)       => write!(f, "{} -> @{}", instruction, instruction.next),
          (false, _)         => write!(f, "{}", instruction)
        }
      }
      Entry::Transition(transition) => write!(f, "{}", transition)
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use std::str::FromStr;

  #[test]
  fn opcode_numbers(){
    assert_eq!(Opcode::ClearRegisters.code(), 0);
    assert_eq!(Opcode::Return.code(), 9);
    assert_eq!(Opcode::Transition.code(), 1235);
    assert_eq!(Opcode::try_from(5u32).ok(), Some(Opcode::Add));
    assert!(Opcode::try_from(10u32).is_err());
  }

  #[test]
  fn opcode_names(){
    assert_eq!(Opcode::from_str("SymbolWrite"), Ok(Opcode::SymbolWrite));
    assert_eq!(format!("{}", Opcode::WordRead), "WordRead");
    assert!(Opcode::from_str("Jump").is_err());
  }

  #[test]
  fn register_operands(){
    assert!(!Opcode::Load.is_register_operand(0));
    assert!(Opcode::Load.is_register_operand(1));
    assert!(Opcode::Add.is_register_operand(2));
    assert!(!Opcode::WordRead.is_register_operand(2));
  }

  #[test]
  fn instruction_display(){
    assert_eq!(format!("{}", Instruction::load(-1, 20, 0)), "Load(-1, 20)");
    assert_eq!(format!("{}", Instruction::halt()), "Halt");
    let entry = Entry::Instruction(Instruction::add(1, 2, 3, entry_offset(4)));
    assert_eq!(format!("{}", entry), "Add(1, 2, 3) -> E[4]");
  }

}
