//! Errors raised by the device. A `Fault` is fatal to the run that raised it: it means the
//! machine description is corrupt or the bootstrap computed a bad address. A `LoadError`
//! means a buffer or file never became a machine in the first place.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bytecode::Instruction;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Fault {
  #[error("invalid opcode {opcode} in the entry at bit offset {offset}")]
  InvalidOpcode { offset: u32, opcode: u32 },

  #[error("register index {index} is out of range (limit {limit})")]
  RegisterOutOfRange { index: i64, limit: usize },

  #[error("word access at bit offset {0} is not 32-bit aligned")]
  MisalignedWord(i64),

  #[error("symbol access at bit offset {0} is odd or straddles a byte boundary")]
  MisalignedSymbol(i64),

  #[error("bit offset {offset} lies outside the {bits}-bit buffer")]
  OffsetOutOfBounds { offset: i64, bits: usize },

  #[error("value {value} is not a symbol (bit offset {offset})")]
  InvalidSymbol { offset: i64, value: i64 },

  #[error("code {0} is not a head move")]
  InvalidMove(u8),

  #[error("head position {position} is off the {length}-symbol tape")]
  HeadOutOfBounds { position: i64, length: usize },

  #[error("state {state} is outside the {count}-state table")]
  StateOutOfRange { state: usize, count: usize },

  #[error("entry {index} is outside the {count}-entry program")]
  EntryOutOfRange { index: usize, count: usize },

  #[error("bit offset {0} does not point at a program entry")]
  NotAnEntry(u32),

  #[error("the entry at bit offset {0} is not a transition")]
  NotATransition(u32),

  #[error("{entries} entries and {symbols} tape symbols do not fit in 32-bit bit offsets")]
  TooLarge { entries: usize, symbols: usize },

  #[error("cannot place {text:?}: {reason}")]
  TapeText { text: String, reason: &'static str },

  #[error("{instruction} at bit offset {offset}: {cause}")]
  Execution {
    offset      : u32,
    instruction : Instruction,
    #[source]
    cause       : Box<Fault>,
  },
}

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("could not access {}: {source}", .path.display())]
  Io {
    path   : PathBuf,
    #[source]
    source : io::Error,
  },

  #[error("a buffer of {0} bytes is too short to hold a machine")]
  TooShort(usize),

  #[error("program word count {0} does not describe a whole number of entries")]
  RaggedProgram(u32),

  #[error("tape word count {0} leaves no room for symbols")]
  EmptyTape(u32),

  #[error("the headers describe {expected} bytes but the buffer holds {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}
