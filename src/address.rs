/*!
  Every cross-region reference in a machine is a bit offset. This module holds the layout
  constants and the pure conversions between bit offsets and the things they name: program
  entries, Turing states and head positions.

  ```text
    byte 0                 program header: word count, instruction pointer
    byte 8                 entry 0 (Halt), entries 1..=30 (bootstrap), entry 31.. (states)
    byte 4 * word count    register region, MAX_REGISTERS words
    + 200                  tape header: tape word count, head
    + 8                    packed symbols, four per byte
  ```

  The head field counts bits from the start of the tape region, so position `p` is stored
  as `64 + 2p`.
*/

use std::fmt::{Display, Formatter};

use crate::store::{BITS_PER_BYTE, BYTES_PER_WORD, SYMBOL_BITS, SYMBOLS_PER_BYTE, WORD_BITS};

pub type BitOffset = u32;

pub const PROGRAM_HEADER_BYTES  : usize = 8;
pub const ENTRY_BYTES           : usize = 20;
pub const ENTRY_WORDS           : usize = ENTRY_BYTES / BYTES_PER_WORD;
pub const MAX_REGISTERS         : usize = 50;
pub const REGISTER_REGION_BYTES : usize = MAX_REGISTERS * BYTES_PER_WORD;
pub const TAPE_HEADER_BYTES     : usize = 8;
pub const SYMBOLS_PER_WORD      : usize = SYMBOLS_PER_BYTE * BYTES_PER_WORD;

/// Bit offset of the program word count.
pub const WORD_COUNT_FIELD          : BitOffset = 0;
/// Bit offset of the instruction pointer.
pub const INSTRUCTION_POINTER_FIELD : BitOffset = WORD_BITS as BitOffset;
/// Bit offset of the head field, relative to the tape region.
pub const HEAD_FIELD                : BitOffset = WORD_BITS as BitOffset;
/// Bit offset of the first symbol, relative to the tape region.
pub const FIRST_SYMBOL              : BitOffset = (TAPE_HEADER_BYTES * BITS_PER_BYTE) as BitOffset;

/// Entry 0 always holds a `Halt` instruction.
pub const HALT_ENTRY      : usize = 0;
pub const BOOTSTRAP_ENTRY : usize = 1;
/// Entry index of Turing state 0, the halt state.
pub const TABLE_BASE      : usize = 31;

pub fn entry_offset(index: usize) -> BitOffset {
  ((PROGRAM_HEADER_BYTES + ENTRY_BYTES * index) * BITS_PER_BYTE) as BitOffset
}

/// The entry index named by `offset`, or `None` when `offset` is not an entry boundary.
pub fn entry_index(offset: BitOffset) -> Option<usize> {
  let offset = offset as usize;
  if offset % BITS_PER_BYTE != 0 {
    return None;
  }
  let bytes = offset / BITS_PER_BYTE;
  match bytes >= PROGRAM_HEADER_BYTES && (bytes - PROGRAM_HEADER_BYTES) % ENTRY_BYTES == 0 {
    true  => Some((bytes - PROGRAM_HEADER_BYTES) / ENTRY_BYTES),
    false => None
  }
}

pub fn state_offset(state: usize) -> BitOffset {
  entry_offset(TABLE_BASE + state)
}

pub fn state_index(offset: BitOffset) -> Option<usize> {
  entry_index(offset).and_then(|index| index.checked_sub(TABLE_BASE))
}

/// The instruction pointer value that means the machine has halted.
pub fn halt_offset() -> BitOffset {
  state_offset(0)
}

pub fn head_field(position: usize) -> u32 {
  FIRST_SYMBOL + (SYMBOL_BITS * position) as u32
}

/// The tape position a head field names. May be negative or fractional garbage for a corrupt
/// field, so callers range-check the result and `head_field_is_aligned`.
pub fn head_position(field: u32) -> i64 {
  (field as i64 - FIRST_SYMBOL as i64).div_euclid(SYMBOL_BITS as i64)
}

pub fn head_field_is_aligned(field: u32) -> bool {
  field as usize % SYMBOL_BITS == 0
}

// region Region sizes

/// Program word count for `entries` entries, header included.
pub fn program_words(entries: usize) -> u32 {
  ((PROGRAM_HEADER_BYTES + ENTRY_BYTES * entries) / BYTES_PER_WORD) as u32
}

/// Tape lengths are whole words of symbols. `None` when rounding up overflows.
pub fn round_tape_symbols(symbols: usize) -> Option<usize> {
  symbols.checked_add(SYMBOLS_PER_WORD - 1)
         .map(|padded| padded / SYMBOLS_PER_WORD * SYMBOLS_PER_WORD)
}

/// Tape word count for a tape of `symbols` symbols (already rounded), header included.
pub fn tape_words(symbols: usize) -> u32 {
  ((TAPE_HEADER_BYTES + symbols / SYMBOLS_PER_BYTE) / BYTES_PER_WORD) as u32
}

/// Total buffer size in bytes: program region, registers and tape region. `symbols` is a
/// rounded tape length.
pub fn machine_size(entries: usize, symbols: usize) -> usize {
  PROGRAM_HEADER_BYTES + ENTRY_BYTES * entries
    + REGISTER_REGION_BYTES
    + TAPE_HEADER_BYTES + symbols / SYMBOLS_PER_BYTE
}

/// `machine_size` in bits, or `None` when that many bits cannot be addressed by the signed
/// 32-bit registers the device computes offsets in.
pub fn addressable_bits(entries: usize, symbols: usize) -> Option<usize> {
  let bytes = ENTRY_BYTES.checked_mul(entries)?
    .checked_add(PROGRAM_HEADER_BYTES + REGISTER_REGION_BYTES + TAPE_HEADER_BYTES)?
    .checked_add(symbols / SYMBOLS_PER_BYTE)?;
  let bits = bytes.checked_mul(BITS_PER_BYTE)?;
  match bits <= i32::max_value() as usize {
    true  => Some(bits),
    false => None
  }
}

// endregion

/// What an entry offset refers to, for listings and diagnostics.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Address {
  /// A generic instruction slot, by entry index.
  Entry(usize),
  /// A Turing state, by state number.
  State(usize),
}

impl Address {

  pub fn from_offset(offset: BitOffset) -> Option<Address> {
    entry_index(offset).map(|index| {
      match index >= TABLE_BASE {
        true  => Address::State(index - TABLE_BASE),
        false => Address::Entry(index)
      }
    })
  }

  pub fn offset(&self) -> BitOffset {
    match self {
      Address::Entry(index) => entry_offset(*index),
      Address::State(state) => state_offset(*state)
    }
  }

}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Address::Entry(index) => write!(f, "E[{}]", index),
      Address::State(state) => write!(f, "S[{}]", state)
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn entry_round_trip(){
    for index in 0..200 {
      assert_eq!(entry_index(entry_offset(index)), Some(index));
    }
    assert_eq!(entry_offset(0), 64);
    assert_eq!(entry_offset(1), 224);
  }

  #[test]
  fn state_round_trip(){
    for state in 0..100 {
      assert_eq!(state_index(state_offset(state)), Some(state));
    }
    assert_eq!(state_index(entry_offset(5)), None);
    assert_eq!(halt_offset(), entry_offset(TABLE_BASE));
  }

  #[test]
  fn offsets_between_entries(){
    assert_eq!(entry_index(0), None);
    assert_eq!(entry_index(32), None);
    assert_eq!(entry_index(entry_offset(3) + 32), None);
    assert_eq!(entry_index(entry_offset(3) + 4), None);
  }

  #[test]
  fn head_round_trip(){
    for position in 0..80 {
      assert_eq!(head_position(head_field(position)), position as i64);
    }
    assert_eq!(head_field(4), 72);
    assert_eq!(head_position(62), -1);
  }

  #[test]
  fn sizes(){
    assert_eq!(round_tape_symbols(80), Some(80));
    assert_eq!(round_tape_symbols(81), Some(96));
    assert_eq!(round_tape_symbols(usize::max_value()), None);
    assert_eq!(tape_words(80), 7);
    assert_eq!(program_words(35), 177);
    assert_eq!(machine_size(35, 80), 936);
    assert_eq!(
      machine_size(35, 80),
      (program_words(35) + tape_words(80)) as usize * BYTES_PER_WORD + REGISTER_REGION_BYTES
    );
  }

  #[test]
  fn addressable_limit(){
    assert_eq!(addressable_bits(35, 80), Some(936 * 8));
    assert_eq!(addressable_bits(1, 1 << 30), None);
    assert_eq!(addressable_bits(usize::max_value(), 16), None);
  }

  #[test]
  fn addresses(){
    assert_eq!(Address::from_offset(entry_offset(2)), Some(Address::Entry(2)));
    assert_eq!(Address::from_offset(state_offset(3)), Some(Address::State(3)));
    assert_eq!(Address::State(3).offset(), state_offset(3));
    assert_eq!(format!("{}", Address::State(0)), "S[0]");
  }

}
