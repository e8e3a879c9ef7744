/*!
  This module is responsible for the encoding and decoding of program entries to and from
  their five-word form.

*/
use std::convert::TryFrom;

use super::{Entry, Instruction, Opcode, TransitionEntry};
use crate::address::{ENTRY_WORDS, BitOffset};
use crate::error::Fault;
use crate::store::{BITS_PER_BYTE, SYMBOL_BITS, WORD_BITS};
use crate::symbol::{Move, Symbol};

// If you change this you must also change `BitStore::read_word` and `BitStore::write_word`.
pub type Word = u32;
pub type EncodedEntry = [Word; ENTRY_WORDS];

/// Bit position of the `dir` byte within the second word of a transition entry.
const MOVE_FIELD_SHIFT : usize = BITS_PER_BYTE;
const FIELD_MASK       : Word  = 0b11;

pub fn encode_entry(entry: &Entry) -> EncodedEntry {
  match entry {

    Entry::Instruction(Instruction { opcode, args, next }) => {
      // [opcode][arg0][arg1][arg2][next]
      [opcode.code(), args[0] as Word, args[1] as Word, args[2] as Word, *next]
    }

    Entry::Transition(TransitionEntry { write, moves, next }) => {
      // [1235][sym:8 dir:8 pad:16][next0][next1][next2]
      let mut fields: Word = 0;
      for k in 0..3 {
        fields |= (write[k].code() as Word) << (SYMBOL_BITS * k);
        fields |= (moves[k].code() as Word) << (MOVE_FIELD_SHIFT + SYMBOL_BITS * k);
      }
      [Opcode::Transition.code(), fields, next[0], next[1], next[2]]
    }

  }
}

/**
  Decodes the entry found at bit offset `offset`. The offset is only used to make faults
  point at the right place in the buffer.
*/
pub fn try_decode_entry(words: &EncodedEntry, offset: BitOffset) -> Result<Entry, Fault> {
  let opcode = Opcode::try_from(words[0])
                 .map_err(|_| Fault::InvalidOpcode { offset, opcode: words[0] })?;

  match opcode {

    Opcode::Transition => {
      let fields_offset = offset as i64 + WORD_BITS as i64;
      let mut write = [Symbol::Blank; 3];
      let mut moves = [Move::Stay; 3];
      for k in 0..3 {
        let symbol_shift = SYMBOL_BITS * k;
        let symbol_code  = ((words[1] >> symbol_shift) & FIELD_MASK) as u8;
        write[k] = Symbol::from_code(symbol_code, fields_offset + symbol_shift as i64)?;
        let move_code    = ((words[1] >> (MOVE_FIELD_SHIFT + symbol_shift)) & FIELD_MASK) as u8;
        moves[k] = Move::from_code(move_code)?;
      }
      Ok(Entry::Transition(TransitionEntry { write, moves, next: [words[2], words[3], words[4]] }))
    }

    _ => {
      Ok(Entry::Instruction(Instruction {
        opcode,
        args: [words[1] as i32, words[2] as i32, words[3] as i32],
        next: words[4]
      }))
    }

  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::address::{entry_offset, state_offset};

  #[test]
  fn instruction_words(){
    let instruction = Instruction::load(-1, 20, entry_offset(20));
    let words = encode_entry(&Entry::Instruction(instruction));
    assert_eq!(words, [1, 0xFFFF_FFFF, 20, 0, entry_offset(20)]);
    assert_eq!(try_decode_entry(&words, 0), Ok(Entry::Instruction(instruction)));
  }

  #[test]
  fn transition_fields(){
    let transition = TransitionEntry {
      write : [Symbol::Zero, Symbol::One, Symbol::Blank],
      moves : [Move::Left, Move::Left, Move::Right],
      next  : [state_offset(1), state_offset(1), state_offset(2)]
    };
    let words = encode_entry(&Entry::Transition(transition));
    // sym byte 0b10_01_00, dir byte 0b10_00_00
    assert_eq!(words[1], 0b0010_0000_0010_0100);
    assert_eq!(try_decode_entry(&words, 0), Ok(Entry::Transition(transition)));
  }

  #[test]
  fn unknown_opcode(){
    let words = [77, 0, 0, 0, 0];
    assert_eq!(
      try_decode_entry(&words, entry_offset(3)),
      Err(Fault::InvalidOpcode { offset: entry_offset(3), opcode: 77 })
    );
  }

  #[test]
  fn bad_transition_fields(){
    let words = [1235, 0b0011_0000, 0, 0, 0];
    assert_eq!(
      try_decode_entry(&words, 64),
      Err(Fault::InvalidSymbol { offset: 100, value: 3 })
    );
    let words = [1235, 0b0000_1100_0000_0000, 0, 0, 0];
    assert_eq!(try_decode_entry(&words, 64), Err(Fault::InvalidMove(3)));
  }

}
