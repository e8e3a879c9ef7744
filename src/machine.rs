//! The machine: one buffer holding a program, its registers and its tape, plus the layout
//! that says where each region starts. All state lives in the buffer, so a machine is exactly
//! its bytes.

use log::info;

use crate::address::*;
use crate::bytecode::{encode_entry, try_decode_entry, EncodedEntry, Entry};
use crate::error::{Fault, LoadError};
use crate::layout::Layout;
use crate::registers::ACTIVE_STATE_REG;
use crate::store::{BitStore, WORD_BITS};

#[derive(Clone, Debug)]
pub struct Machine {
  pub(crate) store  : BitStore,
  pub(crate) layout : Layout,
}

impl Machine {

  // region Serialization

  /// Takes ownership of a serialized machine after checking its headers against its length.
  pub fn from_bytes(bytes: Vec<u8>) -> Result<Machine, LoadError> {
    let layout = Layout::from_header(&bytes)?;
    info!(
      "loaded a machine of {} bytes: {} entries, {} tape symbols",
      bytes.len(), layout.entry_count(), layout.tape_len()
    );
    Ok(Machine { store: BitStore::from_bytes(bytes), layout })
  }

  pub fn as_bytes(&self) -> &[u8] {
    self.store.as_bytes()
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    self.store.as_bytes().to_vec()
  }

  // endregion

  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  pub fn entry_count(&self) -> usize {
    self.layout.entry_count()
  }

  pub fn tape_len(&self) -> usize {
    self.layout.tape_len()
  }

  // region Entries

  fn check_entry(&self, index: usize) -> Result<BitOffset, Fault> {
    match index < self.entry_count() {
      true  => Ok(entry_offset(index)),
      false => Err(Fault::EntryOutOfRange { index, count: self.entry_count() })
    }
  }

  /// The index of the entry at `offset`, which must be an entry of this machine.
  pub fn check_entry_offset(&self, offset: BitOffset) -> Result<usize, Fault> {
    match entry_index(offset) {
      Some(index) if index < self.entry_count() => Ok(index),
      _ => Err(Fault::NotAnEntry(offset))
    }
  }

  pub fn entry(&self, index: usize) -> Result<Entry, Fault> {
    let offset = self.check_entry(index)?;
    let mut words: EncodedEntry = [0; ENTRY_WORDS];
    for (k, word) in words.iter_mut().enumerate() {
      *word = self.store.read_word(offset as i64 + (k * WORD_BITS) as i64)?;
    }
    try_decode_entry(&words, offset)
  }

  pub fn set_entry(&mut self, index: usize, entry: &Entry) -> Result<(), Fault> {
    let offset = self.check_entry(index)?;
    for (k, word) in encode_entry(entry).iter().enumerate() {
      self.store.write_word(offset as i64 + (k * WORD_BITS) as i64, *word)?;
    }
    Ok(())
  }

  pub fn entries(&self) -> Result<Vec<Entry>, Fault> {
    (0..self.entry_count()).map(|index| self.entry(index)).collect()
  }

  // endregion

  // region Instruction pointer

  pub fn active_instruction_offset(&self) -> Result<BitOffset, Fault> {
    self.store.read_word(INSTRUCTION_POINTER_FIELD as i64)
  }

  pub fn set_active_instruction_offset(&mut self, offset: BitOffset) -> Result<(), Fault> {
    self.check_entry_offset(offset)?;
    self.store.write_word(INSTRUCTION_POINTER_FIELD as i64, offset)
  }

  pub fn current_entry(&self) -> Result<Entry, Fault> {
    let offset = self.active_instruction_offset()?;
    self.entry(self.check_entry_offset(offset)?)
  }

  /**
    The Turing state the machine is in. Between transitions the instruction pointer names it
    directly; while the bootstrap runs it is the state handed over in `ACTIVE_STATE_REG`.
    `None` for a machine that is running neither.
  */
  pub fn active_state(&self) -> Result<Option<usize>, Fault> {
    let offset = self.active_instruction_offset()?;
    match state_index(offset) {
      Some(state) => Ok(Some(state)),
      None        => Ok(state_index(self.register(ACTIVE_STATE_REG)? as BitOffset))
    }
  }

  // endregion

  /**
    Checks the whole machine description: every entry decodes, every transition's next states
    are transition entries of this machine, the instruction pointer is on an entry and the
    head is on the tape.
  */
  pub fn validate(&self) -> Result<(), Fault> {
    let entries = self.entries()?;

    for entry in entries.iter() {
      if let Entry::Transition(transition) = entry {
        for next in transition.next.iter() {
          let lands_on_transition = entry_index(*next)
            .and_then(|index| entries.get(index))
            .map_or(false, |target| matches!(target, Entry::Transition(_)));
          if !lands_on_transition {
            return Err(Fault::NotATransition(*next));
          }
        }
      }
    }

    self.check_entry_offset(self.active_instruction_offset()?)?;
    self.head_position()?;
    Ok(())
  }

}

/// Machines are equal when their programs and tapes are. Registers are scratch space.
impl PartialEq for Machine {
  fn eq(&self, other: &Machine) -> bool {
    let (mine, theirs) = (self.as_bytes(), other.as_bytes());
    self.layout == other.layout
      && mine[self.layout.program_bytes()] == theirs[other.layout.program_bytes()]
      && mine[self.layout.tape_bytes()] == theirs[other.layout.tape_bytes()]
  }
}

impl Eq for Machine {}
