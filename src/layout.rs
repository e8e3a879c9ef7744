/*!
  Region boundaries of a machine buffer, and the builders that lay a new machine out.

  Every boundary follows from two numbers, the entry count and the tape length, and both can
  be read back from the headers of a serialized buffer: the program word count at byte 0 and
  the tape word count at the start of the tape region. `Layout::from_header` recovers the
  same boundaries the builder used, or refuses the buffer.
*/

use std::ops::Range;

use fastrand::Rng;
use log::info;

use crate::address::*;
use crate::bootstrap::bootstrap;
use crate::bytecode::{Entry, Instruction, TransitionEntry};
use crate::error::{Fault, LoadError};
use crate::machine::Machine;
use crate::store::{BitStore, BITS_PER_BYTE, BYTES_PER_WORD};
use crate::symbol::{Move, Symbol};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Layout {
  entries : usize,
  symbols : usize,
}

impl Layout {

  /// The tape is rounded up to whole words of symbols, and is never empty. Every bit of the
  /// machine must be addressable from a register.
  pub fn new(entries: usize, symbols: usize) -> Result<Layout, Fault> {
    let too_large = Fault::TooLarge { entries, symbols };
    let rounded = round_tape_symbols(symbols.max(1)).ok_or_else(|| too_large.clone())?;
    addressable_bits(entries, rounded).ok_or(too_large)?;
    Ok(Layout { entries, symbols: rounded })
  }

  /// Recovers the layout of a serialized machine from its two word counts.
  pub fn from_header(bytes: &[u8]) -> Result<Layout, LoadError> {
    let program_words = word_at(bytes, 0).ok_or(LoadError::TooShort(bytes.len()))?;
    let header_words = (PROGRAM_HEADER_BYTES / BYTES_PER_WORD) as u32;
    if program_words < header_words || (program_words - header_words) % ENTRY_WORDS as u32 != 0 {
      return Err(LoadError::RaggedProgram(program_words));
    }
    let entries = ((program_words - header_words) / ENTRY_WORDS as u32) as usize;

    let tape_start = program_words as usize * BYTES_PER_WORD + REGISTER_REGION_BYTES;
    let tape_words = word_at(bytes, tape_start).ok_or(LoadError::TooShort(bytes.len()))?;
    let tape_header_words = (TAPE_HEADER_BYTES / BYTES_PER_WORD) as u32;
    if tape_words <= tape_header_words {
      return Err(LoadError::EmptyTape(tape_words));
    }
    let symbols = (tape_words - tape_header_words) as usize * SYMBOLS_PER_WORD;

    let layout = Layout { entries, symbols };
    match layout.size() == bytes.len() {
      true  => Ok(layout),
      false => Err(LoadError::LengthMismatch { expected: layout.size(), actual: bytes.len() })
    }
  }

  pub fn entry_count(&self) -> usize {
    self.entries
  }

  pub fn tape_len(&self) -> usize {
    self.symbols
  }

  /// Buffer size in bytes.
  pub fn size(&self) -> usize {
    machine_size(self.entries, self.symbols)
  }

  pub fn program_words(&self) -> u32 {
    program_words(self.entries)
  }

  pub fn tape_words(&self) -> u32 {
    tape_words(self.symbols)
  }

  /// Bit offset of register 0.
  pub fn register_base(&self) -> usize {
    self.program_words() as usize * BYTES_PER_WORD * BITS_PER_BYTE
  }

  /// Bit offset of the tape region, where the tape word count sits.
  pub fn tape_base(&self) -> usize {
    self.register_base() + REGISTER_REGION_BYTES * BITS_PER_BYTE
  }

  /// Header and entries.
  pub fn program_bytes(&self) -> Range<usize> {
    0..self.register_base() / BITS_PER_BYTE
  }

  /// Tape header and symbols.
  pub fn tape_bytes(&self) -> Range<usize> {
    self.tape_base() / BITS_PER_BYTE..self.size()
  }

}

fn word_at(bytes: &[u8], start: usize) -> Option<u32> {
  let mut word = [0u8; BYTES_PER_WORD];
  word.copy_from_slice(bytes.get(start..start + BYTES_PER_WORD)?);
  Some(u32::from_le_bytes(word))
}

/**
  One state of a client transition table: for read symbols 0, 1 and blank, the symbol to write,
  the head move and the next state. State numbers count from 1; state 0 is the halt state, which
  every table gets for free.
*/
const SYMBOLS : [Symbol; 3] = [Symbol::Zero, Symbol::One, Symbol::Blank];
const MOVES   : [Move; 3]   = [Move::Left, Move::Stay, Move::Right];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TransitionRow {
  pub write : [Symbol; 3],
  pub moves : [Move; 3],
  pub next  : [usize; 3],
}

impl TransitionRow {

  pub fn new(write: [Symbol; 3], moves: [Move; 3], next: [usize; 3]) -> TransitionRow {
    TransitionRow { write, moves, next }
  }

  /// The halt state rewrites what it reads, stays put and stays halted.
  pub fn halt() -> TransitionRow {
    TransitionRow::new(
      [Symbol::Zero, Symbol::One, Symbol::Blank],
      [Move::Stay; 3],
      [0; 3]
    )
  }

  /// Any symbol, any move and any next state of a `states`-state table, halt state included.
  pub fn random(rng: &mut Rng, states: usize) -> TransitionRow {
    let mut row = TransitionRow::halt();
    for k in 0..3 {
      row.write[k] = SYMBOLS[rng.usize(0..SYMBOLS.len())];
      row.moves[k] = MOVES[rng.usize(0..MOVES.len())];
      row.next[k]  = rng.usize(0..=states);
    }
    row
  }

  fn to_entry(&self) -> TransitionEntry {
    TransitionEntry {
      write : self.write,
      moves : self.moves,
      next  : [state_offset(self.next[0]), state_offset(self.next[1]), state_offset(self.next[2])]
    }
  }

}

impl Machine {

  /**
    Lays out `entries` verbatim from entry 0, with registers cleared, a blank tape of (at
    least) `tape_symbols` symbols, the head at position 0 and the instruction pointer at
    `start`.
  */
  pub fn from_entries(entries: &[Entry], tape_symbols: usize, start: BitOffset)
    -> Result<Machine, Fault>
  {
    let layout = Layout::new(entries.len(), tape_symbols)?;
    let mut machine = Machine {
      store  : BitStore::new(layout.size()),
      layout
    };

    machine.store.write_word(WORD_COUNT_FIELD as i64, layout.program_words())?;
    for (index, entry) in entries.iter().enumerate() {
      machine.set_entry(index, entry)?;
    }
    machine.set_active_instruction_offset(start)?;

    let tape_base = layout.tape_base() as i64;
    machine.store.write_word(tape_base, layout.tape_words())?;
    machine.store.write_word(tape_base + HEAD_FIELD as i64, head_field(0))?;
    machine.blank_tape()?;

    Ok(machine)
  }

  /**
    Builds a Turing machine: the halt instruction, the bootstrap, the halt state and then
    `rows` as states `1..=rows.len()`. The machine starts in state 1, or halted if `rows` is
    empty.
  */
  pub fn with_table(rows: &[TransitionRow], tape_symbols: usize) -> Result<Machine, Fault> {
    let count = rows.len() + 1;
    for row in rows {
      if let Some(state) = row.next.iter().find(|state| **state >= count) {
        return Err(Fault::StateOutOfRange { state: *state, count });
      }
    }

    let mut entries = vec![Entry::Instruction(Instruction::halt())];
    entries.extend(bootstrap().into_iter().map(Entry::Instruction));
    entries.push(Entry::Transition(TransitionRow::halt().to_entry()));
    entries.extend(rows.iter().map(|row| Entry::Transition(row.to_entry())));

    let start = match rows.is_empty() {
      true  => halt_offset(),
      false => state_offset(1)
    };
    let machine = Machine::from_entries(&entries, tape_symbols, start)?;
    info!(
      "built a {}-state machine: {} entries, {} tape symbols, {} bytes",
      rows.len(), machine.entry_count(), machine.tape_len(), machine.layout.size()
    );
    Ok(machine)
  }

  /// A `states`-state machine with a random table. The same seed gives the same machine.
  pub fn random_table(states: usize, tape_symbols: usize, seed: u64) -> Result<Machine, Fault> {
    let mut rng = Rng::with_seed(seed);
    let rows = (0..states).map(|_| TransitionRow::random(&mut rng, states))
                          .collect::<Vec<TransitionRow>>();
    info!("generated a random {}-state table from seed {}", states, seed);
    Machine::with_table(&rows, tape_symbols)
  }

  /// A machine running a generic program from entry 0, for example the output of `assemble`.
  pub fn from_program(program: &[Instruction], tape_symbols: usize) -> Result<Machine, Fault> {
    let entries = program.iter().copied().map(Entry::Instruction).collect::<Vec<Entry>>();
    let machine = Machine::from_entries(&entries, tape_symbols, entry_offset(0))?;
    info!("built a {}-instruction program", program.len());
    Ok(machine)
  }

}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::Opcode;

  fn one_state() -> Vec<TransitionRow> {
    vec![TransitionRow::new([Symbol::One; 3], [Move::Right; 3], [0; 3])]
  }

  #[test]
  fn region_boundaries(){
    let layout = Layout::new(35, 80).unwrap();
    assert_eq!(layout.size(), 936);
    assert_eq!(layout.register_base(), 177 * 32);
    assert_eq!(layout.tape_base(), 177 * 32 + 1600);
    assert_eq!(layout.program_bytes(), 0..708);
    assert_eq!(layout.tape_bytes(), 908..936);
  }

  #[test]
  fn tape_rounding(){
    assert_eq!(Layout::new(1, 0).unwrap().tape_len(), 16);
    assert_eq!(Layout::new(1, 17).unwrap().tape_len(), 32);
  }

  #[test]
  fn oversized_tapes(){
    assert_eq!(
      Layout::new(1, usize::max_value()),
      Err(Fault::TooLarge { entries: 1, symbols: usize::max_value() })
    );
    assert_eq!(Layout::new(1, 1 << 30), Err(Fault::TooLarge { entries: 1, symbols: 1 << 30 }));
    assert_eq!(
      Machine::with_table(&one_state(), usize::max_value()),
      Err(Fault::TooLarge { entries: TABLE_BASE + 2, symbols: usize::max_value() })
    );
  }

  #[test]
  fn header_round_trip(){
    let machine = Machine::with_table(&one_state(), 40).unwrap();
    let layout = Layout::from_header(machine.as_bytes()).unwrap();
    assert_eq!(&layout, machine.layout());
    assert_eq!(layout.entry_count(), 33);
    assert_eq!(layout.tape_len(), 48);
  }

  #[test]
  fn bad_headers(){
    assert!(matches!(Layout::from_header(&[1, 2]), Err(LoadError::TooShort(2))));

    let mut bytes = Machine::with_table(&one_state(), 16).unwrap().to_bytes();
    bytes[0] += 1;
    assert!(matches!(Layout::from_header(&bytes), Err(LoadError::RaggedProgram(_))));
    bytes[0] -= 1;

    bytes.push(0);
    assert!(matches!(
      Layout::from_header(&bytes),
      Err(LoadError::LengthMismatch { actual, .. }) if actual == bytes.len()
    ));
    bytes.pop();

    let tape_start = Layout::from_header(&bytes).unwrap().tape_base() / 8;
    bytes[tape_start] = 2;
    assert!(matches!(Layout::from_header(&bytes), Err(LoadError::EmptyTape(2))));
  }

  #[test]
  fn table_machine(){
    let machine = Machine::with_table(&one_state(), 16).unwrap();
    assert_eq!(machine.entry_count(), TABLE_BASE + 2);
    assert_eq!(machine.entry(HALT_ENTRY).unwrap().opcode(), Opcode::Halt);
    assert_eq!(machine.entry(BOOTSTRAP_ENTRY).unwrap().opcode(), Opcode::Load);
    assert_eq!(machine.entry(TABLE_BASE).unwrap().opcode(), Opcode::Transition);
    assert_eq!(machine.active_instruction_offset(), Ok(state_offset(1)));
    assert_eq!(machine.head_position(), Ok(0));
    assert_eq!(machine.tape_string(), Ok(" ".repeat(16)));
  }

  #[test]
  fn empty_table_starts_halted(){
    let machine = Machine::with_table(&[], 16).unwrap();
    assert_eq!(machine.active_instruction_offset(), Ok(halt_offset()));
  }

  #[test]
  fn random_tables(){
    for seed in 0..20 {
      let machine = Machine::random_table(4, 32, seed).unwrap();
      assert_eq!(machine.validate(), Ok(()));
      assert_eq!(machine.entry_count(), TABLE_BASE + 5);
      assert_eq!(Machine::random_table(4, 32, seed).unwrap(), machine);
      assert_eq!(Machine::from_bytes(machine.to_bytes()).unwrap(), machine);
    }
  }

  #[test]
  fn random_tables_run_or_leave_the_tape(){
    for seed in 0..20 {
      let mut machine = Machine::random_table(3, 16, seed).unwrap();
      machine.place("", 0, 8).unwrap();
      match machine.run(2_000, true) {
        Ok(_) | Err(Fault::HeadOutOfBounds { .. }) => {}
        other => panic!("seed {}: {:?}", seed, other)
      }
    }
  }

  #[test]
  fn next_state_out_of_range(){
    let rows = vec![TransitionRow::new([Symbol::One; 3], [Move::Right; 3], [0, 2, 0])];
    assert_eq!(Machine::with_table(&rows, 16), Err(Fault::StateOutOfRange { state: 2, count: 2 }));
  }

}
