/*!
  The working tape: a header of two words (tape word count, head field) followed by the packed
  symbols. Positions count from 0 at the first symbol; the head field stores a position as a bit
  offset from the start of the tape region.

  Tape text is written and read from the highest position down, the order a binary number is
  written in. `place("10", 7, 7)` puts `1` at position 7 and `0` at position 6.
*/

use crate::address::{head_field, head_field_is_aligned, head_position, FIRST_SYMBOL, HEAD_FIELD};
use crate::error::Fault;
use crate::machine::Machine;
use crate::store::SYMBOL_BITS;
use crate::symbol::Symbol;

impl Machine {

  fn symbol_offset(&self, position: usize) -> Result<i64, Fault> {
    match position < self.tape_len() {
      true  => Ok((self.layout.tape_base() + FIRST_SYMBOL as usize + SYMBOL_BITS * position) as i64),
      false => Err(Fault::HeadOutOfBounds { position: position as i64, length: self.tape_len() })
    }
  }

  fn head_field_offset(&self) -> i64 {
    (self.layout.tape_base() + HEAD_FIELD as usize) as i64
  }

  // region Head

  /// The head's tape position. A head field that names no position on the tape is a fault.
  pub fn head_position(&self) -> Result<usize, Fault> {
    let field = self.store.read_word(self.head_field_offset())?;
    let position = head_position(field);
    if !head_field_is_aligned(field) {
      return Err(Fault::MisalignedSymbol(self.layout.tape_base() as i64 + field as i64));
    }
    match position >= 0 && (position as usize) < self.tape_len() {
      true  => Ok(position as usize),
      false => Err(Fault::HeadOutOfBounds { position, length: self.tape_len() })
    }
  }

  pub fn set_head_position(&mut self, position: usize) -> Result<(), Fault> {
    self.symbol_offset(position)?;
    let offset = self.head_field_offset();
    self.store.write_word(offset, head_field(position))
  }

  pub fn read_symbol_at_head(&self) -> Result<Symbol, Fault> {
    self.symbol_at(self.head_position()?)
  }

  pub fn write_symbol_at_head(&mut self, symbol: Symbol) -> Result<(), Fault> {
    let position = self.head_position()?;
    self.set_symbol_at(position, symbol)
  }

  // endregion

  // region Symbols

  pub fn symbol_at(&self, position: usize) -> Result<Symbol, Fault> {
    let offset = self.symbol_offset(position)?;
    Symbol::from_code(self.store.read_symbol(offset)?, offset)
  }

  pub fn set_symbol_at(&mut self, position: usize, symbol: Symbol) -> Result<(), Fault> {
    let offset = self.symbol_offset(position)?;
    self.store.write_symbol(offset, symbol.code())
  }

  pub fn blank_tape(&mut self) -> Result<(), Fault> {
    for position in 0..self.tape_len() {
      self.set_symbol_at(position, Symbol::Blank)?;
    }
    Ok(())
  }

  /**
    Blanks the tape, writes `text` so that its first character lands at `position` and each
    following character one position lower, then puts the head at `head`.
  */
  pub fn place(&mut self, text: &str, position: usize, head: usize) -> Result<(), Fault> {
    let tape_text_fault = |reason| Fault::TapeText { text: text.to_string(), reason };

    let symbols = text.chars()
                      .map(Symbol::from_char)
                      .collect::<Option<Vec<Symbol>>>()
                      .ok_or_else(|| tape_text_fault("only '0', '1' and ' ' can be placed"))?;
    if position >= self.tape_len() || symbols.len() > position + 1 {
      return Err(tape_text_fault("the text does not fit on the tape there"));
    }
    if head >= self.tape_len() {
      return Err(Fault::HeadOutOfBounds { position: head as i64, length: self.tape_len() });
    }

    self.blank_tape()?;
    for (i, symbol) in symbols.into_iter().enumerate() {
      self.set_symbol_at(position - i, symbol)?;
    }
    self.set_head_position(head)
  }

  /// The whole tape as text, highest position first.
  pub fn tape_string(&self) -> Result<String, Fault> {
    (0..self.tape_len()).rev()
                        .map(|position| self.symbol_at(position).map(|symbol| symbol.to_char()))
                        .collect()
  }

  /// How many cells hold `symbol`.
  pub fn count_symbols(&self, symbol: Symbol) -> Result<usize, Fault> {
    let mut count = 0;
    for position in 0..self.tape_len() {
      if self.symbol_at(position)? == symbol {
        count += 1;
      }
    }
    Ok(count)
  }

  // endregion

}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::TransitionRow;
  use crate::symbol::Move;

  fn blank_machine(symbols: usize) -> Machine {
    Machine::with_table(&[TransitionRow::new([Symbol::One; 3], [Move::Right; 3], [0; 3])], symbols)
      .unwrap()
  }

  #[test]
  fn write_then_read_at_head(){
    let mut machine = blank_machine(32);
    machine.place("0110", 20, 0).unwrap();
    let before = machine.tape_string().unwrap();
    for position in 0..machine.tape_len() {
      machine.set_head_position(position).unwrap();
      let original = machine.read_symbol_at_head().unwrap();
      for symbol in [Symbol::Zero, Symbol::One, Symbol::Blank].iter() {
        machine.write_symbol_at_head(*symbol).unwrap();
        assert_eq!(machine.read_symbol_at_head(), Ok(*symbol));
      }
      machine.write_symbol_at_head(original).unwrap();
      assert_eq!(machine.tape_string().unwrap(), before);
    }
  }

  #[test]
  fn writing_leaves_neighbours_alone(){
    let mut machine = blank_machine(16);
    machine.place("0101010101010101", 15, 0).unwrap();
    machine.set_head_position(6).unwrap();
    machine.write_symbol_at_head(Symbol::Blank).unwrap();
    assert_eq!(machine.tape_string().unwrap(), "010101010 010101");
  }

  #[test]
  fn place_counts_down(){
    let mut machine = blank_machine(16);
    machine.place("10 1", 5, 4).unwrap();
    assert_eq!(machine.symbol_at(5), Ok(Symbol::One));
    assert_eq!(machine.symbol_at(4), Ok(Symbol::Zero));
    assert_eq!(machine.symbol_at(3), Ok(Symbol::Blank));
    assert_eq!(machine.symbol_at(2), Ok(Symbol::One));
    assert_eq!(machine.head_position(), Ok(4));
    assert_eq!(machine.count_symbols(Symbol::One), Ok(2));
    assert_eq!(machine.tape_string().unwrap(), "          10 1  ");
  }

  #[test]
  fn place_rejects(){
    let mut machine = blank_machine(16);
    assert!(matches!(machine.place("12", 5, 5), Err(Fault::TapeText { .. })));
    assert!(matches!(machine.place("111", 1, 1), Err(Fault::TapeText { .. })));
    assert!(matches!(machine.place("1", 16, 1), Err(Fault::TapeText { .. })));
    assert!(matches!(machine.place("1", usize::MAX, 0), Err(Fault::TapeText { .. })));
    assert_eq!(machine.place("1", 3, 16), Err(Fault::HeadOutOfBounds { position: 16, length: 16 }));
  }

  #[test]
  fn head_bounds(){
    let mut machine = blank_machine(16);
    assert_eq!(
      machine.set_head_position(16),
      Err(Fault::HeadOutOfBounds { position: 16, length: 16 })
    );
    let offset = machine.head_field_offset();
    machine.store.write_word(offset, 62).unwrap();
    assert_eq!(machine.head_position(), Err(Fault::HeadOutOfBounds { position: -1, length: 16 }));
    assert_eq!(machine.validate(), Err(Fault::HeadOutOfBounds { position: -1, length: 16 }));
  }

}
