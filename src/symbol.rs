//! Tape symbols and head moves, the two 2-bit codes a transition entry packs.

use std::convert::TryFrom;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::error::Fault;

/// The value of one tape cell. The discriminants are the stored 2-bit codes.
#[derive(
StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,    Debug,        Hash
)]
#[repr(u8)]
pub enum Symbol {
  Zero,
  One,
  Blank,
}

impl Symbol {

  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn from_code(code: u8, offset: i64) -> Result<Symbol, Fault> {
    Symbol::try_from(code).map_err(|_| Fault::InvalidSymbol { offset, value: code as i64 })
  }

  /// Tape text uses `'0'`, `'1'` and a space for blank.
  pub fn from_char(c: char) -> Option<Symbol> {
    match c {
      '0' => Some(Symbol::Zero),
      '1' => Some(Symbol::One),
      ' ' => Some(Symbol::Blank),
      _   => None
    }
  }

  pub fn to_char(&self) -> char {
    match self {
      Symbol::Zero  => '0',
      Symbol::One   => '1',
      Symbol::Blank => ' '
    }
  }

}

/// Where the head goes after a transition writes its symbol.
#[derive(
StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,    Debug,        Hash
)]
#[repr(u8)]
pub enum Move {
  Left,
  Stay,
  Right,
}

impl Move {

  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn from_code(code: u8) -> Result<Move, Fault> {
    Move::try_from(code).map_err(|_| Fault::InvalidMove(code))
  }

  /// Head displacement in tape positions. The bootstrap computes the same value as `code - 1`.
  pub fn delta(&self) -> i32 {
    self.code() as i32 - 1
  }

  /// The move for a displacement of -1, 0 or +1.
  pub fn from_delta(delta: i32) -> Option<Move> {
    match delta {
      -1 => Some(Move::Left),
      0  => Some(Move::Stay),
      1  => Some(Move::Right),
      _  => None
    }
  }

  /// Short form used in entry listings.
  pub fn arrow(&self) -> char {
    match self {
      Move::Left  => '<',
      Move::Stay  => '.',
      Move::Right => '>'
    }
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn symbol_codes(){
    assert_eq!(Symbol::Blank.code(), 2);
    assert_eq!(Symbol::from_code(1, 0), Ok(Symbol::One));
    assert_eq!(Symbol::from_code(3, 18), Err(Fault::InvalidSymbol { offset: 18, value: 3 }));
  }

  #[test]
  fn symbol_text(){
    for c in "01 ".chars() {
      assert_eq!(Symbol::from_char(c).map(|s| s.to_char()), Some(c));
    }
    assert_eq!(Symbol::from_char('x'), None);
  }

  #[test]
  fn move_deltas(){
    assert_eq!(Move::Left.delta(), -1);
    assert_eq!(Move::Stay.delta(), 0);
    assert_eq!(Move::Right.delta(), 1);
    assert_eq!(Move::from_delta(1), Some(Move::Right));
    assert_eq!(Move::from_delta(2), None);
    assert_eq!(Move::from_code(3), Err(Fault::InvalidMove(3)));
  }

}
