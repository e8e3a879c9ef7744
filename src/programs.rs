/*!
  Built-in Turing machines. Each runs on an 80-symbol tape and starts in state 1; state 0 is
  the halt state. Rows list, for read symbols `0`, `1` and blank, the symbol written, the head
  move and the next state.
*/

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::error::Fault;
use crate::layout::TransitionRow;
use crate::machine::Machine;
use crate::symbol::Move::{Left as L, Right as R, Stay as S};
use crate::symbol::Symbol::{Blank as B, One as I, Zero as O};

pub const TAPE_SYMBOLS: usize = 80;

#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter,
Clone,        Copy,          Eq, PartialEq, Debug, Hash
)]
pub enum Program {
  /// Adds one to the binary number ending at the head.
  #[strum(serialize = "add1")]
  Add1,
  /// Subtracts the number right of the gap from the one left of it, one unit at a time.
  #[strum(serialize = "sub1")]
  Sub1,
  #[strum(serialize = "bb3")]
  BusyBeaver3,
  #[strum(serialize = "bb4")]
  BusyBeaver4,
  /// Leaves a `1` under the head when the binary string on the tape reads the same in both
  /// directions, and a `0` otherwise.
  #[strum(serialize = "pal")]
  Palindrome,
}

impl Program {

  pub fn rows(&self) -> Vec<TransitionRow> {
    let row = TransitionRow::new;
    match self {

      Program::Add1 => vec![
        row([O, I, B], [L, L, R], [1, 1, 2]),
        row([I, O, I], [R, R, L], [3, 2, 3]),
        row([O, I, B], [L, L, R], [3, 3, 0]),
      ],

      Program::Sub1 => vec![
        row([O, I, B], [L, L, L], [1, 1, 2]),
        row([O, I, B], [L, L, R], [2, 2, 3]),
        row([O, O, B], [R, R, L], [3, 4, 5]),
        row([O, I, B], [R, R, R], [4, 4, 8]),
        row([O, I, B], [L, L, R], [5, 5, 6]),
        row([B, I, B], [R, R, R], [6, 6, 7]),
        row([B, I, B], [R, R, L], [7, 7, 0]),
        row([O, O, B], [R, L, L], [8, 1, 0]),
      ],

      Program::BusyBeaver3 => vec![
        row([B, I, I], [S, S, L], [1, 0, 2]),
        row([B, I, B], [S, L, L], [1, 2, 3]),
        row([B, I, I], [S, R, R], [1, 1, 3]),
      ],

      Program::BusyBeaver4 => vec![
        row([B, I, I], [S, L, R], [1, 2, 2]),
        row([B, B, I], [S, L, L], [1, 3, 1]),
        row([B, I, I], [S, L, R], [1, 4, 0]),
        row([B, B, I], [S, R, R], [1, 1, 4]),
      ],

      Program::Palindrome => vec![
        row([O, I, B], [L, L, R], [1, 1, 2]),
        row([B, B, I], [R, R, S], [3, 5, 0]),
        row([O, I, B], [R, R, L], [3, 3, 4]),
        row([B, I, B], [L, S, S], [1, 7, 1]),
        row([O, I, B], [R, R, L], [5, 5, 6]),
        row([O, B, B], [S, L, S], [7, 1, 1]),
        row([B, B, O], [L, L, S], [7, 7, 0]),
      ],

    } // end match self
  }

  /// The tape text, the position of its first character and the head position.
  pub fn input(&self) -> (&'static str, usize, usize) {
    match self {
      Program::Add1        => ("1", 4, 4),
      Program::Sub1        => ("11111111 111", 20, 13),
      Program::BusyBeaver3 => (" ", 4, 10),
      Program::BusyBeaver4 => (" ", 4, 10),
      Program::Palindrome  => ("1111111111 ", 20, 15),
    }
  }

  pub fn build(&self) -> Result<Machine, Fault> {
    let (text, position, head) = self.input();
    self.build_with(text, position, head)
  }

  /// The program's table on a fresh tape holding `text`.
  pub fn build_with(&self, text: &str, position: usize, head: usize) -> Result<Machine, Fault> {
    let mut machine = Machine::with_table(&self.rows(), TAPE_SYMBOLS)?;
    machine.place(text, position, head)?;
    Ok(machine)
  }

}
