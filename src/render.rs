//! A three-line picture of a Turing machine's configuration: the tape from its highest
//! position down, a caret under the head, and the active state under the caret.

use std::fmt::{Display, Formatter};

use crate::error::Fault;
use crate::machine::Machine;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
  symbols : Vec<char>,
  /// Column of the head, counted in cells from the left.
  column  : usize,
  state   : Option<usize>,
  step    : usize,
}

impl Snapshot {

  pub fn capture(machine: &Machine, step: usize) -> Result<Snapshot, Fault> {
    let position = machine.head_position()?;
    Ok(Snapshot {
      symbols : machine.tape_string()?.chars().collect(),
      column  : machine.tape_len() - 1 - position,
      state   : machine.active_state()?,
      step
    })
  }

}

impl Display for Snapshot {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let cells = self.symbols.iter().map(char::to_string).collect::<Vec<String>>().join("|");
    // Each cell is one character plus its separator.
    let indent = " ".repeat(self.column * 2);
    let state = match self.state {
      Some(state) => state.to_string(),
      None        => "?".to_string()
    };
    writeln!(f, "{}    :{}", cells, self.step)?;
    writeln!(f, "{}^", indent)?;
    write!(f, "{}{}", indent, state)
  }
}
