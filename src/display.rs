//! The diagnostic dump of a machine: its program entries and its registers side by side.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::{entry_offset, MAX_REGISTERS};
use crate::machine::Machine;
use crate::registers::{register_name, Register};

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Machine {

  // region Display methods

  fn make_entry_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Entry", ubr->"Offset", ubl->"Contents"]);

    let current = self.active_instruction_offset().ok();
    for index in 0..self.entry_count() {
      let offset = entry_offset(index);
      let contents = match self.entry(index) {
        Ok(entry) => entry.to_string(),
        Err(fault) => format!("<{}>", fault)
      };
      match Some(offset) == current {

        true  => {
          table.add_row(row![r->format!("* --> {}", index), r->offset, contents]);
        }

        false => {
          table.add_row(row![r->index, r->offset, contents]);
        }

      } // end match on current entry
    } // end for
    table
  }

  fn make_register_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Name", ubl->"Contents"]);

    for register in 0..MAX_REGISTERS as Register {
      let value = match self.register(register) {
        Ok(value)  => value.to_string(),
        Err(fault) => format!("<{}>", fault)
      };
      table.add_row(
        row![r->format!("R[{}] =", register), register_name(register).unwrap_or(""), value]
      );
    }
    table
  }

  // endregion

}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let entry_table    = self.make_entry_table();
    let register_table = self.make_register_table();

    let mut combined_table = table!([entry_table, register_table]);
    combined_table.set_titles(row![ub->"Program", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let head = match self.head_position() {
      Ok(position) => position.to_string(),
      Err(fault)   => format!("<{}>", fault)
    };
    let state = match self.active_state() {
      Ok(Some(state)) => state.to_string(),
      Ok(None)        => "none".to_string(),
      Err(fault)      => format!("<{}>", fault)
    };

    write!(
      f,
      "Entries: {}\tTape: {} symbols\tHead: {}\tState: {}\n{}",
      self.entry_count(), self.tape_len(), head, state, combined_table
    )
  }
}


#[cfg(test)]
mod tests {
  use crate::bytecode::assemble;
  use crate::machine::Machine;
  use crate::programs::Program;

  #[test]
  fn dump_mentions_entries_and_registers(){
    let machine = Program::Add1.build().unwrap();
    let text = machine.to_string();
    assert!(text.starts_with("Entries: 35\tTape: 80 symbols\tHead: 4\tState: 1"));
    assert!(text.contains("* --> 32"));
    assert!(text.contains("Halt"));
    assert!(text.contains("Transition[0:0<S[1]"));
    assert!(text.contains("halt_sentinel"));
  }

  #[test]
  fn dump_of_a_generic_program(){
    let program = assemble("Load(5, 1)\nHalt").unwrap();
    let text = Machine::from_program(&program, 16).unwrap().to_string();
    assert!(text.starts_with("Entries: 2\tTape: 16 symbols\tHead: 0\tState: none"));
    assert!(text.contains("* --> 0"));
    assert!(text.contains("Load(5, 1) -> E[1]"));
  }

}
