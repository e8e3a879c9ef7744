/*!
  The human readable textual form of generic programs is called assembly. One instruction per
  line, in the form

  ```text
    Mnemonic(arg, arg, arg) -> next   # comment
  ```

  Mnemonics are the `Opcode` names. Arguments are signed integers or `$name` for a register
  with a conventional name. The `-> next` part names the entry to run afterwards, either as an
  entry index or as a raw bit offset written `@bits`; without it an instruction continues with
  the entry that follows it, and `Halt` and `Return` point at entry 0. Instruction `k` of the
  text becomes entry `k`.

  `listing` goes the other way, so assembling a listing reproduces the program.
*/

use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{
    alpha1,
    alphanumeric1,
    char as one_char,
    digit1,
    space0
  },
  combinator::{all_consuming, map, opt, recognize},
  multi::{many1, separated_list},
  sequence::{delimited, pair, preceded, terminated, tuple},
  IResult
};
use thiserror::Error;

use crate::address::{entry_index, entry_offset, BitOffset, HALT_ENTRY};
use crate::bytecode::{Instruction, Opcode};
use crate::registers::{register_index, register_name};

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AssemblyError {
  #[error("line {line}: cannot parse {text:?}")]
  Syntax { line: usize, text: String },

  #[error("line {line}: {name} is not an operation")]
  NotAnOperation { line: usize, name: String },

  #[error("line {line}: {opcode} requires {expected} arguments but was given {found}")]
  WrongArity { line: usize, opcode: Opcode, expected: usize, found: usize },

  #[error("line {line}: ${name} is not a register name")]
  UnknownRegister { line: usize, name: String },

  #[error("line {line}: {text} does not fit in a word")]
  BadNumber { line: usize, text: String },
}

enum Operand<'a> {
  Number(&'a str),
  Register(&'a str),
}

enum Target<'a> {
  Entry(&'a str),
  Offset(&'a str),
}

struct ParsedLine<'a> {
  mnemonic : &'a str,
  operands : Vec<Operand<'a>>,
  target   : Option<Target<'a>>,
}

// region Parsers

fn signed_number(input: &str) -> IResult<&str, &str> {
  recognize(pair(opt(one_char('-')), digit1))(input)
}

fn register_operand(input: &str) -> IResult<&str, &str> {
  preceded(one_char('$'), recognize(many1(alt((alphanumeric1, tag("_"))))))(input)
}

fn operand(input: &str) -> IResult<&str, Operand> {
  delimited(
    space0,
    alt((
      map(register_operand, Operand::Register),
      map(signed_number, Operand::Number)
    )),
    space0
  )(input)
}

fn operand_list(input: &str) -> IResult<&str, Vec<Operand>> {
  delimited(
    terminated(one_char('('), space0),
    separated_list(one_char(','), operand),
    preceded(space0, one_char(')'))
  )(input)
}

fn target(input: &str) -> IResult<&str, Target> {
  preceded(
    tuple((space0, tag("->"), space0)),
    alt((
      map(preceded(one_char('@'), digit1), Target::Offset),
      map(digit1, Target::Entry)
    ))
  )(input)
}

fn instruction_line(input: &str) -> IResult<&str, ParsedLine> {
  map(
    all_consuming(
      delimited(
        space0,
        tuple((alpha1, preceded(space0, opt(operand_list)), opt(target))),
        space0
      )
    ),
    |(mnemonic, operands, target)| {
      ParsedLine { mnemonic, operands: operands.unwrap_or_default(), target }
    }
  )(input)
}

// endregion

fn resolve_operand(line: usize, operand: &Operand) -> Result<i32, AssemblyError> {
  match operand {
    Operand::Number(text) => {
      text.parse::<i32>()
          .map_err(|_| AssemblyError::BadNumber { line, text: text.to_string() })
    }
    Operand::Register(name) => {
      register_index(name)
        .ok_or_else(|| AssemblyError::UnknownRegister { line, name: name.to_string() })
    }
  }
}

fn resolve_target(line: usize, target: &Target) -> Result<BitOffset, AssemblyError> {
  let bad_number = |text: &str| AssemblyError::BadNumber { line, text: text.to_string() };
  match target {
    Target::Entry(text) => {
      let index = text.parse::<usize>().map_err(|_| bad_number(text))?;
      // The largest entry index whose offset still fits a word.
      match index <= (BitOffset::max_value() as usize / 8 - 8) / 20 {
        true  => Ok(entry_offset(index)),
        false => Err(bad_number(text))
      }
    }
    Target::Offset(text) => text.parse::<BitOffset>().map_err(|_| bad_number(text))
  }
}

/// Where an instruction at entry `index` goes when its text names no target.
fn default_next(opcode: Opcode, index: usize) -> BitOffset {
  match opcode.falls_through() {
    true  => entry_offset(index + 1),
    false => entry_offset(HALT_ENTRY)
  }
}

pub fn assemble(text: &str) -> Result<Vec<Instruction>, AssemblyError> {
  let mut program = Vec::new();

  for (line_index, raw_line) in text.lines().enumerate() {
    let line = line_index + 1;
    let code = match raw_line.find('#') {
      Some(start) => &raw_line[..start],
      None        => raw_line
    };
    if code.trim().is_empty() {
      continue;
    }

    let parsed = match instruction_line(code) {
      Ok((_rest, parsed)) => parsed,
      Err(_e) => return Err(AssemblyError::Syntax { line, text: code.trim().to_string() })
    };

    let opcode = match Opcode::from_str(parsed.mnemonic) {
      Ok(Opcode::Transition) | Err(_) => {
        return Err(AssemblyError::NotAnOperation { line, name: parsed.mnemonic.to_string() });
      }
      Ok(opcode) => opcode
    };

    if parsed.operands.len() != opcode.arity() {
      return Err(AssemblyError::WrongArity {
        line,
        opcode,
        expected: opcode.arity(),
        found: parsed.operands.len()
      });
    }

    let mut args = [0i32; 3];
    for (k, operand) in parsed.operands.iter().enumerate() {
      args[k] = resolve_operand(line, operand)?;
    }

    let next = match &parsed.target {
      Some(target) => resolve_target(line, target)?,
      None         => default_next(opcode, program.len())
    };

    program.push(Instruction::new(opcode, args, next));
  }

  Ok(program)
}

/// Renders `program` as assembly, naming conventional registers.
pub fn listing(program: &[Instruction]) -> String {
  let mut text = String::new();

  for (index, instruction) in program.iter().enumerate() {
    text.push_str(&instruction.opcode.to_string());

    if instruction.opcode.arity() > 0 {
      let operands = instruction.operands().iter().enumerate().map(|(k, value)| {
        match (instruction.opcode.is_register_operand(k), register_name(*value)) {
          (true, Some(name)) => format!("${}", name),
          _                  => value.to_string()
        }
      }).collect::<Vec<String>>();
      text.push_str(&format!("({})", operands.join(", ")));
    }

    if instruction.next != default_next(instruction.opcode, index) {
      match entry_index(instruction.next) {
        Some(target) => text.push_str(&format!(" -> {}", target)),
        None         => text.push_str(&format!(" -> @{}", instruction.next))
      }
    }

    text.push('\n');
  }

  text
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::registers::{ACTIVE_STATE_REG, INSTRUCTION_PTR_REG};

  #[test]
  fn simple_program(){
    let text = "
      # square of a sum
      Load(5, 1)
      Load (  7 , 2 )
      Add(1, 2, 3)     # r3 = 12
      Multiply(3, 3, 4)
      Halt
    ";
    let program = assemble(text).unwrap();
    assert_eq!(
      program,
      vec![
        Instruction::load(5, 1, entry_offset(1)),
        Instruction::load(7, 2, entry_offset(2)),
        Instruction::add(1, 2, 3, entry_offset(3)),
        Instruction::multiply(3, 3, 4, entry_offset(4)),
        Instruction::halt()
      ]
    );
  }

  #[test]
  fn targets_and_names(){
    let program = assemble("Load(-3, $active_state) -> 7\nReturn($ip, 31)\nAdd(1,1,1) -> @96").unwrap();
    assert_eq!(program[0], Instruction::load(-3, ACTIVE_STATE_REG, entry_offset(7)));
    assert_eq!(program[1].args, [INSTRUCTION_PTR_REG, 31, 0]);
    assert_eq!(program[1].next, entry_offset(0));
    assert_eq!(program[2].next, 96);
  }

  #[test]
  fn listing_round_trip(){
    let text = "Load(32, $ip_address)\nWordRead($ip_address, $ip)\nAdd(0, 0, 0) -> 0\nWordWrite(1, 2) -> @40\nClearRegisters\nHalt\n";
    let program = assemble(text).unwrap();
    assert_eq!(listing(&program), text);
    assert_eq!(assemble(&listing(&program)).unwrap(), program);
  }

  #[test]
  fn not_an_operation(){
    assert_eq!(
      assemble("Halt\n  Jump(3)"),
      Err(AssemblyError::NotAnOperation { line: 2, name: "Jump".to_string() })
    );
    assert_eq!(
      assemble("Transition"),
      Err(AssemblyError::NotAnOperation { line: 1, name: "Transition".to_string() })
    );
  }

  #[test]
  fn wrong_arity(){
    assert_eq!(
      assemble("Add(1, 2)"),
      Err(AssemblyError::WrongArity { line: 1, opcode: Opcode::Add, expected: 3, found: 2 })
    );
    assert_eq!(
      assemble("Halt(1)"),
      Err(AssemblyError::WrongArity { line: 1, opcode: Opcode::Halt, expected: 0, found: 1 })
    );
  }

  #[test]
  fn bad_operands(){
    assert_eq!(
      assemble("Load(1, $nowhere)"),
      Err(AssemblyError::UnknownRegister { line: 1, name: "nowhere".to_string() })
    );
    assert_eq!(
      assemble("Load(99999999999, 1)"),
      Err(AssemblyError::BadNumber { line: 1, text: "99999999999".to_string() })
    );
    assert_eq!(
      assemble("Load(1, 2"),
      Err(AssemblyError::Syntax { line: 1, text: "Load(1, 2".to_string() })
    );
  }

}
