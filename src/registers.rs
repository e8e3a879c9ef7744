/*!
  The register file: `MAX_REGISTERS` signed 32-bit words stored in the machine's own buffer,
  between the program region and the tape region. Registers are the only operands the
  instruction set has. Arithmetic wraps at 32 bits.

  A handful of registers carry the calling convention between the fetch loop and the
  bootstrap. They are named here once and used by both sides:

  | Register | Name            | Holds                                                |
  |----------|-----------------|------------------------------------------------------|
  | 27       | halt_sentinel   | instruction pointer value meaning "halted"           |
  | 29       | active_state    | state entry offset handed to the bootstrap           |
  | 30       | size_address    | bit offset of the program word count (0)             |
  | 31       | ip_address      | bit offset of the instruction pointer (32)           |
  | 32       | program_words   | program word count                                   |
  | 33       | ip              | instruction pointer                                  |
  | 35       | opcode          | opcode of the fetched entry                          |
  | 36..=41  | argK_address/argK | operand addresses and operands                     |
  | 42, 43   | next_address/next | address and value of the `next` field              |
  | 49       | bootstrap_entry | bit offset of the bootstrap's first instruction      |

  Registers 0 through 26 are bootstrap scratch.
*/

use bimap::BiMap;

use crate::address::MAX_REGISTERS;
use crate::error::Fault;
use crate::machine::Machine;
use crate::store::WORD_BITS;
use crate::symbol::Symbol;

/// Register indices are instruction operands, so they share the operand type.
pub type Register = i32;

pub const HALT_SENTINEL_REG   : Register = 27;
pub const ACTIVE_STATE_REG    : Register = 29;
pub const SIZE_ADDRESS_REG    : Register = 30;
pub const IP_ADDRESS_REG      : Register = 31;
pub const PROGRAM_WORDS_REG   : Register = 32;
pub const INSTRUCTION_PTR_REG : Register = 33;
pub const OPCODE_REG          : Register = 35;
pub const ARG_ADDRESS_REGS    : [Register; 3] = [36, 38, 40];
pub const ARG_REGS            : [Register; 3] = [37, 39, 41];
pub const NEXT_ADDRESS_REG    : Register = 42;
pub const NEXT_REG            : Register = 43;
pub const BOOTSTRAP_ENTRY_REG : Register = 49;

lazy_static! {
  static ref REGISTER_NAMES: BiMap<Register, String> = {
    let mut names = BiMap::new();
    let conventional = [
      (HALT_SENTINEL_REG,   "halt_sentinel"),
      (ACTIVE_STATE_REG,    "active_state"),
      (SIZE_ADDRESS_REG,    "size_address"),
      (IP_ADDRESS_REG,      "ip_address"),
      (PROGRAM_WORDS_REG,   "program_words"),
      (INSTRUCTION_PTR_REG, "ip"),
      (OPCODE_REG,          "opcode"),
      (ARG_ADDRESS_REGS[0], "arg0_address"),
      (ARG_REGS[0],         "arg0"),
      (ARG_ADDRESS_REGS[1], "arg1_address"),
      (ARG_REGS[1],         "arg1"),
      (ARG_ADDRESS_REGS[2], "arg2_address"),
      (ARG_REGS[2],         "arg2"),
      (NEXT_ADDRESS_REG,    "next_address"),
      (NEXT_REG,            "next"),
      (BOOTSTRAP_ENTRY_REG, "bootstrap_entry"),
    ];
    for (register, name) in conventional.iter() {
      names.insert(*register, name.to_string());
    }
    names
  };
}

pub fn register_name(register: Register) -> Option<&'static str> {
  REGISTER_NAMES.get_by_left(&register).map(String::as_str)
}

pub fn register_index(name: &str) -> Option<Register> {
  REGISTER_NAMES.get_by_right(&name.to_string()).copied()
}

impl Machine {

  // region Register file

  fn register_offset(&self, register: Register) -> Result<i64, Fault> {
    match register >= 0 && (register as usize) < MAX_REGISTERS {
      true  => Ok(self.layout.register_base() as i64 + register as i64 * WORD_BITS as i64),
      false => Err(Fault::RegisterOutOfRange { index: register as i64, limit: MAX_REGISTERS })
    }
  }

  pub fn register(&self, register: Register) -> Result<i32, Fault> {
    let offset = self.register_offset(register)?;
    Ok(self.store.read_word(offset)? as i32)
  }

  pub fn set_register(&mut self, register: Register, value: i32) -> Result<(), Fault> {
    let offset = self.register_offset(register)?;
    self.store.write_word(offset, value as u32)
  }

  /// Every register, in index order.
  pub fn registers(&self) -> Result<Vec<i32>, Fault> {
    (0..MAX_REGISTERS as Register).map(|register| self.register(register)).collect()
  }

  // endregion

  // region Register instructions

  pub fn load(&mut self, value: i32, r: Register) -> Result<(), Fault> {
    self.set_register(r, value)
  }

  pub fn clear_registers(&mut self) -> Result<(), Fault> {
    for register in 0..MAX_REGISTERS as Register {
      self.set_register(register, 0)?;
    }
    Ok(())
  }

  pub fn add(&mut self, r1: Register, r2: Register, r3: Register) -> Result<(), Fault> {
    let sum = self.register(r1)?.wrapping_add(self.register(r2)?);
    self.set_register(r3, sum)
  }

  pub fn multiply(&mut self, r1: Register, r2: Register, r3: Register) -> Result<(), Fault> {
    let product = self.register(r1)?.wrapping_mul(self.register(r2)?);
    self.set_register(r3, product)
  }

  /// `r1 - r2`, returned rather than stored. Zero exactly when the registers are equal.
  pub fn compare(&self, r1: Register, r2: Register) -> Result<i32, Fault> {
    Ok(self.register(r1)?.wrapping_sub(self.register(r2)?))
  }

  // endregion

  // region Indirect memory instructions

  /// Reads the word whose bit offset is in `ra` into `r`.
  pub fn word_read(&mut self, ra: Register, r: Register) -> Result<(), Fault> {
    let offset = self.register(ra)? as i64;
    let value = self.store.read_word(offset)?;
    self.set_register(r, value as i32)
  }

  /// Writes `rv` to the word whose bit offset is in `ra`.
  pub fn word_write(&mut self, rv: Register, ra: Register) -> Result<(), Fault> {
    let value = self.register(rv)?;
    let offset = self.register(ra)? as i64;
    self.store.write_word(offset, value as u32)
  }

  pub fn symbol_read(&mut self, ra: Register, r: Register) -> Result<(), Fault> {
    let offset = self.register(ra)? as i64;
    let symbol = self.store.read_symbol(offset)?;
    self.set_register(r, symbol as i32)
  }

  pub fn symbol_write(&mut self, rv: Register, ra: Register) -> Result<(), Fault> {
    let value = self.register(rv)?;
    let offset = self.register(ra)? as i64;
    if value < 0 || value > Symbol::Blank.code() as i32 {
      return Err(Fault::InvalidSymbol { offset, value: value as i64 });
    }
    self.store.write_symbol(offset, value as u8)
  }

  // endregion

}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::address::entry_offset;
  use crate::bytecode::Instruction;

  fn scratch_machine() -> Machine {
    Machine::from_program(&[Instruction::halt()], 16).unwrap()
  }

  #[test]
  fn names_are_bidirectional(){
    assert_eq!(register_name(ACTIVE_STATE_REG), Some("active_state"));
    assert_eq!(register_index("ip"), Some(INSTRUCTION_PTR_REG));
    assert_eq!(register_name(0), None);
    assert_eq!(register_index("r0"), None);
  }

  #[test]
  fn arithmetic(){
    let mut machine = scratch_machine();
    machine.load(7, 1).unwrap();
    machine.load(-12, 2).unwrap();
    machine.add(1, 2, 3).unwrap();
    machine.multiply(1, 2, 4).unwrap();
    assert_eq!(machine.register(3), Ok(-5));
    assert_eq!(machine.register(4), Ok(-84));
    assert_eq!(machine.compare(1, 2), Ok(19));
    assert_eq!(machine.compare(3, 3), Ok(0));
  }

  #[test]
  fn arithmetic_wraps(){
    let mut machine = scratch_machine();
    machine.load(i32::max_value(), 0).unwrap();
    machine.load(1, 1).unwrap();
    machine.add(0, 1, 2).unwrap();
    assert_eq!(machine.register(2), Ok(i32::min_value()));
  }

  #[test]
  fn clear(){
    let mut machine = scratch_machine();
    machine.load(5, 49).unwrap();
    machine.clear_registers().unwrap();
    assert!(machine.registers().unwrap().iter().all(|value| *value == 0));
  }

  #[test]
  fn out_of_range(){
    let mut machine = scratch_machine();
    assert_eq!(machine.load(1, 50), Err(Fault::RegisterOutOfRange { index: 50, limit: 50 }));
    assert_eq!(machine.register(-1), Err(Fault::RegisterOutOfRange { index: -1, limit: 50 }));
  }

  #[test]
  fn indirect_access(){
    let mut machine = scratch_machine();
    machine.load(32, IP_ADDRESS_REG).unwrap();
    machine.word_read(IP_ADDRESS_REG, INSTRUCTION_PTR_REG).unwrap();
    assert_eq!(machine.register(INSTRUCTION_PTR_REG), Ok(entry_offset(0) as i32));

    let symbol_address = machine.layout().tape_base() as i32 + 64 + 6;
    machine.load(symbol_address, 1).unwrap();
    machine.load(1, 2).unwrap();
    machine.symbol_write(2, 1).unwrap();
    machine.symbol_read(1, 3).unwrap();
    assert_eq!(machine.register(3), Ok(1));

    machine.load(3, 2).unwrap();
    assert_eq!(
      machine.symbol_write(2, 1),
      Err(Fault::InvalidSymbol { offset: symbol_address as i64, value: 3 })
    );
    let header_byte = machine.layout().tape_base() as i32 + 8;
    machine.load(header_byte, 1).unwrap();
    assert_eq!(machine.word_read(1, 4), Err(Fault::MisalignedWord(header_byte as i64)));
  }

}
