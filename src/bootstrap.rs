/*!
  The bootstrap: thirty generic instructions that perform one Turing-machine transition.

  The fetch loop enters it at `BOOTSTRAP_ENTRY` after copying the active state's entry offset
  into `ACTIVE_STATE_REG`. Using nothing but loads, word and symbol reads and writes, adds and
  multiplies, it

   1. finds the tape region from the program word count and reads the head field,
   2. reads the symbol `x` under the head,
   3. reads the write-symbol, move and next-state fields of the state's entry for `x`,
   4. writes the symbol, moves the head,
   5. and `Return`s the next state's entry offset into the instruction pointer.

  Field addresses inside a transition entry at offset `s` are
  `s + 32 + 2x` (write symbol), `s + 40 + 2x` (move) and `s + 64 + 32x` (next state).
*/

use crate::address::{entry_offset, BOOTSTRAP_ENTRY, HALT_ENTRY, MAX_REGISTERS,
                     INSTRUCTION_POINTER_FIELD, WORD_COUNT_FIELD};
use crate::bytecode::{Instruction, Opcode};
use crate::registers::{Register, ACTIVE_STATE_REG};
use crate::store::{BITS_PER_BYTE, SYMBOL_BITS};

// Scratch registers. `WORD_BITS` doubles as the address of the instruction pointer.
const SIZE_ADDRESS   : Register = 0;
const WORD_BITS      : Register = 1;
const PROGRAM_WORDS  : Register = 2;
const REGISTER_WORDS : Register = 4;
const REGION_WORDS   : Register = 5;
const TAPE_BASE      : Register = 6;
const HEAD_ADDRESS   : Register = 7;
const HEAD           : Register = 8;
const SYMBOL_ADDRESS : Register = 9;
const SYMBOL         : Register = 10;
const TWO            : Register = 11;
const SYMBOL_SHIFT   : Register = 12;
const WRITE_ADDRESS  : Register = 13;
const EIGHT          : Register = 14;
const MOVE_ADDRESS   : Register = 15;
const NEXT_BASE      : Register = 16;
const NEXT_SHIFT     : Register = 17;
const NEXT_ADDRESS   : Register = 18;
const MOVE_CODE      : Register = 19;
const MINUS_ONE      : Register = 20;
const DELTA          : Register = 21;
const BIT_DELTA      : Register = 22;
const NEW_HEAD       : Register = 23;
const NEW_SYMBOL     : Register = 24;
const NEW_STATE      : Register = 25;
const SYMBOL_FIELD   : Register = 26;

/// Opcode and operands of each bootstrap instruction, in execution order.
const BOOTSTRAP: [(Opcode, [i32; 3]); 30] = [
  // Header field addresses.
  (Opcode::Load,        [WORD_COUNT_FIELD as i32,          SIZE_ADDRESS,   0]),
  (Opcode::Load,        [INSTRUCTION_POINTER_FIELD as i32, WORD_BITS,      0]),
  (Opcode::WordRead,    [SIZE_ADDRESS,   PROGRAM_WORDS,  0]),
  // The tape region follows the program and the registers.
  (Opcode::Load,        [MAX_REGISTERS as i32, REGISTER_WORDS, 0]),
  (Opcode::Add,         [PROGRAM_WORDS,  REGISTER_WORDS, REGION_WORDS]),
  (Opcode::Multiply,    [REGION_WORDS,   WORD_BITS,      TAPE_BASE]),
  (Opcode::Add,         [WORD_BITS,      TAPE_BASE,      HEAD_ADDRESS]),
  (Opcode::WordRead,    [HEAD_ADDRESS,   HEAD,           0]),
  (Opcode::Add,         [TAPE_BASE,      HEAD,           SYMBOL_ADDRESS]),
  (Opcode::SymbolRead,  [SYMBOL_ADDRESS, SYMBOL,         0]),
  // Write symbol: s + 32 + 2x.
  (Opcode::Load,        [SYMBOL_BITS as i32, TWO, 0]),
  (Opcode::Multiply,    [TWO,            SYMBOL,         SYMBOL_SHIFT]),
  (Opcode::Add,         [ACTIVE_STATE_REG, SYMBOL_SHIFT, SYMBOL_FIELD]),
  (Opcode::Add,         [SYMBOL_FIELD,   WORD_BITS,      WRITE_ADDRESS]),
  (Opcode::SymbolRead,  [WRITE_ADDRESS,  NEW_SYMBOL,     0]),
  // Move: the byte after the write symbols.
  (Opcode::Load,        [BITS_PER_BYTE as i32, EIGHT, 0]),
  (Opcode::Add,         [WRITE_ADDRESS,  EIGHT,          MOVE_ADDRESS]),
  (Opcode::SymbolRead,  [MOVE_ADDRESS,   MOVE_CODE,      0]),
  (Opcode::Load,        [-1,             MINUS_ONE,      0]),
  (Opcode::Add,         [MOVE_CODE,      MINUS_ONE,      DELTA]),
  (Opcode::Multiply,    [TWO,            DELTA,          BIT_DELTA]),
  (Opcode::Add,         [HEAD,           BIT_DELTA,      NEW_HEAD]),
  // Next state: s + 64 + 32x.
  (Opcode::Add,         [WORD_BITS,      ACTIVE_STATE_REG, NEXT_BASE]),
  (Opcode::Add,         [WORD_BITS,      NEXT_BASE,      NEXT_BASE]),
  (Opcode::Multiply,    [WORD_BITS,      SYMBOL,         NEXT_SHIFT]),
  (Opcode::Add,         [NEXT_BASE,      NEXT_SHIFT,     NEXT_ADDRESS]),
  (Opcode::WordRead,    [NEXT_ADDRESS,   NEW_STATE,      0]),
  // Commit.
  (Opcode::SymbolWrite, [NEW_SYMBOL,     SYMBOL_ADDRESS, 0]),
  (Opcode::WordWrite,   [NEW_HEAD,       HEAD_ADDRESS,   0]),
  (Opcode::Return,      [NEW_STATE,      WORD_BITS,      0]),
];

pub const BOOTSTRAP_LEN: usize = BOOTSTRAP.len();

/// The bootstrap as placed at entries `BOOTSTRAP_ENTRY..BOOTSTRAP_ENTRY + BOOTSTRAP_LEN`,
/// each instruction chained to the next.
pub fn bootstrap() -> Vec<Instruction> {
  BOOTSTRAP.iter().enumerate().map(|(k, (opcode, args))| {
    let next = match opcode.falls_through() {
      true  => entry_offset(BOOTSTRAP_ENTRY + k + 1),
      false => entry_offset(HALT_ENTRY)
    };
    Instruction::new(*opcode, *args, next)
  }).collect()
}
