/*!
  A bit-addressable register machine whose whole state, program, registers and tape, lives in
  one byte buffer. Turing machines run on it as tables of transition entries: a fixed
  bootstrap written in the machine's own instructions performs each transition with nothing
  but word and symbol loads and stores, additions and multiplications.

  ```text
    [program header][entries ...][registers (50 words)][tape header][packed symbols ...]
  ```

  Entry 0 is `Halt`, entries 1 to 30 are the bootstrap, entry 31 is the halt state and the
  client's states follow.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bootstrap;
pub mod bytecode;
mod display;
pub mod error;
pub mod interpreter;
pub mod layout;
pub mod machine;
pub mod programs;
pub mod registers;
pub mod render;
pub mod store;
pub mod symbol;
pub mod tape;
pub mod tape_file;

pub use bytecode::{assemble, listing, Entry, Instruction, Opcode};
pub use error::{Fault, LoadError};
pub use interpreter::{RunOutcome, Step, DEFAULT_MAX_STEPS};
pub use layout::{Layout, TransitionRow};
pub use machine::Machine;
pub use programs::Program;
pub use render::Snapshot;
pub use symbol::{Move, Symbol};
