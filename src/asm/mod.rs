//! Quest script assembly toolchain.
//!
//! Text and binary round-trip through the same instruction model:
//!
//! ```text
//! source --tokenize--> tokens --assemble--> instructions --encode--> bytes
//! bytes  --decode----> instructions --disassemble--> source
//! ```
//!
//! The opcode table drives both directions; it is constructed explicitly
//! and passed by reference so the assembler and disassembler carry no
//! hidden global state.

pub mod assembler;
pub mod disassembler;
pub mod instruction;
pub mod opcode;
pub mod token;

pub use assembler::{AsmError, Assembler, LabelIndex, Program};
pub use disassembler::Disassembler;
pub use instruction::{decode_program, encode_program, Arg, DecodeError, Instruction};
pub use opcode::{Opcode, OpcodeTable, ParamType};
pub use token::{tokenize_line, Token, TokenKind};
