//! Toolchain for quest script bytecode.
//!
//! Three layers, leaves first:
//!
//! - [`bytes`]: the buffer/cursor primitives every file-format decoder in
//!   the application builds on, giving bounded, endianness-aware binary I/O.
//! - [`asm::opcode`]: the static opcode registry, including the implicit
//!   virtual-stack calling convention (`arg_push*` and friends).
//! - [`asm`]: tokenizer, two-pass assembler and stack-simulating
//!   disassembler over those primitives.
//!
//! Everything is synchronous and operates on in-memory data; loading raw
//! bytes from disk or network is the caller's concern.

pub mod asm;
pub mod bytes;

pub use asm::{
    decode_program, encode_program, tokenize_line, Arg, AsmError, Assembler, DecodeError,
    Disassembler, Instruction, LabelIndex, Opcode, OpcodeTable, ParamType, Program, Token,
    TokenKind,
};
pub use bytes::{Buffer, Cursor, CursorError, CursorMut, Endianness};
