//! Instruction model and the cursor-driven wire codec.
//!
//! Wire format: 1-byte opcode code, then each operand encoded per its
//! declared parameter type. There is no instruction length prefix; decoders
//! learn how many bytes to consume from the opcode table.

use serde::Serialize;
use thiserror::Error;

use crate::asm::opcode::{Opcode, OpcodeTable, ParamType};
use crate::bytes::{Buffer, Cursor, CursorError, CursorMut, Endianness};

/// One operand value. Closed set; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Arg {
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    F32(f32),
    Register(u8),
    String(String),
    SwitchData(Vec<u16>),
    JumpData(Vec<u8>),
}

impl Arg {
    /// Encoded width in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            Arg::U8(_) | Arg::Register(_) => 1,
            Arg::U16(_) => 2,
            Arg::U32(_) | Arg::I32(_) | Arg::F32(_) => 4,
            Arg::String(s) => s.chars().count() + 1,
            Arg::SwitchData(labels) => 1 + 2 * labels.len(),
            Arg::JumpData(registers) => 1 + registers.len(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown opcode 0x{code:02x} at offset {offset}")]
    UnknownOpcode { code: u8, offset: usize },
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// A decoded or assembled instruction.
///
/// For ordinary opcodes `args` pairs up with `opcode.params`; for
/// `push_stack` opcodes it holds the values pushed at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: &'static Opcode,
    pub args: Vec<Arg>,
}

impl Instruction {
    pub fn new(opcode: &'static Opcode, args: Vec<Arg>) -> Self {
        Self { opcode, args }
    }

    /// Encoded width in bytes, opcode byte included.
    pub fn byte_size(&self) -> usize {
        1 + self.args.iter().map(Arg::byte_size).sum::<usize>()
    }

    pub fn encode(&self, cursor: &mut CursorMut<'_>) -> Result<(), CursorError> {
        cursor.write_u8(self.opcode.code)?;
        for arg in &self.args {
            match arg {
                Arg::U8(v) | Arg::Register(v) => cursor.write_u8(*v)?,
                Arg::U16(v) => cursor.write_u16(*v)?,
                Arg::U32(v) => cursor.write_u32(*v)?,
                Arg::I32(v) => cursor.write_i32(*v)?,
                Arg::F32(v) => cursor.write_f32(*v)?,
                Arg::String(s) => cursor.write_cstr(s)?,
                Arg::SwitchData(labels) => {
                    cursor.write_u8(labels.len() as u8)?;
                    for label in labels {
                        cursor.write_u16(*label)?;
                    }
                }
                Arg::JumpData(registers) => {
                    cursor.write_u8(registers.len() as u8)?;
                    for register in registers {
                        cursor.write_u8(*register)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn decode(
        cursor: &mut Cursor<'_>,
        table: &OpcodeTable,
    ) -> Result<Instruction, DecodeError> {
        let offset = cursor.position();
        let code = cursor.u8()?;
        let opcode = table
            .lookup(code)
            .ok_or(DecodeError::UnknownOpcode { code, offset })?;

        let mut args = Vec::with_capacity(opcode.params.len());
        for param in opcode.params {
            let arg = match param {
                ParamType::U8 => Arg::U8(cursor.u8()?),
                ParamType::U16 | ParamType::Label => Arg::U16(cursor.u16()?),
                ParamType::U32 => Arg::U32(cursor.u32()?),
                ParamType::I32 => Arg::I32(cursor.i32()?),
                ParamType::F32 => Arg::F32(cursor.f32()?),
                ParamType::Register => Arg::Register(cursor.u8()?),
                ParamType::String => Arg::String(cursor.cstr()?),
                ParamType::SwitchData => {
                    let count = cursor.u8()? as usize;
                    let mut labels = Vec::with_capacity(count);
                    for _ in 0..count {
                        labels.push(cursor.u16()?);
                    }
                    Arg::SwitchData(labels)
                }
                ParamType::JumpData => {
                    let count = cursor.u8()? as usize;
                    let mut registers = Vec::with_capacity(count);
                    for _ in 0..count {
                        registers.push(cursor.u8()?);
                    }
                    Arg::JumpData(registers)
                }
            };
            args.push(arg);
        }

        Ok(Instruction::new(opcode, args))
    }
}

/// Serialize an instruction list into a fresh buffer.
pub fn encode_program(
    instructions: &[Instruction],
    endianness: Endianness,
) -> Result<Buffer, CursorError> {
    let capacity = instructions.iter().map(Instruction::byte_size).sum();
    let mut buffer = Buffer::with_capacity(capacity);
    let mut cursor = buffer.cursor_mut(endianness);
    for instruction in instructions {
        instruction.encode(&mut cursor)?;
    }
    Ok(buffer)
}

/// Decode a whole instruction stream. An unknown opcode aborts the decode
/// of this stream; nothing is returned for it.
pub fn decode_program(
    buffer: &Buffer,
    endianness: Endianness,
    table: &OpcodeTable,
) -> Result<Vec<Instruction>, DecodeError> {
    let mut cursor = buffer.cursor(endianness);
    let mut instructions = Vec::new();
    while cursor.has_bytes_left() {
        instructions.push(Instruction::decode(&mut cursor, table)?);
    }
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OpcodeTable {
        OpcodeTable::new()
    }

    #[test]
    fn test_encode_decode_explicit_args() {
        let table = table();
        let instructions = vec![
            Instruction::new(
                table.lookup_mnemonic("leti").unwrap(),
                vec![Arg::Register(6), Arg::I32(-40)],
            ),
            Instruction::new(
                table.lookup_mnemonic("jmp").unwrap(),
                vec![Arg::U16(150)],
            ),
            Instruction::new(table.lookup_mnemonic("ret").unwrap(), vec![]),
        ];

        for endianness in [Endianness::Little, Endianness::Big] {
            let buffer = encode_program(&instructions, endianness).unwrap();
            assert_eq!(buffer.len(), 6 + 3 + 1);
            let decoded = decode_program(&buffer, endianness, &table).unwrap();
            assert_eq!(decoded, instructions);
        }
    }

    #[test]
    fn test_wire_layout_little_endian() {
        let table = table();
        let instruction = Instruction::new(
            table.lookup_mnemonic("jmp").unwrap(),
            vec![Arg::U16(0x0102)],
        );
        let buffer = encode_program(&[instruction], Endianness::Little).unwrap();
        assert_eq!(buffer.as_bytes(), &[0x18, 0x02, 0x01]);
    }

    #[test]
    fn test_switch_data_roundtrip() {
        let table = table();
        let instruction = Instruction::new(
            table.lookup_mnemonic("switch_jmp").unwrap(),
            vec![Arg::Register(2), Arg::SwitchData(vec![100, 200, 300])],
        );
        assert_eq!(instruction.byte_size(), 1 + 1 + 1 + 6);
        let buffer = encode_program(&[instruction.clone()], Endianness::Little).unwrap();
        let decoded = decode_program(&buffer, Endianness::Little, &table).unwrap();
        assert_eq!(decoded, vec![instruction]);
    }

    #[test]
    fn test_string_roundtrip() {
        let table = table();
        let instruction = Instruction::new(
            table.lookup_mnemonic("arg_pushs").unwrap(),
            vec![Arg::String("cave entrance".to_string())],
        );
        let buffer = encode_program(&[instruction.clone()], Endianness::Little).unwrap();
        let decoded = decode_program(&buffer, Endianness::Little, &table).unwrap();
        assert_eq!(decoded, vec![instruction]);
    }

    #[test]
    fn test_unknown_opcode_aborts_stream() {
        let table = table();
        let buffer = Buffer::from_bytes(vec![0x00, 0xFE, 0x00]);
        let err = decode_program(&buffer, Endianness::Little, &table).unwrap_err();
        match err {
            DecodeError::UnknownOpcode { code, offset } => {
                assert_eq!(code, 0xFE);
                assert_eq!(offset, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_operand_is_out_of_bounds() {
        let table = table();
        // leti r6 with only two of the four immediate bytes present.
        let buffer = Buffer::from_bytes(vec![0x09, 6, 0xD8, 0xFF]);
        let err = decode_program(&buffer, Endianness::Little, &table).unwrap_err();
        assert!(matches!(err, DecodeError::Cursor(CursorError::OutOfBounds { .. })));
    }
}
