//! Static opcode definitions and the lookup table built over them.
//!
//! The instruction set distinguishes explicit operands (encoded directly
//! after the opcode byte) from stack parameters (consumed from the virtual
//! arg stack populated by the `arg_push*` family). Opcodes with `push_stack`
//! set push their own operands onto that stack instead of acting on them.

use std::collections::HashMap;

/// Operand type as declared by an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    U8,
    U16,
    U32,
    I32,
    F32,
    Register,
    String,
    /// Label reference; carried as a u16 label id on the wire.
    Label,
    /// Count-prefixed list of u16 label ids, used by the switch jumps.
    SwitchData,
    /// Count-prefixed list of u8 register numbers, used by `jmp_on`/`jmp_off`.
    JumpData,
}

impl ParamType {
    /// Human-readable name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::U8 => "byte",
            ParamType::U16 => "word",
            ParamType::U32 => "dword",
            ParamType::I32 => "int",
            ParamType::F32 => "float",
            ParamType::Register => "register",
            ParamType::String => "string",
            ParamType::Label => "label",
            ParamType::SwitchData => "label list",
            ParamType::JumpData => "register list",
        }
    }
}

/// One opcode definition. Immutable; created once in the static table.
#[derive(Debug, PartialEq, Eq)]
pub struct Opcode {
    pub code: u8,
    pub mnemonic: &'static str,
    /// Explicit parameters, encoded alongside the instruction.
    pub params: &'static [ParamType],
    /// Parameters consumed from the virtual stack. Rightmost listed sits on
    /// top of the stack when the instruction executes.
    pub stack_params: &'static [ParamType],
    /// When set, the instruction's own operands are pushed onto the virtual
    /// stack rather than interpreted directly.
    pub push_stack: bool,
}

const fn op(
    code: u8,
    mnemonic: &'static str,
    params: &'static [ParamType],
    stack_params: &'static [ParamType],
    push_stack: bool,
) -> Opcode {
    Opcode {
        code,
        mnemonic,
        params,
        stack_params,
        push_stack,
    }
}

use ParamType::{JumpData, Label, Register, String, SwitchData, F32, I32, U16, U32, U8};

/// The quest script instruction set handled by this toolchain.
static OPCODES: &[Opcode] = &[
    op(0x00, "nop", &[], &[], false),
    op(0x01, "ret", &[], &[], false),
    op(0x02, "sync", &[], &[], false),
    op(0x03, "exit", &[U32], &[], false),
    op(0x04, "thread", &[Label], &[], false),
    op(0x05, "va_start", &[], &[], false),
    op(0x06, "va_end", &[], &[], false),
    op(0x08, "let", &[Register, Register], &[], false),
    op(0x09, "leti", &[Register, I32], &[], false),
    op(0x0A, "letb", &[Register, U8], &[], false),
    op(0x0B, "letw", &[Register, U16], &[], false),
    op(0x0C, "leta", &[Register, U32], &[], false),
    op(0x10, "set", &[Register], &[], false),
    op(0x11, "clear", &[Register], &[], false),
    op(0x12, "rev", &[Register], &[], false),
    op(0x16, "call", &[Label], &[], false),
    op(0x18, "jmp", &[Label], &[], false),
    op(0x1B, "jmp_on", &[Label, JumpData], &[], false),
    op(0x1C, "jmp_off", &[Label, JumpData], &[], false),
    op(0x20, "switch_jmp", &[Register, SwitchData], &[], false),
    op(0x21, "switch_call", &[Register, SwitchData], &[], false),
    op(0x30, "fleti", &[Register, F32], &[], false),
    op(0x31, "fadd", &[Register, Register], &[], false),
    op(0x32, "faddi", &[Register, F32], &[], false),
    op(0x40, "arg_pushb", &[U8], &[], true),
    op(0x41, "arg_pushw", &[U16], &[], true),
    op(0x42, "arg_pushl", &[U32], &[], true),
    op(0x43, "arg_pushr", &[Register], &[], true),
    op(0x44, "arg_pushs", &[String], &[], true),
    op(0x50, "message", &[], &[U32, String], false),
    op(0x51, "window_msg", &[], &[String], false),
    op(0x52, "add_msg", &[], &[String], false),
    op(0x53, "winend", &[], &[], false),
    op(0x54, "bgm", &[], &[U32], false),
    op(0x55, "se", &[], &[U32], false),
];

/// Immutable registry mapping opcode codes and mnemonics to definitions.
///
/// Built once and passed by reference into the assembler and decoder; there
/// is no ambient global instance.
pub struct OpcodeTable {
    by_code: HashMap<u8, &'static Opcode>,
    by_mnemonic: HashMap<&'static str, &'static Opcode>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        let mut by_code = HashMap::with_capacity(OPCODES.len());
        let mut by_mnemonic = HashMap::with_capacity(OPCODES.len());
        for opcode in OPCODES {
            by_code.insert(opcode.code, opcode);
            by_mnemonic.insert(opcode.mnemonic, opcode);
        }
        Self {
            by_code,
            by_mnemonic,
        }
    }

    pub fn lookup(&self, code: u8) -> Option<&'static Opcode> {
        self.by_code.get(&code).copied()
    }

    pub fn lookup_mnemonic(&self, mnemonic: &str) -> Option<&'static Opcode> {
        self.by_mnemonic.get(mnemonic).copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}
