//! Two-pass assembler for quest script source.
//!
//! Pass 1 tokenizes every line, records label declarations and builds the
//! instruction list, validating operand count and type against the opcode
//! table. Pass 2 resolves every label reference against the declarations.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::asm::instruction::{Arg, Instruction};
use crate::asm::opcode::{Opcode, OpcodeTable, ParamType};
use crate::asm::token::{tokenize_line, Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AsmError {
    #[error("unknown mnemonic `{mnemonic}` at line {line}, column {col}")]
    UnknownMnemonic {
        mnemonic: String,
        line: usize,
        col: usize,
    },
    #[error("argument mismatch for `{mnemonic}` at line {line}, column {col}: {message}")]
    ArgMismatch {
        mnemonic: String,
        line: usize,
        col: usize,
        message: String,
    },
    #[error("unresolved label {label} at line {line}")]
    UnresolvedLabel { label: u32, line: usize },
    #[error("duplicate label {label} at line {line}")]
    DuplicateLabel { label: u32, line: usize },
    #[error("invalid {what} at line {line}, column {col}")]
    InvalidToken {
        what: &'static str,
        line: usize,
        col: usize,
    },
    #[error("unknown section `.{name}` at line {line}, column {col}")]
    UnknownSection {
        name: String,
        line: usize,
        col: usize,
    },
}

/// Mapping between instruction indices and label ids. Built once by pass 1,
/// consulted read-only by the disassembler.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    by_index: BTreeMap<usize, u32>,
    by_label: HashMap<u32, usize>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `label` to `index`. Returns false if the label was already
    /// declared.
    pub fn insert(&mut self, label: u32, index: usize) -> bool {
        if self.by_label.contains_key(&label) {
            return false;
        }
        self.by_label.insert(label, index);
        self.by_index.insert(index, label);
        true
    }

    pub fn label_at(&self, index: usize) -> Option<u32> {
        self.by_index.get(&index).copied()
    }

    pub fn index_of(&self, label: u32) -> Option<usize> {
        self.by_label.get(&label).copied()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Iterate declarations in instruction order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.by_index.iter().map(|(&index, &label)| (index, label))
    }
}

/// An assembled program: the instruction list plus its label index.
#[derive(Debug, Clone)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: LabelIndex,
}

/// Assembler over a borrowed opcode table.
pub struct Assembler<'a> {
    table: &'a OpcodeTable,
}

impl<'a> Assembler<'a> {
    pub fn new(table: &'a OpcodeTable) -> Self {
        Self { table }
    }

    pub fn assemble(&self, source: &str) -> Result<Program, AsmError> {
        let mut instructions = Vec::new();
        let mut labels = LabelIndex::new();
        // Label references awaiting a declaration: (label, line).
        let mut pending: Vec<(u32, usize)> = Vec::new();

        for (line_idx, line_text) in source.lines().enumerate() {
            let line = line_idx + 1;
            let tokens = tokenize_line(line_text);
            let mut pos = 0;

            // Leading label declarations bind to the next instruction.
            while let Some(token) = tokens.get(pos) {
                match &token.kind {
                    TokenKind::Label(label) => {
                        if !labels.insert(*label, instructions.len()) {
                            return Err(AsmError::DuplicateLabel {
                                label: *label,
                                line,
                            });
                        }
                        pos += 1;
                    }
                    TokenKind::Section(name) => {
                        if name != "code" {
                            return Err(AsmError::UnknownSection {
                                name: name.clone(),
                                line,
                                col: token.col,
                            });
                        }
                        pos += 1;
                    }
                    _ => break,
                }
            }

            let Some(token) = tokens.get(pos) else {
                continue;
            };
            let mnemonic = match &token.kind {
                TokenKind::Mnemonic(mnemonic) => mnemonic,
                TokenKind::InvalidNumber => {
                    return Err(AsmError::InvalidToken {
                        what: "number",
                        line,
                        col: token.col,
                    })
                }
                TokenKind::InvalidSection => {
                    return Err(AsmError::InvalidToken {
                        what: "section",
                        line,
                        col: token.col,
                    })
                }
                other => {
                    return Err(AsmError::InvalidToken {
                        what: other.describe(),
                        line,
                        col: token.col,
                    })
                }
            };

            let opcode = self.table.lookup_mnemonic(mnemonic).ok_or_else(|| {
                AsmError::UnknownMnemonic {
                    mnemonic: mnemonic.clone(),
                    line,
                    col: token.col,
                }
            })?;

            let args = self.parse_args(opcode, token, &tokens[pos + 1..], line, &mut pending)?;
            instructions.push(Instruction::new(opcode, args));
        }

        // Pass 2: every referenced label must have been declared somewhere.
        for (label, line) in pending {
            if labels.index_of(label).is_none() {
                return Err(AsmError::UnresolvedLabel { label, line });
            }
        }

        Ok(Program {
            instructions,
            labels,
        })
    }

    fn parse_args(
        &self,
        opcode: &'static Opcode,
        mnemonic_token: &Token,
        operands: &[Token],
        line: usize,
        pending: &mut Vec<(u32, usize)>,
    ) -> Result<Vec<Arg>, AsmError> {
        let mismatch = |col: usize, message: String| AsmError::ArgMismatch {
            mnemonic: opcode.mnemonic.to_string(),
            line,
            col,
            message,
        };

        let mut args = Vec::with_capacity(opcode.params.len());
        let mut next = 0;

        for (param_idx, param) in opcode.params.iter().enumerate() {
            // The trailing list params swallow every remaining operand.
            if matches!(param, ParamType::SwitchData | ParamType::JumpData) {
                let start = next;
                let mut values = Vec::new();
                while let Some(token) = operands.get(next) {
                    values.push(self.int_operand(opcode, param, token, line, pending)?);
                    next += 1;
                }
                // The wire form prefixes the list with a single count byte.
                if values.len() > 0xFF {
                    return Err(mismatch(
                        operands[start + 0xFF].col,
                        format!("list takes at most 255 entries, found {}", values.len()),
                    ));
                }
                args.push(match param {
                    ParamType::SwitchData => {
                        Arg::SwitchData(values.iter().map(|&v| v as u16).collect())
                    }
                    _ => Arg::JumpData(values.iter().map(|&v| v as u8).collect()),
                });
                continue;
            }

            let Some(token) = operands.get(next) else {
                return Err(mismatch(
                    mnemonic_token.col,
                    format!(
                        "expected {} operands, found {}",
                        opcode.params.len(),
                        param_idx
                    ),
                ));
            };
            next += 1;

            let arg = match (param, &token.kind) {
                (ParamType::U8, TokenKind::Int(v)) if (0..=0xFF).contains(v) => Arg::U8(*v as u8),
                (ParamType::U16, TokenKind::Int(v)) if (0..=0xFFFF).contains(v) => {
                    Arg::U16(*v as u16)
                }
                (ParamType::U32, TokenKind::Int(v)) if (0..=0xFFFF_FFFF).contains(v) => {
                    Arg::U32(*v as u32)
                }
                (ParamType::I32, TokenKind::Int(v))
                    if (i32::MIN as i64..=i32::MAX as i64).contains(v) =>
                {
                    Arg::I32(*v as i32)
                }
                (ParamType::F32, TokenKind::Float(v)) => Arg::F32(*v),
                // Integer literals are accepted where a float is expected.
                (ParamType::F32, TokenKind::Int(v)) => Arg::F32(*v as f32),
                (ParamType::Register, TokenKind::Register(r)) => Arg::Register(*r),
                (ParamType::String, TokenKind::Str(s)) => {
                    // The NUL-terminated wire form carries one byte per char.
                    if s.chars().any(|c| c == '\0' || u32::from(c) > 0xFF) {
                        return Err(mismatch(
                            token.col,
                            "string holds characters the wire form cannot carry".to_string(),
                        ));
                    }
                    Arg::String(s.clone())
                }
                (ParamType::Label, _) => {
                    let label = self.int_operand(opcode, param, token, line, pending)?;
                    Arg::U16(label as u16)
                }
                (_, TokenKind::InvalidNumber) => {
                    return Err(AsmError::InvalidToken {
                        what: "number",
                        line,
                        col: token.col,
                    })
                }
                (_, TokenKind::InvalidSection) => {
                    return Err(AsmError::InvalidToken {
                        what: "section",
                        line,
                        col: token.col,
                    })
                }
                (param, kind) => {
                    return Err(mismatch(
                        token.col,
                        format!(
                            "operand {}: expected {}, found {}",
                            param_idx + 1,
                            param.name(),
                            kind.describe()
                        ),
                    ))
                }
            };
            args.push(arg);
        }

        if let Some(extra) = operands.get(next) {
            return Err(mismatch(
                extra.col,
                format!(
                    "expected {} operands, found {}",
                    opcode.params.len(),
                    operands.len()
                ),
            ));
        }

        Ok(args)
    }

    /// Parse one integer-valued operand (label reference or register-list
    /// entry), recording label references for pass 2.
    fn int_operand(
        &self,
        opcode: &'static Opcode,
        param: &ParamType,
        token: &Token,
        line: usize,
        pending: &mut Vec<(u32, usize)>,
    ) -> Result<i64, AsmError> {
        let range = match param {
            ParamType::JumpData => 0..=0xFF,
            _ => 0..=0xFFFF,
        };
        match &token.kind {
            TokenKind::Int(v) if range.contains(v) => {
                if matches!(param, ParamType::Label | ParamType::SwitchData) {
                    pending.push((*v as u32, line));
                }
                Ok(*v)
            }
            kind => Err(AsmError::ArgMismatch {
                mnemonic: opcode.mnemonic.to_string(),
                line,
                col: token.col,
                message: format!("expected {}, found {}", param.name(), kind.describe()),
            }),
        }
    }
}
