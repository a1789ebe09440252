//! Renders an instruction list back to assembly text.
//!
//! The pass threads one virtual stack of args through the whole program: in
//! automatic mode, `push_stack` instructions disappear into the stack and
//! their values resurface as trailing operands of the consuming
//! instruction. Manual-stack mode suppresses the simulation entirely so the
//! implicit-stack convention stays visible.

use crate::asm::assembler::LabelIndex;
use crate::asm::instruction::{Arg, Instruction};

pub struct Disassembler {
    manual_stack: bool,
}

impl Disassembler {
    pub fn new() -> Self {
        Self {
            manual_stack: false,
        }
    }

    /// Print `push_stack` instructions literally instead of simulating the
    /// virtual stack.
    pub fn with_manual_stack(mut self, manual_stack: bool) -> Self {
        self.manual_stack = manual_stack;
        self
    }

    pub fn disassemble(&self, instructions: &[Instruction], labels: &LabelIndex) -> String {
        let mut output = String::new();
        let mut stack: Vec<Arg> = Vec::new();

        for (index, instruction) in instructions.iter().enumerate() {
            if !self.manual_stack && instruction.opcode.push_stack {
                stack.extend(instruction.args.iter().cloned());
                continue;
            }

            if let Some(label) = labels.label_at(index) {
                output.push_str(&format!("{}:\n", label));
            }

            let mut operands: Vec<String> = Vec::new();
            for arg in &instruction.args {
                push_arg_text(&mut operands, arg);
            }
            if !self.manual_stack {
                for _ in instruction.opcode.stack_params.iter().rev() {
                    // A short stack is rendered best-effort: the remaining
                    // stack operands are simply omitted.
                    match stack.pop() {
                        Some(arg) => push_arg_text(&mut operands, &arg),
                        None => break,
                    }
                }
            }

            if operands.is_empty() {
                output.push_str(&format!("    {}\n", instruction.opcode.mnemonic));
            } else {
                output.push_str(&format!(
                    "    {} {}\n",
                    instruction.opcode.mnemonic,
                    operands.join(", ")
                ));
            }
        }

        // A label declared after the last instruction binds one past the
        // end of the list.
        if let Some(label) = labels.label_at(instructions.len()) {
            output.push_str(&format!("{}:\n", label));
        }

        output
    }
}

impl Default for Disassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the text form of one arg. `SwitchData` and `JumpData` expand in
/// place into multiple operand strings.
fn push_arg_text(operands: &mut Vec<String>, arg: &Arg) {
    match arg {
        Arg::U8(v) => operands.push(v.to_string()),
        Arg::U16(v) => operands.push(v.to_string()),
        Arg::U32(v) => operands.push(v.to_string()),
        Arg::I32(v) => operands.push(v.to_string()),
        Arg::F32(v) => operands.push(v.to_string()),
        Arg::Register(r) => operands.push(format!("r{}", r)),
        Arg::String(s) => operands.push(quote(s)),
        Arg::SwitchData(labels) => operands.extend(labels.iter().map(|l| l.to_string())),
        Arg::JumpData(registers) => operands.extend(registers.iter().map(|r| r.to_string())),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assembler::Assembler;
    use crate::asm::opcode::OpcodeTable;

    fn disassemble(source: &str, manual_stack: bool) -> String {
        let table = OpcodeTable::new();
        let program = Assembler::new(&table).assemble(source).unwrap();
        Disassembler::new()
            .with_manual_stack(manual_stack)
            .disassemble(&program.instructions, &program.labels)
    }

    #[test]
    fn test_plain_instructions() {
        let text = disassemble("leti r6, -40\nsync\nret", false);
        assert_eq!(text, "    leti r6, -40\n    sync\n    ret\n");
    }

    #[test]
    fn test_label_lines() {
        let text = disassemble("0:\nleti r1, 3\n150:\njmp 0", false);
        assert_eq!(text, "0:\n    leti r1, 3\n150:\n    jmp 0\n");
    }

    #[test]
    fn test_trailing_label_is_emitted() {
        let text = disassemble("9:\nret\n10:", false);
        assert_eq!(text, "9:\n    ret\n10:\n");
    }

    #[test]
    fn test_stack_simulation() {
        let source = "arg_pushl 7\narg_pushs \"cave\"\nmessage";
        let text = disassemble(source, false);
        // The pushing instructions emit nothing; their values come back as
        // trailing operands, popped for the rightmost stack param first.
        assert_eq!(text, "    message \"cave\", 7\n");
    }

    #[test]
    fn test_manual_stack_mode_is_literal() {
        let source = "arg_pushl 7\narg_pushs \"cave\"\nmessage";
        let text = disassemble(source, true);
        assert_eq!(
            text,
            "    arg_pushl 7\n    arg_pushs \"cave\"\n    message\n"
        );
    }

    #[test]
    fn test_modes_agree_without_push_opcodes() {
        let source = "0:\nleti r1, 3\nfleti r2, -0.5\njmp 0";
        assert_eq!(disassemble(source, false), disassemble(source, true));
    }

    #[test]
    fn test_stack_underflow_truncates_operands() {
        // bgm wants one stack value but nothing was pushed.
        let text = disassemble("bgm", false);
        assert_eq!(text, "    bgm\n");

        // message wants two but only one was pushed; the missing one is
        // omitted rather than failing the pass.
        let text = disassemble("arg_pushs \"cave\"\nmessage", false);
        assert_eq!(text, "    message \"cave\"\n");
    }

    #[test]
    fn test_stack_survives_across_instructions() {
        let source = "arg_pushl 1\nnop\narg_pushl 2\nse\nbgm";
        let text = disassemble(source, false);
        assert_eq!(text, "    nop\n    se 2\n    bgm 1\n");
    }

    #[test]
    fn test_switch_data_expands_in_place() {
        let source = "1:\nret\n2:\nret\nswitch_jmp r3, 1, 2";
        let text = disassemble(source, false);
        assert!(text.ends_with("    switch_jmp r3, 1, 2\n"));
    }

    #[test]
    fn test_string_escapes() {
        let text = disassemble(r#"arg_pushs "a\"b\\c""#, true);
        assert_eq!(text, "    arg_pushs \"a\\\"b\\\\c\"\n");
    }
}
