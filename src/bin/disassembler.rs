//! Standalone disassembler for quest script bytecode.
//!
//! Decodes a raw instruction stream and renders it as assembly text. The
//! stream carries no label table (that lives in the quest container, which
//! is out of scope here), so no label lines are emitted.

use anyhow::{Context, Result};
use clap::Parser;
use questscript::{decode_program, Buffer, Disassembler, Endianness, LabelIndex, OpcodeTable};
use std::fs;
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "qs-dasm")]
#[command(about = "Quest script disassembler")]
struct Args {
    /// Input file (use - for stdin)
    #[arg(default_value = "-")]
    input: String,

    /// Print push instructions literally instead of simulating the stack
    #[arg(long)]
    manual_stack: bool,

    /// Input is hex text instead of binary
    #[arg(long)]
    hex: bool,

    /// Decode big-endian instead of little-endian
    #[arg(long)]
    big_endian: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut bytes = if args.input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&args.input).context("Failed to read input")?
    };

    if args.hex {
        let text = String::from_utf8(bytes).context("Hex input is not valid text")?;
        bytes = hex::decode(text.trim()).context("Invalid hex input")?;
    }

    let endianness = if args.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };

    let table = OpcodeTable::new();
    let buffer = Buffer::from_bytes(bytes);
    let instructions =
        decode_program(&buffer, endianness, &table).context("Decoding failed")?;

    eprintln!("Decoded {} instructions", instructions.len());

    let disasm = Disassembler::new().with_manual_stack(args.manual_stack);
    print!("{}", disasm.disassemble(&instructions, &LabelIndex::new()));

    Ok(())
}
