//! Standalone assembler for quest script.
//!
//! Converts text assembly to binary bytecode.

use anyhow::{Context, Result};
use clap::Parser;
use questscript::{encode_program, Assembler, Disassembler, Endianness, OpcodeTable};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qs-asm")]
#[command(about = "Quest script assembler")]
struct Args {
    /// Input file (use - for stdin)
    #[arg(default_value = "-")]
    input: String,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show disassembly
    #[arg(short, long)]
    disasm: bool,

    /// Print push instructions literally in the disassembly
    #[arg(long)]
    manual_stack: bool,

    /// Output as hex instead of binary
    #[arg(long)]
    hex: bool,

    /// Print the instruction listing as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Encode big-endian instead of little-endian
    #[arg(long)]
    big_endian: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Read input
    let source = if args.input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input).context("Failed to read input")?
    };

    // Assemble
    let table = OpcodeTable::new();
    let program = Assembler::new(&table)
        .assemble(&source)
        .context("Assembly failed")?;

    let endianness = if args.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };
    let buffer = encode_program(&program.instructions, endianness)?;

    eprintln!(
        "Assembled {} instructions ({} bytes, {} labels)",
        program.instructions.len(),
        buffer.len(),
        program.labels.len()
    );

    // Show disassembly if requested
    if args.disasm {
        let disasm = Disassembler::new().with_manual_stack(args.manual_stack);
        eprintln!("\nDisassembly:");
        eprintln!(
            "{}",
            disasm.disassemble(&program.instructions, &program.labels)
        );
    }

    if args.json {
        let listing: Vec<serde_json::Value> = program
            .instructions
            .iter()
            .enumerate()
            .map(|(index, instruction)| {
                serde_json::json!({
                    "index": index,
                    "label": program.labels.label_at(index),
                    "mnemonic": instruction.opcode.mnemonic,
                    "args": instruction.args,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    // Output
    let bytes = buffer.into_bytes();

    if let Some(output) = args.output {
        if args.hex {
            fs::write(&output, hex::encode(&bytes))?;
        } else {
            fs::write(&output, &bytes)?;
        }
        eprintln!("Wrote {} bytes to {}", bytes.len(), output.display());
    } else if args.hex {
        println!("{}", hex::encode(&bytes));
    } else {
        io::stdout().write_all(&bytes)?;
    }

    Ok(())
}
