//! `jsonv` — a small file-to-file CLI around the library's one-shot
//! façades (`spec.md` §2 "convenience façades", expanded in
//! `SPEC_FULL.md` §6). Grounded in the teacher's own `tealeaf` binary
//! (`src/main.rs`), rebuilt on `clap` instead of hand-rolled
//! `env::args()` matching.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use jsonvalue::{binarize, parse, stringify, unbinarize, LogicalType, Value};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// The chunk size input files are fed to the incremental parsers in,
/// chosen purely to exercise the bounded-chunk contract rather than
/// reading the whole file in one `write()` call.
const CHUNK_SIZE: usize = 4096;

#[derive(Parser)]
#[command(name = "jsonv", version, about = "Parse, stringify, and binarize JSON values")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate textual JSON and report its top-level type.
    Parse {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse textual JSON and re-emit it in canonical (key-sorted,
    /// compact) form.
    Stringify {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert textual JSON into the binary TLV encoding.
    Binarize {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert binary TLV back into textual JSON.
    Unbinarize {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Auto-detect a file's encoding and report its top-level type and
    /// size.
    Info { input: PathBuf },
    /// Print a shell completion script to stdout.
    Completions { shell: Shell },
}

fn read_chunks(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn parse_text_incremental(bytes: &[u8]) -> Result<Value, jsonvalue::ParseError> {
    let mut p = jsonvalue::TextParser::new();
    for chunk in bytes.chunks(CHUNK_SIZE) {
        p.write(chunk);
    }
    p.write(&[]);
    if let Some(e) = p.error() {
        return Err(e.clone());
    }
    Ok(p.into_result())
}

fn write_output(output: Option<&PathBuf>, text: &str) -> std::io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, text),
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    match bytes.first() {
        None => false,
        Some(b) => !matches!(
            b,
            b'{' | b'[' | b'"' | b't' | b'f' | b'n' | b'0'..=b'9' | b'+' | b'-' | b' ' | b'\t' | b'\r' | b'\n'
        ),
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Parse { input, output } => {
            let bytes = read_chunks(&input).map_err(|e| e.to_string())?;
            let value = parse_text_incremental(&bytes).map_err(|e| e.to_string())?;
            let report = format!("ok: {}", value.logical_type());
            write_output(output.as_ref(), &report).map_err(|e| e.to_string())?;
        }
        Command::Stringify { input, output } => {
            let bytes = read_chunks(&input).map_err(|e| e.to_string())?;
            let value = parse_text_incremental(&bytes).map_err(|e| e.to_string())?;
            write_output(output.as_ref(), &stringify(&value)).map_err(|e| e.to_string())?;
        }
        Command::Binarize { input, output } => {
            let bytes = read_chunks(&input).map_err(|e| e.to_string())?;
            let value = parse_text_incremental(&bytes).map_err(|e| e.to_string())?;
            std::fs::write(&output, binarize(&value)).map_err(|e| e.to_string())?;
        }
        Command::Unbinarize { input, output } => {
            let bytes = read_chunks(&input).map_err(|e| e.to_string())?;
            let value = unbinarize(&bytes).map_err(|e| e.to_string())?;
            write_output(output.as_ref(), &stringify(&value)).map_err(|e| e.to_string())?;
        }
        Command::Info { input } => {
            let bytes = read_chunks(&input).map_err(|e| e.to_string())?;
            let size = bytes.len();
            let (format, value) = if looks_binary(&bytes) {
                ("binary", unbinarize(&bytes).map_err(|e| e.to_string())?)
            } else {
                ("text", parse_text_incremental(&bytes).map_err(|e| e.to_string())?)
            };
            println!("File: {}", input.display());
            println!("Size: {size} bytes");
            println!("Format: {format}");
            println!("Type: {}", value.logical_type());
            match value.logical_type() {
                LogicalType::Array => println!("Length: {}", value.array_len()),
                LogicalType::Object => println!("Keys: {}", value.keys().len()),
                _ => {}
            }
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
