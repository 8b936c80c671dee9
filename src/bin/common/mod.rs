// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use xdrcodec::encoding::decode_base64;
use xdrcodec::schema::{load_schema_file, LoadOptions};
use xdrcodec::{GeneratorConfig, XdrToolkit};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Schema and configuration shared by every toolkit command.
#[derive(Args, Clone, Debug)]
pub struct SchemaArgs {
    /// Schema document (.json or .toml)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Generator configuration (.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail on duplicate type definitions
    #[arg(long)]
    pub strict: bool,
}

impl SchemaArgs {
    /// Build the toolkit, printing load and synthesis diagnostics to stderr.
    pub fn open(&self) -> Result<XdrToolkit> {
        let loaded = load_schema_file(
            &self.schema,
            LoadOptions {
                strict: self.strict,
            },
        )?;
        let config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        let toolkit = XdrToolkit::from_schema(loaded, &config)?;
        for diagnostic in toolkit.diagnostics() {
            eprintln!("warning: {diagnostic}");
        }
        Ok(toolkit)
    }
}

/// Read binary input.
///
/// An existing file is read as raw XDR bytes. Any other argument is base64
/// text; without an argument, base64 text is read from stdin.
pub fn read_input(input: Option<&str>) -> Result<Vec<u8>> {
    match input {
        Some(arg) if Path::new(arg).is_file() => Ok(std::fs::read(arg)?),
        Some(arg) => Ok(decode_base64(arg)?),
        None => Ok(decode_base64(&read_stdin()?)?),
    }
}

/// Read text input: a file's contents, the argument itself, or stdin.
pub fn read_text(input: Option<&str>) -> Result<String> {
    match input {
        Some(arg) if Path::new(arg).is_file() => Ok(std::fs::read_to_string(arg)?),
        Some(arg) => Ok(arg.to_string()),
        None => read_stdin(),
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Print `value` as JSON, pretty unless `compact`.
pub fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Print `value` as JSON or run the human-readable printer.
pub fn output_json_or<T>(json: bool, value: &T, human_fn: impl FnOnce()) -> Result<()>
where
    T: Serialize,
{
    if json {
        print_json(value, false)?;
    } else {
        human_fn();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_base64_argument() {
        assert_eq!(read_input(Some("AAAABw==")).unwrap(), vec![0, 0, 0, 7]);
        assert!(read_input(Some("not base64!")).is_err());
    }

    #[test]
    fn test_read_text_argument() {
        assert_eq!(read_text(Some("{\"a\":1}")).unwrap(), "{\"a\":1}");
    }
}
