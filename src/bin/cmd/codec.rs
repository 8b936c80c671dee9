// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode and encode commands.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use crate::common::{print_json, read_input, read_text, Result, SchemaArgs};

/// Decode input as a type and print its JSON projection.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Type to decode as
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    type_name: String,

    /// Base64 text or a file of raw bytes; base64 from stdin if omitted
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Print on one line
    #[arg(long)]
    compact: bool,
}

impl DecodeCmd {
    pub fn run(self) -> Result<()> {
        let toolkit = self.schema.open()?;
        let data = read_input(self.input.as_deref())?;
        let value = toolkit.decode_bytes(&self.type_name, &data)?;
        print_json(&value, self.compact)
    }
}

/// Encode a JSON value as a type.
#[derive(Args, Clone, Debug)]
pub struct EncodeCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Type to encode as
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    type_name: String,

    /// JSON text or a JSON file; read from stdin if omitted
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Write raw bytes to a file instead of printing base64
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl EncodeCmd {
    pub fn run(self) -> Result<()> {
        let toolkit = self.schema.open()?;
        let text = read_text(self.input.as_deref())?;
        let json: serde_json::Value =
            serde_json::from_str(&text).context("input is not valid JSON")?;
        match self.output {
            Some(path) => {
                let data = toolkit.encode_bytes(&self.type_name, &json)?;
                std::fs::write(&path, &data)
                    .with_context(|| format!("write {}", path.display()))?;
                eprintln!("Wrote {} bytes to {}", data.len(), path.display());
            }
            None => println!("{}", toolkit.encode(&self.type_name, &json)?),
        }
        Ok(())
    }
}
