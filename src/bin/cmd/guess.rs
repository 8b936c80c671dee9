// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Guess command - find the types that decode an input.

use clap::Args;

use crate::common::{output_json_or, read_input, Result, SchemaArgs};

/// List every full type that decodes the input completely.
#[derive(Args, Clone, Debug)]
pub struct GuessCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Base64 text or a file of raw bytes; base64 from stdin if omitted
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

impl GuessCmd {
    pub fn run(self) -> Result<()> {
        let toolkit = self.schema.open()?;
        let data = read_input(self.input.as_deref())?;
        let matches = toolkit.guess(&data);
        if matches.is_empty() && !self.json {
            anyhow::bail!("no type decodes the {} byte input", data.len());
        }
        output_json_or(self.json, &matches, || {
            for name in &matches {
                println!("{name}");
            }
        })
    }
}
