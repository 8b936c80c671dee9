// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sparse command - decode with a configured sparse type.

use clap::Args;

use crate::common::{print_json, read_input, Result, SchemaArgs};

/// Decode input with a sparse type from the generator configuration.
#[derive(Args, Clone, Debug)]
pub struct SparseCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Sparse type name
    #[arg(value_name = "NAME")]
    name: String,

    /// Base64 text or a file of raw bytes; base64 from stdin if omitted
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Print the plan instead of decoding
    #[arg(long)]
    plan: bool,

    /// Print on one line
    #[arg(long)]
    compact: bool,
}

impl SparseCmd {
    pub fn run(self) -> Result<()> {
        let toolkit = self.schema.open()?;
        let plan = toolkit.plan(&self.name)?;
        if self.plan {
            print!("{plan}");
            return Ok(());
        }
        let data = read_input(self.input.as_deref())?;
        print_json(&toolkit.decode_bytes(&self.name, &data)?, self.compact)
    }
}
