// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - print the JSON Schema of a type's projection.

use clap::Args;

use crate::common::{print_json, Result, SchemaArgs};

/// Print the JSON Schema (Draft 7) of a full type.
#[derive(Args, Clone, Debug)]
pub struct SchemaCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Type to describe
    #[arg(value_name = "TYPE")]
    type_name: String,

    /// Print on one line
    #[arg(long)]
    compact: bool,
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        let toolkit = self.schema.open()?;
        print_json(&toolkit.schema(&self.type_name)?, self.compact)
    }
}
