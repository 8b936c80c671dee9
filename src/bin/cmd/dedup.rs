// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dedup command - compare two versions of a schema.

use std::path::PathBuf;

use clap::Args;
use xdrcodec::deduplicate;
use xdrcodec::schema::{load_schema_file, LoadOptions};

use crate::common::{output_json_or, Result};

/// Decide which types of NEXT can be re-exported from CURR.
#[derive(Args, Clone, Debug)]
pub struct DedupCmd {
    /// Current schema version
    #[arg(value_name = "CURR")]
    curr: PathBuf,

    /// Next schema version
    #[arg(value_name = "NEXT")]
    next: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

impl DedupCmd {
    pub fn run(self) -> Result<()> {
        let curr = load_schema_file(&self.curr, LoadOptions::default())?;
        let next = load_schema_file(&self.next, LoadOptions::default())?;
        for diagnostic in curr.diagnostics.iter().chain(&next.diagnostics) {
            eprintln!("warning: {diagnostic}");
        }
        let result = deduplicate(&curr.graph, &next.graph);
        output_json_or(self.json, &result, || print!("{result}"))
    }
}
