// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # xdrcodec CLI
//!
//! Command-line front end for schema-driven XDR work.
//!
//! ## Usage
//!
//! ```sh
//! # List full types, or sparse types with their plans
//! xdrcodec types --schema schema.json
//! xdrcodec types --schema schema.json --config generator.toml --sparse --detail
//!
//! # JSON Schema of a type
//! xdrcodec schema --schema schema.json TransactionEnvelope
//!
//! # Which types decode this input?
//! xdrcodec guess --schema schema.json AAAAAgAAAAA=
//!
//! # Decode, encode, sparse decode
//! xdrcodec decode --schema schema.json --type Memo AAAAAA==
//! xdrcodec encode --schema schema.json --type Memo '"MEMO_NONE"'
//! xdrcodec sparse --schema schema.json --config generator.toml TxSource tx.xdr
//!
//! # Compare two schema versions
//! xdrcodec dedup curr.json next.json
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{DecodeCmd, DedupCmd, EncodeCmd, GuessCmd, SchemaCmd, SparseCmd, TypesCmd};
use common::Result;

/// xdrcodec - XDR codec toolkit
///
/// Decode, encode and inspect XDR values against a type graph, with
/// decode-only sparse types and cross-version comparison.
#[derive(Parser, Clone)]
#[command(name = "xdrcodec")]
#[command(about = "Schema-driven XDR codec toolkit", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// List full or sparse types
    Types(TypesCmd),

    /// Print the JSON Schema of a type
    Schema(SchemaCmd),

    /// List every type that decodes the input completely
    Guess(GuessCmd),

    /// Decode input as a type and print it as JSON
    Decode(DecodeCmd),

    /// Encode JSON as a type and print it as base64
    Encode(EncodeCmd),

    /// Decode input with a configured sparse type
    Sparse(SparseCmd),

    /// Compare two schema versions
    Dedup(DedupCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Types(cmd) => cmd.run(),
        Commands::Schema(cmd) => cmd.run(),
        Commands::Guess(cmd) => cmd.run(),
        Commands::Decode(cmd) => cmd.run(),
        Commands::Encode(cmd) => cmd.run(),
        Commands::Sparse(cmd) => cmd.run(),
        Commands::Dedup(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
