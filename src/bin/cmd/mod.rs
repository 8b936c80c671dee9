// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod codec;
mod dedup;
mod guess;
mod schema;
mod sparse;
mod types;

pub use codec::{DecodeCmd, EncodeCmd};
pub use dedup::DedupCmd;
pub use guess::GuessCmd;
pub use schema::SchemaCmd;
pub use sparse::SparseCmd;
pub use types::TypesCmd;
