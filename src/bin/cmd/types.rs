// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Types command - list registered full or sparse types.

use clap::Args;
use serde::Serialize;
use xdrcodec::encoding::{Capabilities, TypeKind};

use crate::common::{output_json_or, Result, SchemaArgs};

/// List registered types.
#[derive(Args, Clone, Debug)]
pub struct TypesCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// List sparse types instead of full types
    #[arg(long)]
    sparse: bool,

    /// Show capabilities, indirected members and sparse plans
    #[arg(long)]
    detail: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct TypeInfo {
    name: String,
    kind: TypeKind,
    capabilities: Capabilities,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    indirect: Vec<String>,
}

impl TypesCmd {
    pub fn run(self) -> Result<()> {
        let toolkit = self.schema.open()?;
        let registry = toolkit.registry();
        let names = if self.sparse {
            toolkit.sparse_types()
        } else {
            toolkit.types()
        };

        let infos: Vec<TypeInfo> = names
            .iter()
            .filter_map(|name| registry.entry(name))
            .map(|entry| TypeInfo {
                name: entry.name.clone(),
                kind: entry.kind,
                capabilities: entry.capabilities,
                indirect: registry.graph().requires_indirection(&entry.name),
            })
            .collect();

        output_json_or(self.json, &infos, || {
            if !self.detail {
                for info in &infos {
                    println!("{}", info.name);
                }
                return;
            }
            if self.sparse {
                for plan in registry.plans() {
                    println!("{plan}");
                }
                return;
            }
            for info in &infos {
                println!("{} [{}]", info.name, info.capabilities);
                if !info.indirect.is_empty() {
                    println!("  indirect: {}", info.indirect.join(", "));
                }
            }
        })
    }
}
