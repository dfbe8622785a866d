use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use satchel_dedup::DedupResolver;
use satchel_manifest::ManifestBuilder;
use satchel_pack::DirSource;
use satchel_restore::{RestoreEngine, RestoreMode, RestoreReport};
use satchel_store::SnapshotStore;
use satchel_types::{ManifestEntry, SnapshotId};

use crate::cli::{Cli, OutputFormat};
use crate::scan;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.inspect {
        cmd_inspect(&cli.dir, &cli.format)
    } else if let Some(id) = &cli.unpack {
        cmd_unpack(&cli.dir, id, cli.merge, &cli.format)
    } else {
        cmd_pack(&cli.dir, &cli.format)
    }
}

/// Outcome of a pack run.
pub struct PackOutcome {
    pub id: SnapshotId,
    pub created: bool,
    pub files: usize,
}

/// Scan, canonicalize, dedup against history, and persist a new package.
pub fn pack(dir: &Path) -> anyhow::Result<PackOutcome> {
    let records = scan::scan(dir)?;
    let manifest = ManifestBuilder::build(records)?;
    let store = SnapshotStore::open(dir)?;
    let entries = DedupResolver::resolve_against_store(&store, manifest.records, &manifest.id)?;
    let created = store.create(&manifest.id, &entries, &DirSource::new(dir))?;
    Ok(PackOutcome {
        id: manifest.id,
        created,
        files: entries.len(),
    })
}

/// Every package's manifest, ascending by snapshot id.
pub fn inspect(dir: &Path) -> anyhow::Result<Vec<(SnapshotId, Vec<ManifestEntry>)>> {
    let store = SnapshotStore::open(dir)?;
    Ok(store.load_all_manifests(&HashSet::new())?)
}

/// Restore a snapshot into the root directory.
pub fn unpack(dir: &Path, id: &str, merge: bool) -> anyhow::Result<(SnapshotId, RestoreReport)> {
    let id = SnapshotId::from_hex(id).context("invalid snapshot id")?;
    let store = SnapshotStore::open(dir)?;
    let mode = if merge {
        RestoreMode::Merge
    } else {
        RestoreMode::Clean
    };
    let report = RestoreEngine::restore(&store, &id, dir, mode)?;
    Ok((id, report))
}

fn cmd_pack(dir: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let outcome = pack(dir)?;
    match format {
        OutputFormat::Text => {
            if outcome.created {
                println!("📦 {}", outcome.id);
            } else {
                println!("📦 {} {}", outcome.id, "(unchanged)".dimmed());
            }
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "snapshot": outcome.id,
                "created": outcome.created,
                "files": outcome.files,
            })
        ),
    }
    Ok(())
}

fn cmd_inspect(dir: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let manifests = inspect(dir)?;
    match format {
        OutputFormat::Text => {
            for (_, entries) in &manifests {
                for entry in entries {
                    println!(
                        "{}\t{}\t{}\t{}",
                        entry.path, entry.digest, entry.size, entry.owner
                    );
                }
            }
        }
        OutputFormat::Json => {
            let packages: Vec<serde_json::Value> = manifests
                .iter()
                .map(|(id, entries)| {
                    serde_json::json!({ "snapshot": id, "entries": entries })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&packages)?);
        }
    }
    Ok(())
}

fn cmd_unpack(dir: &Path, id: &str, merge: bool, format: &OutputFormat) -> anyhow::Result<()> {
    let (id, report) = unpack(dir, id, merge)?;
    match format {
        OutputFormat::Text => println!(
            "{} restored {} ({} files, {} bytes, {} removed)",
            "✓".green().bold(),
            id.short_hex().yellow(),
            report.files_written,
            report.bytes_written,
            report.files_removed
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "snapshot": id,
                "files_written": report.files_written,
                "bytes_written": report.bytes_written,
                "files_removed": report.files_removed,
            })
        ),
    }
    Ok(())
}
