use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "satchel",
    about = "Local snapshot package store: pack a directory tree, deduplicate against history, restore any snapshot",
    version,
)]
pub struct Cli {
    /// Root directory to operate on
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// List the manifests of all snapshots instead of creating one
    #[arg(short, long, conflicts_with = "unpack")]
    pub inspect: bool,

    /// Restore the given snapshot into the root directory
    #[arg(long, value_name = "SNAPSHOT_ID")]
    pub unpack: Option<String>,

    /// During --unpack, keep files that are not part of the snapshot
    /// (default is full replacement)
    #[arg(long, requires = "unpack")]
    pub merge: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
