use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jdelta",
    about = "Structural diff, patch, and revert for JSON documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Fail when a change addresses an element the target does not have
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the changeset between two documents
    Diff(DiffArgs),
    /// Apply a changeset to a document
    Apply(PatchArgs),
    /// Undo a changeset on a document
    Revert(PatchArgs),
    /// Convert a changeset to path-addressed entries
    Flatten(FlattenArgs),
    /// Convert path-addressed entries back to a changeset
    Unflatten(UnflattenArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// TOML file mapping array key paths to identity fields
    #[arg(short, long)]
    pub rules: Option<PathBuf>,
    /// Emit flat entries instead of the nested changeset
    #[arg(long)]
    pub flat: bool,
}

#[derive(Args)]
pub struct PatchArgs {
    pub target: PathBuf,
    pub changeset: PathBuf,
    /// The changeset file holds flat entries
    #[arg(long)]
    pub flat: bool,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct FlattenArgs {
    pub changeset: PathBuf,
    #[arg(long, default_value = "$")]
    pub base: String,
}

#[derive(Args)]
pub struct UnflattenArgs {
    pub entries: PathBuf,
}
