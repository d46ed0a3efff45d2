use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use jdelta_sdk::{
    Change, ChangeKind, Changeset, Delta, FlatChange, IdentityRules, PatchConfig, Value,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::*;
use crate::config::RulesFile;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = if cli.strict {
        PatchConfig::strict()
    } else {
        PatchConfig::default()
    };
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &cli.format),
        Command::Apply(args) => cmd_apply(args, &Delta::new().with_config(config)),
        Command::Revert(args) => cmd_revert(args, &Delta::new().with_config(config)),
        Command::Flatten(args) => cmd_flatten(args, &cli.format),
        Command::Unflatten(args) => cmd_unflatten(args, &cli.format),
    }
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let old: Value = read_json(&args.old)?;
    let new: Value = read_json(&args.new)?;
    let rules = match &args.rules {
        Some(path) => RulesFile::load(path)?.into_rules()?,
        None => IdentityRules::new(),
    };
    let changes = Delta::new().with_rules(rules).diff(&old, &new);
    match format {
        OutputFormat::Json if args.flat => print_json(&jdelta_sdk::flatten(&changes)),
        OutputFormat::Json => print_json(&changes),
        OutputFormat::Text => {
            print_entries(&jdelta_sdk::flatten(&changes));
            Ok(())
        }
    }
}

fn cmd_apply(args: PatchArgs, delta: &Delta) -> anyhow::Result<()> {
    let (mut target, changes) = load_patch_inputs(&args)?;
    delta
        .apply(&mut target, &changes)
        .with_context(|| format!("failed to apply {}", args.changeset.display()))?;
    write_document(&target, args.output.as_deref(), "Applied", count_leaves(&changes))
}

fn cmd_revert(args: PatchArgs, delta: &Delta) -> anyhow::Result<()> {
    let (mut target, changes) = load_patch_inputs(&args)?;
    delta
        .revert(&mut target, &changes)
        .with_context(|| format!("failed to revert {}", args.changeset.display()))?;
    write_document(&target, args.output.as_deref(), "Reverted", count_leaves(&changes))
}

fn cmd_flatten(args: FlattenArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let changes = load_changeset(&args.changeset, false)?;
    let entries = jdelta_sdk::flatten_from(&changes, &args.base);
    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            print_entries(&entries);
            Ok(())
        }
    }
}

fn cmd_unflatten(args: UnflattenArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let changes = load_changeset(&args.entries, true)?;
    match format {
        OutputFormat::Json => print_json(&changes),
        OutputFormat::Text => {
            for change in &changes {
                print_tree(change, 0);
            }
            Ok(())
        }
    }
}

// ---- Input ----

/// A file holding either a single item or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Load a changeset, from flat entries when `flat` is set, and check the
/// shape of every node.
fn load_changeset(path: &Path, flat: bool) -> anyhow::Result<Changeset> {
    let changes = if flat {
        let entries = read_json::<OneOrMany<FlatChange>>(path)?.into_vec();
        debug!(entries = entries.len(), path = %path.display(), "loaded flat entries");
        jdelta_sdk::unflatten(&entries)
            .with_context(|| format!("invalid flat entries in {}", path.display()))?
    } else {
        read_json::<OneOrMany<Change>>(path)?.into_vec()
    };
    jdelta_sdk::validate(&changes)
        .with_context(|| format!("malformed changeset in {}", path.display()))?;
    Ok(changes)
}

fn load_patch_inputs(args: &PatchArgs) -> anyhow::Result<(Value, Changeset)> {
    let target = read_json(&args.target)?;
    let changes = load_changeset(&args.changeset, args.flat)?;
    Ok((target, changes))
}

// ---- Output ----

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_document(
    value: &Value,
    output: Option<&Path>,
    verb: &str,
    leaves: usize,
) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, text + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} {} {} change(s) → {}",
                "✓".green().bold(),
                verb,
                leaves,
                path.display().to_string().bold()
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn print_entries(entries: &[FlatChange]) {
    if entries.is_empty() {
        println!("No changes.");
        return;
    }
    for entry in entries {
        let key = entry.key.dimmed();
        let value = entry.value.as_ref().map(ToString::to_string).unwrap_or_default();
        match entry.kind {
            ChangeKind::Add => println!("{} {} {} {}", "+".green().bold(), entry.path, key, value.green()),
            ChangeKind::Remove => println!("{} {} {} {}", "-".red().bold(), entry.path, key, value.red()),
            ChangeKind::Update => {
                let old = entry.old_value.as_ref().map(ToString::to_string).unwrap_or_default();
                println!("{} {} {} {} → {}", "~".yellow().bold(), entry.path, key, old.red(), value.green());
            }
        }
    }
    let (added, removed, updated) = summarize(entries);
    println!(
        "\n{} added, {} removed, {} updated",
        added.to_string().green(),
        removed.to_string().red(),
        updated.to_string().yellow()
    );
}

fn print_tree(change: &Change, depth: usize) {
    let indent = "  ".repeat(depth);
    if change.is_branch() {
        let embedded = change
            .embedded_key
            .as_ref()
            .map(|key| format!(" [{key}]"))
            .unwrap_or_default();
        println!("{indent}{}{}", change.key.bold(), embedded.cyan());
        for child in change.children() {
            print_tree(child, depth + 1);
        }
        return;
    }
    let value = change.value.as_ref().map(ToString::to_string).unwrap_or_default();
    println!("{indent}{} {} {}", change.kind.to_string().yellow(), change.key, value);
}

/// Counts of added, removed, and updated entries.
fn summarize(entries: &[FlatChange]) -> (usize, usize, usize) {
    entries.iter().fold((0, 0, 0), |(a, r, u), entry| match entry.kind {
        ChangeKind::Add => (a + 1, r, u),
        ChangeKind::Remove => (a, r + 1, u),
        ChangeKind::Update => (a, r, u + 1),
    })
}

fn count_leaves(changes: &[Change]) -> usize {
    changes
        .iter()
        .map(|change| {
            if change.is_branch() {
                count_leaves(change.children())
            } else {
                1
            }
        })
        .sum()
}
