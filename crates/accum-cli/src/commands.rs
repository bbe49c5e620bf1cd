use std::path::Path;

use accum_merge::{merge, MergeInput, MergeReport};
use accum_query::{get_sum, render, render_messages, resolve, select, split_action, summary_line};
use accum_store::Store;
use accum_types::{Artifact, PathKey};
use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Print(args) => cmd_print(args, &config, json),
        Command::Get(args) => cmd_get(args, &config, json),
        Command::Sum(args) => cmd_sum(args, &config, json),
        Command::Size(args) => cmd_size(args, &config, json),
        Command::Merge(args) => cmd_merge(args, &config, json),
        Command::Prune(args) => cmd_prune(args, &config),
        Command::Attach(args) => cmd_attach(args, &config),
    }
}

fn load(path: &Path, config: &CliConfig) -> anyhow::Result<Store> {
    let mut store =
        Store::load(path).with_context(|| format!("loading snapshot {}", path.display()))?;
    if config.show_empty_objects {
        store.set_show_empty_objects(true);
    }
    Ok(store)
}

fn save(store: &Store, path: &Path) -> anyhow::Result<()> {
    store
        .save(path)
        .with_context(|| format!("writing snapshot {}", path.display()))
}

fn print_artifact(artifact: &Artifact, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(artifact)?);
    } else {
        println!("{}", summary_line(artifact));
    }
    Ok(())
}

fn cmd_print(args: PrintArgs, config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let store = load(&args.snapshot, config)?;
    let pattern = args.pattern.unwrap_or_default();
    if !json {
        print!("{}", render(&store, &pattern)?);
        return Ok(());
    }

    let selected = if pattern.is_empty() {
        Vec::new()
    } else {
        select(&store, &pattern)?
            .iter()
            .map(|s| json!({ "key": s.key, "name": s.artifact.name(), "class": s.artifact.class_tag() }))
            .collect()
    };
    let report = json!({
        "name": store.name(),
        "title": store.title(),
        "keys": store.number_of_keys(),
        "objects": store.number_of_artifacts(),
        "selected": selected,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_get(args: GetArgs, config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let store = load(&args.snapshot, config)?;
    let (full_key, action) = split_action(&args.identifier);

    let found = if action.is_some() {
        resolve(&store, &args.identifier)?
    } else {
        store.lookup_by_full_key(full_key)?.map(std::borrow::Cow::Borrowed)
    };

    match found {
        Some(artifact) => print_artifact(&artifact, json),
        None => {
            if args.messages {
                eprint!("{}", render_messages(&store, &config.message_prefix));
            }
            bail!("no object found for {}", args.identifier)
        }
    }
}

fn cmd_sum(args: SumArgs, config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let store = load(&args.snapshot, config)?;
    match get_sum(&store, &args.pattern)? {
        Some(sum) => print_artifact(&sum, json),
        None => {
            println!("{} nothing matched {}", "!".yellow(), args.pattern.bold());
            Ok(())
        }
    }
}

fn cmd_size(args: SizeArgs, config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let store = load(&args.snapshot, config)?;
    let bytes = store.estimate_size(args.show);
    if json {
        println!("{}", json!({ "name": store.name(), "bytes": bytes }));
    } else {
        println!(
            "{} : {} bytes ({:.1} MB)",
            store.name().bold(),
            bytes,
            bytes as f64 / (1024.0 * 1024.0)
        );
    }
    Ok(())
}

fn cmd_merge(args: MergeArgs, config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let stores = args
        .inputs
        .iter()
        .map(|path| load(path, config))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let inputs: Vec<MergeInput<'_>> = stores.iter().map(MergeInput::from).collect();
    let name = args.name.as_deref().unwrap_or(&config.merged_name);

    let (merged, report) = merge(name, &inputs);
    save(&merged, &args.output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_merge_report(&report, &args.output);
    }
    Ok(())
}

fn print_merge_report(report: &MergeReport, output: &Path) {
    let mark = if report.is_complete() {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!(
        "{} Merged {} stores into {}",
        mark,
        report.merged,
        output.display().to_string().bold()
    );
    println!(
        "  Adopted: {}  Combined: {}  Failed: {}",
        report.adopted,
        report.combined,
        report.failures.len()
    );
    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failure.key.full_identifier(&failure.name).yellow(),
            failure.reason
        );
    }
}

fn cmd_prune(args: PruneArgs, config: &CliConfig) -> anyhow::Result<()> {
    if args.prefix.is_none() && !args.empty {
        bail!("nothing to prune: give a key prefix or --empty");
    }
    let mut store = load(&args.snapshot, config)?;
    if let Some(prefix) = &args.prefix {
        let removed = store.prune(prefix);
        println!("{} Pruned {} keys under {}", "✓".green(), removed, prefix.yellow());
    }
    if args.empty {
        let removed = store.prune_empty();
        println!("{} Removed {} empty objects", "✓".green(), removed);
    }
    save(&store, args.output.as_deref().unwrap_or(&args.snapshot))
}

fn cmd_attach(args: AttachArgs, config: &CliConfig) -> anyhow::Result<()> {
    let mut store = load(&args.snapshot, config)?;
    let other = load(&args.other, config)?;
    let at = PathKey::parse(&args.at)?;
    store.attach(other, &at, args.overwrite)?;
    println!("{} Attached {} under {}", "✓".green(), args.other.display(), at.to_string().yellow());
    save(&store, args.output.as_deref().unwrap_or(&args.snapshot))
}
