use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "accum",
    about = "Inspect, query and merge path-indexed stores of histograms and counters",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with CLI defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a store report, optionally restricted by a selection pattern
    Print(PrintArgs),
    /// Show one object by full identifier, with an optional :PX/:PY/:PFX/:PFY action
    Get(GetArgs),
    /// Sum all objects matching an exact alternation pattern
    Sum(SumArgs),
    /// Estimate the memory footprint of a store
    Size(SizeArgs),
    /// Merge several snapshots into one
    Merge(MergeArgs),
    /// Remove keys by prefix, or empty objects
    Prune(PruneArgs),
    /// Graft one snapshot under a key of another
    Attach(AttachArgs),
}

#[derive(Args)]
pub struct PrintArgs {
    pub snapshot: PathBuf,
    /// Selection pattern `/seg1/.../object[:class]`
    pub pattern: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub snapshot: PathBuf,
    pub identifier: String,
    /// Print lookup-miss messages when nothing is found
    #[arg(long)]
    pub messages: bool,
}

#[derive(Args)]
pub struct SumArgs {
    pub snapshot: PathBuf,
    pub pattern: String,
}

#[derive(Args)]
pub struct SizeArgs {
    pub snapshot: PathBuf,
    /// Log the size of every object
    #[arg(long)]
    pub show: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(short, long)]
    pub output: PathBuf,
    /// Name of the merged store
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct PruneArgs {
    pub snapshot: PathBuf,
    /// Remove every key starting with this prefix
    pub prefix: Option<String>,
    /// Remove objects without entries
    #[arg(long)]
    pub empty: bool,
    /// Write the result here instead of overwriting the snapshot
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct AttachArgs {
    pub snapshot: PathBuf,
    pub other: PathBuf,
    /// Key to graft under
    #[arg(long)]
    pub at: String,
    #[arg(long)]
    pub overwrite: bool,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_print() {
        let cli = Cli::try_parse_from(["accum", "print", "s.json", "/*/*"]).unwrap();
        if let Command::Print(args) = cli.command {
            assert_eq!(args.snapshot, PathBuf::from("s.json"));
            assert_eq!(args.pattern.as_deref(), Some("/*/*"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_print_without_pattern() {
        let cli = Cli::try_parse_from(["accum", "print", "s.json"]).unwrap();
        assert!(matches!(cli.command, Command::Print(PrintArgs { pattern: None, .. })));
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["accum", "get", "s.json", "/A/h:PX"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.identifier, "/A/h:PX");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_merge() {
        let cli =
            Cli::try_parse_from(["accum", "merge", "a.json", "b.json", "-o", "out.json"]).unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.inputs.len(), 2);
            assert_eq!(args.output, PathBuf::from("out.json"));
            assert!(args.name.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn merge_requires_inputs() {
        assert!(Cli::try_parse_from(["accum", "merge", "-o", "out.json"]).is_err());
    }

    #[test]
    fn parse_prune_empty() {
        let cli = Cli::try_parse_from(["accum", "prune", "s.json", "--empty"]).unwrap();
        if let Command::Prune(args) = cli.command {
            assert!(args.empty);
            assert!(args.prefix.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_attach() {
        let cli = Cli::try_parse_from([
            "accum", "attach", "a.json", "b.json", "--at", "/SUB/", "--overwrite",
        ])
        .unwrap();
        if let Command::Attach(args) = cli.command {
            assert_eq!(args.at, "/SUB/");
            assert!(args.overwrite);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "accum", "--verbose", "--format", "json", "--config", "accum.toml", "size", "s.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("accum.toml")));
    }
}
