use crate::model::SortKey;
use crate::provider::DEFAULT_PROVIDER;
use crate::store::PathList;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-stats")]
#[command(about = "Per-author contribution statistics for git repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    #[arg(long, env = "GIT_STATS_STATE_DIR", help = "Directory holding the saved settings")]
    pub state_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "GIT_STATS_PROVIDER",
        default_value = DEFAULT_PROVIDER,
        help = "Program that extracts per-commit statistics"
    )]
    pub provider: String,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output (-v debug, -vv trace)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only log errors")]
    pub quiet: bool,
}

#[derive(Args, Clone, Copy, Debug, Default)]
pub struct FormatArgs {
    #[arg(long, help = "Output as JSON", conflicts_with = "ndjson")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON")]
    pub ndjson: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a repository (prompts when REPO is omitted) and show its statistics
    Open {
        #[arg(help = "Path to git repository")]
        repo: Option<PathBuf>,

        #[clap(flatten)]
        format: FormatArgs,
    },
    /// Reload the saved repository with the saved filters
    Show {
        #[clap(flatten)]
        format: FormatArgs,
    },
    /// Choose the ranking column
    Sort {
        #[arg(value_enum)]
        key: SortKey,
    },
    /// Set the top-N limit (0-100); a blank value keeps the current one
    Limit {
        value: Option<String>,

        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        #[arg(long)]
        disable: bool,
    },
    /// Edit the included paths
    Include {
        #[command(subcommand)]
        action: PathAction,
    },
    /// Edit the excluded paths
    Exclude {
        #[command(subcommand)]
        action: PathAction,
    },
    /// Print the pathspec passed to the provider
    Pathspec,
    /// Print the saved settings
    Settings,
    /// Count files matched by the current filters
    Files,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PathAction {
    /// Append a path
    Add {
        #[arg(default_value = "")]
        path: String,
    },
    /// Remove the path at INDEX
    Remove { index: usize },
    /// Replace the path at INDEX
    Change { index: usize, value: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let mut app = crate::commands::App::load(&self.common)?;
        match self.command {
            Commands::Open { repo, format } => app.open(repo, format),
            Commands::Show { format } => app.show(format),
            Commands::Sort { key } => app.sort(key),
            Commands::Limit { value, enable, disable } => {
                let enabled = if enable {
                    Some(true)
                } else if disable {
                    Some(false)
                } else {
                    None
                };
                app.limit(value.as_deref(), enabled)
            }
            Commands::Include { action } => app.edit_paths(PathList::Included, action),
            Commands::Exclude { action } => app.edit_paths(PathList::Excluded, action),
            Commands::Pathspec => app.print_pathspec(),
            Commands::Settings => app.print_settings(),
            Commands::Files => app.files(),
        }
    }
}
