use anyhow::Result;
use git_statistics::cli::Cli;
use git_statistics::observability::{env_filter, init_logging};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(env_filter(cli.common.quiet, cli.common.verbose, "warn"));
    cli.execute()
}
