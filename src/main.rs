use clap::Parser;
use crawler_studio::cli::commands::{cmd_analyze, cmd_crawler, cmd_flow, cmd_select};
use crawler_studio::cli::config::{Cli, Commands, resolve_config};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // CLI > env > config file > defaults
    let config = resolve_config(&cli);

    match cli.command {
        Commands::Analyze {
            url,
            kind,
            search,
            limit,
        } => {
            cmd_analyze(&config, &url, kind.as_deref(), search.as_deref(), limit)?;
        }
        Commands::Select {
            url,
            selectors,
            mode,
        } => {
            cmd_select(&config, &url, &selectors, &mode)?;
        }
        Commands::Flow { url, actions, name } => {
            cmd_flow(&config, &url, &actions, &name)?;
        }
        Commands::Crawler { command } => {
            cmd_crawler(&config, command)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from warn.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
