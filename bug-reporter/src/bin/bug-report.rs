use anyhow::Result;
use bug_reporter::prelude::*;
use clap::{Parser, Subcommand};
use colored::Colorize;
use human_panic::setup_panic;
use tracing::{Level, enabled, error, info};

/// bug-report
///
/// Files bug reports as issues, either straight through the GitHub
/// API or through a relay that holds the credentials.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(flatten)]
    logging: LoggingOpts,

    #[clap(flatten)]
    config: ConfigOptions,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
struct VersionArgs {
    #[arg(long, action)]
    pub short: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a bug report to a configured destination
    #[clap(alias("s"))]
    Submit(SubmitArgs),
    /// List the found config files, and destinations detected
    #[clap(alias("l"))]
    List,
    /// Print version info and exit
    #[clap(alias("v"))]
    Version(VersionArgs),
}

#[tokio::main]
async fn main() {
    setup_panic!();
    dotenvy::dotenv().ok();
    let opts = Cli::parse();

    let (guard, file_location) = match opts
        .logging
        .configure_logging(&opts.config.get_run_id(), "root")
    {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("Unable to configure logging. {:?}", e);
            std::process::exit(1);
        }
    };
    let error_code = run_subcommand(opts).await;

    if error_code != 0 || enabled!(Level::DEBUG) {
        info!(target: "user", "More detailed logs at {}", file_location);
    }

    drop(guard);
    std::process::exit(error_code);
}

async fn run_subcommand(opts: Cli) -> i32 {
    let loaded_config = match opts.config.load_config().await {
        Err(e) => {
            error!(target: "user", "Failed to load configuration: {}", e);
            return 2;
        }
        Ok(c) => c,
    };

    handle_commands(&loaded_config, &opts.command)
        .await
        .unwrap_or_else(|e| {
            error!(target: "user", "Critical Error. {}", e);
            1
        })
}

async fn handle_commands(found_config: &FoundConfig, command: &Command) -> Result<i32> {
    match command {
        Command::Submit(args) => submit_root(found_config, args).await,
        Command::List => show_config(found_config).map(|_| 0),
        Command::Version(args) => print_version(args).await,
    }
}

fn show_config(found_config: &FoundConfig) -> Result<()> {
    if found_config.destinations.is_empty() {
        info!(target: "user", "No destinations found");
        return Ok(());
    }

    info!(target: "user", "Destinations");
    let destinations: Vec<&Destination> = found_config.destinations.values().collect();
    print_details(&found_config.working_dir, &destinations);
    Ok(())
}

async fn print_version(args: &VersionArgs) -> Result<i32> {
    if args.short {
        println!("bug-report {}", env!("CARGO_PKG_VERSION"));
    } else {
        info!(target: "user", "{}: {:60}", "Version".white().bold(), env!("CARGO_PKG_VERSION"));
        info!(target: "user", "{}: {:60}", "Log dir".white().bold(), LOG_DIR);
    }

    Ok(0)
}
