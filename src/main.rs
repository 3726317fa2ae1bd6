use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use sheriff::commands::changes::ChangesOptions;
use sheriff::commands::config_cmd::ConfigOptions;
use sheriff::commands::project::ProjectOptions;
use sheriff::commands::{CommonOptions, execute_changes, execute_config, execute_project};
use sheriff::error::AppError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Project(args) => execute_project(ProjectOptions {
            path: args.path,
            recursive: args.recursive,
            common: args.common.into(),
        }),
        Commands::Changes(args) => execute_changes(ChangesOptions {
            project_dir: args.project_dir,
            source_branch: args.source_branch,
            target_branch: args.target_branch,
            common: args.common.into(),
        }),
        Commands::Config(args) => execute_config(ConfigOptions {
            show_path: args.path,
            edit: args.edit,
            add_exclude: args.add_exclude,
        }),
    }
}

#[derive(Parser)]
#[command(name = "sheriff", version, about = "Flag malicious source files with an LLM reviewer.")]
struct Cli {
    /// Log each file as it is dispatched.
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project directory or a single file.
    Project(ProjectArgs),
    /// Scan the files changed between two branches (merge request mode).
    #[command(visible_alias = "gitlab")]
    Changes(ChangesArgs),
    /// Manage sheriff configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Maximum number of files processed at once (default: CPU count + 4, at most 32).
    #[arg(
        short = 'w',
        long = "workers",
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    workers: Option<u64>,

    /// Maximum number of backend requests in flight at once.
    #[arg(
        long = "max-requests",
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_requests: Option<u64>,

    /// Write the JSON report to this file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Hide the progress bar.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

impl From<CommonArgs> for CommonOptions {
    fn from(args: CommonArgs) -> Self {
        CommonOptions {
            workers: args.workers.map(|n| n as usize),
            max_requests: args.max_requests.map(|n| n as usize),
            output: args.output,
            quiet: args.quiet,
        }
    }
}

#[derive(Args)]
struct ProjectArgs {
    /// Path to the project directory or file.
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Scan subdirectories recursively.
    #[arg(short, long, action = ArgAction::SetTrue)]
    recursive: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct ChangesArgs {
    /// Path to the repository checkout.
    #[arg(value_name = "PROJECT_DIR")]
    project_dir: PathBuf,

    /// Branch carrying the changes.
    #[arg(value_name = "SOURCE_BRANCH")]
    source_branch: String,

    /// Branch the changes will be merged into.
    #[arg(value_name = "TARGET_BRANCH")]
    target_branch: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct ConfigArgs {
    /// Show the configuration file path.
    #[arg(long = "path", action = ArgAction::SetTrue)]
    path: bool,

    /// Open the configuration file in $EDITOR.
    #[arg(long = "edit", action = ArgAction::SetTrue)]
    edit: bool,

    /// Add a glob to skip during directory scans.
    #[arg(long = "add-exclude", value_name = "GLOB")]
    add_exclude: Option<String>,
}
