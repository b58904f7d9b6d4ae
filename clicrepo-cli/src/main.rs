//! clicrepo CLI - Command-line interface
//!
//! Browse an activity repository, inspect projects and export them as
//! SCORM packages.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::common::SortArg;
use commands::config::ConfigCommands;
use commands::download::DownloadArgs;
use commands::embed::EmbedArgs;
use commands::list::ListArgs;
use error::CliError;
use runner::{CliRunner, GlobalArgs};

#[derive(Parser)]
#[command(name = "clicrepo")]
#[command(version, about = "Browse an activity repository and export SCORM packages", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository base URL (overrides repository.base_url)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Repository website URL used for share links (overrides repository.site_url)
    #[arg(long, global = true)]
    site_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects in the repository catalog
    List {
        /// Language code (e.g. ca, en, es)
        #[arg(long)]
        lang: Option<String>,

        /// Educational level code
        #[arg(long)]
        level: Option<String>,

        /// Subject area code
        #[arg(long)]
        area: Option<String>,

        /// Text to look for in title, author and description
        #[arg(long)]
        text: Option<String>,

        /// Sort field
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,

        /// Sort in descending order
        #[arg(long)]
        desc: bool,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Projects per page
        #[arg(long, default_value_t = 20)]
        per_page: usize,

        /// Show available languages, levels and areas instead of projects
        #[arg(long)]
        facets: bool,
    },

    /// Show the details of a project
    Show {
        /// Project path in the repository (e.g. lang/english/animals)
        path: String,
    },

    /// Export a project as a SCORM archive
    Download {
        /// Project path in the repository
        path: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Maximum parallel downloads (overrides download.concurrency)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Overwrite an existing archive without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Print an HTML snippet embedding a project
    Embed {
        /// Project path in the repository
        path: String,

        /// Player width in pixels
        #[arg(long, default_value_t = clicrepo::share::DEFAULT_EMBED_WIDTH)]
        width: u32,

        /// Player height in pixels
        #[arg(long, default_value_t = clicrepo::share::DEFAULT_EMBED_HEIGHT)]
        height: u32,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let global = GlobalArgs {
        verbose: cli.verbose,
        base_url: cli.base_url,
        site_url: cli.site_url,
    };

    match cli.command {
        Commands::Config { command } => commands::config::run(command),

        Commands::List {
            lang,
            level,
            area,
            text,
            sort,
            desc,
            page,
            per_page,
            facets,
        } => {
            let runner = CliRunner::new(&global)?;
            commands::list::run(
                &runner,
                ListArgs {
                    language: lang,
                    level,
                    area,
                    text,
                    sort,
                    descending: desc,
                    page,
                    per_page,
                    facets,
                },
            )
        }

        Commands::Show { path } => {
            let runner = CliRunner::new(&global)?;
            commands::show::run(&runner, &path)
        }

        Commands::Download {
            path,
            out,
            concurrency,
            force,
        } => {
            let runner = CliRunner::new(&global)?;
            commands::download::run(
                &runner,
                DownloadArgs {
                    path,
                    out,
                    concurrency,
                    force,
                },
            )
        }

        Commands::Embed {
            path,
            width,
            height,
        } => {
            let runner = CliRunner::new(&global)?;
            commands::embed::run(
                &runner,
                EmbedArgs {
                    path,
                    width,
                    height,
                },
            )
        }
    }
}
