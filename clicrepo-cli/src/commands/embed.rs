//! Embed command - print an iframe snippet and share link for a project.

use clicrepo::catalog::load_project;
use clicrepo::share::{embed_code, player_url, project_url};
use clicrepo::EmbedOptions;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the embed command.
pub struct EmbedArgs {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// Run the embed command.
pub fn run(runner: &CliRunner, args: EmbedArgs) -> Result<(), CliError> {
    runner.log_startup("embed");
    if args.width == 0 || args.height == 0 {
        return Err(CliError::Config(
            "Embed width and height must be greater than zero.".to_string(),
        ));
    }

    let fetcher = runner.fetcher(&runner.download_config())?;
    let base_url = runner.base_url()?;
    let project = runner.block_on(load_project(&*fetcher, &base_url, &args.path))?;

    let src = player_url(&base_url, &project)?;
    let options = EmbedOptions {
        width: args.width,
        height: args.height,
    };

    println!("{}", embed_code(&src, &options));
    println!();
    println!("Share link: {}", project_url(runner.site_url(), &project.path)?);

    Ok(())
}
