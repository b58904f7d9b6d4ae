//! Config command - inspect and edit `config.ini`.

use std::path::Path;

use clap::Subcommand;
use clicrepo::config::{config_file_path, ConfigFile, ConfigKey};
use console::style;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key (e.g. download.concurrency)
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key (e.g. repository.base_url)
        key: String,

        /// New value; an empty string clears optional settings
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print the location of the configuration file
    Path,
}

/// Run a config subcommand against the user's configuration file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    for line in execute(command, &path)? {
        println!("{}", line);
    }
    Ok(())
}

/// Execute `command` against the file at `path` and return the lines to print.
fn execute(command: ConfigCommands, path: &Path) -> Result<Vec<String>, CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = lookup(&key)?;
            let value = key.get(&ConfigFile::load_from(path)?);
            Ok(vec![display_value(&value)])
        }
        ConfigCommands::Set { key, value } => {
            let key = lookup(&key)?;
            let mut config = ConfigFile::load_from(path)?;
            key.set(&mut config, &value)?;
            config.save_to(path)?;
            Ok(vec![format!(
                "{} {} = {}",
                style("Saved").green(),
                key.name(),
                display_value(&key.get(&config))
            )])
        }
        ConfigCommands::List => Ok(list_lines(&ConfigFile::load_from(path)?)),
        ConfigCommands::Path => Ok(vec![path.display().to_string()]),
    }
}

fn lookup(name: &str) -> Result<ConfigKey, CliError> {
    name.parse().map_err(|_| {
        let known: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!(
            "Unknown setting '{}'. Known settings: {}",
            name,
            known.join(", ")
        ))
    })
}

fn display_value(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value.to_string()
    }
}

fn list_lines(config: &ConfigFile) -> Vec<String> {
    let mut lines = Vec::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                lines.push(String::new());
            }
            section = key.section();
            lines.push(format!("[{}]", section));
        }
        lines.push(format!(
            "{:<20} = {}",
            key.key_name(),
            display_value(&key.get(config))
        ));
    }
    lines
}
