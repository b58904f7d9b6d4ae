//! Show command - print the details of one project.

use clicrepo::catalog::load_project;
use clicrepo::share::{player_url, project_url};
use console::style;
use serde_json::Value;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the show command.
pub fn run(runner: &CliRunner, path: &str) -> Result<(), CliError> {
    runner.log_startup("show");
    let fetcher = runner.fetcher(&runner.download_config())?;
    let base_url = runner.base_url()?;

    let project = runner.block_on(load_project(&*fetcher, &base_url, path))?;

    println!("{}", style(project.title().unwrap_or(&project.path)).bold());
    println!();
    println!("Path:      {}", project.path);
    if let Some(author) = project.author() {
        println!("Author:    {}", author);
    }
    for key in ["date", "languages", "levels", "areas", "license"] {
        if let Some(value) = project.metadata.get(key).and_then(display_value) {
            println!("{:<10} {}", format!("{}:", capitalize(key)), value);
        }
    }
    println!("Main file: {}", project.main_file);
    println!("Files:     {}", project.files.len());
    println!("Archive:   {}", project.artifact_name());
    println!();
    println!("Player:    {}", player_url(&base_url, &project)?);
    println!("Share:     {}", project_url(runner.site_url(), &project.path)?);

    Ok(())
}

/// Render a metadata value on one line; `None` for empty or nested values.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map.values().filter_map(display_value).collect();
            (!parts.is_empty()).then(|| parts.join(" / "))
        }
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("ca")), Some("ca".to_string()));
        assert_eq!(display_value(&json!(["ca", "es"])), Some("ca, es".to_string()));
        assert_eq!(
            display_value(&json!({"ca": "Català", "en": "Catalan"})),
            Some("Català / Catalan".to_string())
        );
        assert_eq!(display_value(&json!("")), None);
        assert_eq!(display_value(&json!(null)), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("levels"), "Levels");
        assert_eq!(capitalize(""), "");
    }
}
