//! List command - browse the repository catalog.

use clicrepo::catalog::{paginate, Catalog, Facets, ProjectFilter};
use console::style;

use super::common::{sort_order, summary_line, SortArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the list command.
pub struct ListArgs {
    pub language: Option<String>,
    pub level: Option<String>,
    pub area: Option<String>,
    pub text: Option<String>,
    pub sort: SortArg,
    pub descending: bool,
    pub page: usize,
    pub per_page: usize,
    pub facets: bool,
}

impl ListArgs {
    fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            language: self.language.clone(),
            level: self.level.clone(),
            area: self.area.clone(),
            text: self.text.clone(),
        }
    }
}

/// Run the list command.
pub fn run(runner: &CliRunner, args: ListArgs) -> Result<(), CliError> {
    runner.log_startup("list");
    let fetcher = runner.fetcher(&runner.download_config())?;
    let base_url = runner.base_url()?;

    let catalog = runner.block_on(Catalog::load(&*fetcher, base_url.as_str()))?;

    if args.facets {
        print_facets(&catalog.facets());
        return Ok(());
    }

    let hits = catalog.query(&args.filter(), args.sort.into(), sort_order(args.descending));
    let page = paginate(&hits, args.page, args.per_page);

    if page.total_items == 0 {
        println!("No projects match.");
        return Ok(());
    }
    if page.items.is_empty() {
        return Err(CliError::Config(format!(
            "Page {} is out of range (1-{}).",
            page.page, page.total_pages
        )));
    }

    println!(
        "{}",
        style(format!(
            "{:<32} {:<40} {:<24} {:<10} {}",
            "PATH", "TITLE", "AUTHOR", "DATE", "LANG"
        ))
        .bold()
    );
    for project in &page.items {
        println!("{}", summary_line(project));
    }
    println!();
    println!(
        "Page {} of {} ({} projects)",
        page.page, page.total_pages, page.total_items
    );

    Ok(())
}

fn print_facets(facets: &Facets) {
    for (title, counts) in [
        ("Languages", &facets.languages),
        ("Levels", &facets.levels),
        ("Areas", &facets.areas),
    ] {
        println!("{}", style(title).bold());
        for (code, count) in counts {
            println!("  {:<12} {}", code, count);
        }
        println!();
    }
}
