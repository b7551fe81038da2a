//! Search command implementation

use crate::cli::config::CliContext;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::messages;
use clap::Args;
use clib::core::{Package, Registry};
use serde::Serialize;

/// Search every registry for packages
///
/// Registries are listed in priority order; one that cannot be fetched is
/// reported and skipped.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive text matched against package ids and descriptions
    pub query: Option<String>,

    /// Resolve a single namespace/name and print the registry that serves it
    #[arg(long, conflicts_with = "query")]
    pub id: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JsonSearchResult<'a> {
    registry: &'a str,
    #[serde(flatten)]
    package: &'a Package,
}

pub async fn execute_search(context: &CliContext, args: SearchArgs) -> CliResult<()> {
    let mut manager = context.registry_manager()?;
    let failures = manager.fetch_registries().await;
    if failures.len() == manager.len() {
        return Err(CliError::NoRegistries(manager.len()));
    }
    let summary = skipped_summary(failures.len(), manager.len());

    if let Some(id) = args.id.as_deref() {
        let (registry, package) = manager
            .find_package_with_registry(id)
            .ok_or_else(|| CliError::PackageNotFound(id.to_string()))?;
        print_resolved(registry, package, args.json)?;
        print_summary(summary.as_deref());
        return Ok(());
    }

    let query = args.query.as_deref().unwrap_or_default();
    let results: Vec<(&Registry, &Package)> = manager.search(query).collect();

    if args.json {
        let json_results: Vec<JsonSearchResult<'_>> = results
            .iter()
            .map(|(registry, package)| JsonSearchResult {
                registry: registry.get_url(),
                package,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    } else if results.is_empty() {
        println!("No packages found matching '{}'", query);
    } else {
        print_grouped(&results);
    }

    print_summary(summary.as_deref());
    Ok(())
}

/// Warning text when part of the registries could not be listed
fn skipped_summary(failed: usize, total: usize) -> Option<String> {
    (failed > 0).then(|| {
        messages::warning(&format!(
            "{} of {} registries could not be listed; results may be incomplete",
            failed, total
        ))
    })
}

fn print_summary(summary: Option<&str>) {
    if let Some(summary) = summary {
        eprintln!("{}", summary);
    }
}

fn print_resolved(registry: &Registry, package: &Package, json: bool) -> CliResult<()> {
    if json {
        let result = JsonSearchResult {
            registry: registry.get_url(),
            package,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", package.id());
        println!("  registry:    {}", registry.get_url());
        println!("  url:         {}", package.href());
        if !package.description().is_empty() {
            println!("  description: {}", package.description());
        }
    }
    Ok(())
}

/// Print results under a header each time the registry or category changes
fn print_grouped(results: &[(&Registry, &Package)]) {
    let mut current: Option<(&str, &str)> = None;

    for (registry, package) in results {
        let group = (registry.get_url(), package.category());
        if current != Some(group) {
            if current.is_some() {
                println!();
            }
            if current.map(|(url, _)| url) != Some(group.0) {
                println!("{}", group.0);
            }
            let category = if group.1.is_empty() {
                "Uncategorized"
            } else {
                group.1
            };
            println!("  {}", category);
            current = Some(group);
        }

        if package.description().is_empty() {
            println!("    {}", package.id());
        } else {
            println!("    {:<32} {}", package.id(), package.description());
        }
    }
}
