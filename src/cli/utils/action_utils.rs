//! Shared driver for the install and uninstall commands

use crate::cli::config::CliContext;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::messages;
use clib::core::{BatchError, PackageAction, PackageId, Pipeline, PipelineError};

/// Run `action` for every identifier in order, stopping at the first failure
pub async fn run_action(
    context: &CliContext,
    action: PackageAction,
    packages: &[String],
    dry_run: bool,
) -> CliResult<()> {
    let pipeline = context.pipeline()?;

    if dry_run {
        return print_plans(&pipeline, action, packages);
    }

    let count = pipeline.run_batch(action, packages).await?;
    println!(
        "{}",
        messages::ok(&format!("{} {} package(s)", past_tense(action), count))
    );
    Ok(())
}

fn print_plans(pipeline: &Pipeline, action: PackageAction, packages: &[String]) -> CliResult<()> {
    for (index, identifier) in packages.iter().enumerate() {
        let plan = PackageId::parse(identifier)
            .map_err(PipelineError::from)
            .and_then(|id| pipeline.plan(&id.owner, &id.name, &id.version))
            .map_err(|source| {
                CliError::Batch(BatchError {
                    action,
                    identifier: identifier.clone(),
                    source,
                })
            })?;

        println!("{}", messages::progress(index + 1, packages.len(), identifier));
        println!("  tarball: {}", plan.archive_url);
        println!("  archive: {}", plan.archive_path.display());
        println!("  extract: {}", plan.extract_command());
        println!(
            "  action:  {} (unless package.json sets \"{}\")",
            plan.action_command(action.default_command()),
            action.descriptor_field()
        );
    }
    Ok(())
}

fn past_tense(action: PackageAction) -> &'static str {
    match action {
        PackageAction::Install => "Installed",
        PackageAction::Uninstall => "Uninstalled",
    }
}
