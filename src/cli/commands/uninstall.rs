//! Uninstall command implementation

use crate::cli::config::CliContext;
use crate::cli::error::CliResult;
use crate::cli::utils::action_utils;
use clap::Args;
use clib::core::PackageAction;

/// Uninstall packages by running their uninstall action
///
/// Each package is fetched again at the given version so its own uninstall
/// target runs. Stops at the first package that fails.
#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Packages to uninstall, as owner/name[@version]
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Print what would be fetched and run without doing it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute_uninstall(context: &CliContext, args: UninstallArgs) -> CliResult<()> {
    action_utils::run_action(
        context,
        PackageAction::Uninstall,
        &args.packages,
        args.dry_run,
    )
    .await
}
