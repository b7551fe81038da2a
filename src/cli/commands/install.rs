//! Install command implementation

use crate::cli::config::CliContext;
use crate::cli::error::CliResult;
use crate::cli::utils::action_utils;
use clap::Args;
use clib::core::PackageAction;

/// Install packages by running their install action
///
/// The action comes from the `install` field of the package's `package.json`,
/// falling back to `make install`.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Packages to install, as owner/name[@version]
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Print what would be fetched and run without doing it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute_install(context: &CliContext, args: InstallArgs) -> CliResult<()> {
    action_utils::run_action(context, PackageAction::Install, &args.packages, args.dry_run).await
}
