//! Command modules for CLI

pub mod install;
pub mod search;
pub mod uninstall;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
#[command(about = "clib commands")]
pub enum Commands {
    /// Fetch, unpack and install one or more packages
    #[command(about = "Install packages given as owner/name[@version]")]
    Install(install::InstallArgs),

    /// Fetch, unpack and uninstall one or more packages
    #[command(about = "Uninstall packages given as owner/name[@version]")]
    Uninstall(uninstall::UninstallArgs),

    /// Search the configured registries
    #[command(about = "Search registries for packages")]
    Search(search::SearchArgs),
}
