//! Main CLI application structure

use clap::Parser;
use clib::TracingReporter;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::{install, search, uninstall, Commands};
use crate::cli::config::CliContext;
use crate::cli::error::CliResult;

/// clib - package manager for C source libraries
#[derive(Debug, Parser)]
#[command(name = "clib")]
#[command(version = clib::VERSION)]
#[command(about = "clib - package manager for C source libraries")]
#[command(long_about = "clib installs C libraries from source tarballs.\n\n\
                         Configuration is read from the first of:\n\
                         1. the file given with --config\n\
                         2. ./clib.toml\n\
                         3. <config dir>/clib/config.toml\n\n\
                         Examples:\n\
                           clib install clibs/buffer            # Install the master branch\n\
                           clib uninstall clibs/list@0.2.0      # Run the package's uninstall target\n\
                           clib search string                   # Search every registry")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a clib.toml file (overrides the default lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra registry url, searched before configured registries (repeatable)
    #[arg(long = "registry", global = true, value_name = "URL")]
    pub registries: Vec<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide fetch/untar progress lines; diagnostics go through the log filter only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        clib::init_logging(self.verbose);

        let reporter = if self.quiet {
            TracingReporter::quiet()
        } else {
            TracingReporter::new()
        };
        let context = CliContext::load(
            self.config.as_deref(),
            &self.registries,
            Arc::new(reporter),
        )?;

        match self.command {
            Commands::Install(args) => install::execute_install(&context, args).await,
            Commands::Uninstall(args) => uninstall::execute_uninstall(&context, args).await,
            Commands::Search(args) => search::execute_search(&context, args).await,
        }
    }
}
