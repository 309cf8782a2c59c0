//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod clients;
pub mod config_cmd;
pub mod currency;
pub mod dial_codes;
pub mod phone;

use std::path::PathBuf;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::Shell;
use navigest_core::{DialCodeCatalog, DirectoryConfig};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Validated settings every engine-backed command runs with.
pub struct Engine {
    pub directory: DirectoryConfig,
    pub catalog: Arc<DialCodeCatalog>,
}

impl Engine {
    /// Load and validate the config file selected by `--config`.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let path = config_file(global);
        let cfg = navigest_config::load_config_from(&path).map_err(|e| CliError::config(&path, &e))?;
        let directory = cfg
            .to_directory_config()
            .map_err(|e| CliError::config(&path, &e))?;
        let catalog = cfg.build_catalog().map_err(|e| CliError::config(&path, &e))?;

        tracing::debug!(
            path = %path.display(),
            dial_codes = catalog.len(),
            default_country = %directory.default_country,
            "configuration loaded"
        );
        Ok(Self { directory, catalog })
    }
}

/// Config file in effect: `--config` or the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(navigest_config::config_path)
}

/// Run a parsed command line.
///
/// Only commands that touch phones or clients load the config file, so a
/// broken file can still be inspected and rewritten with `config`.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let global = &cli.global;
    tracing::debug!(command = ?cli.command, "dispatching command");

    match cli.command {
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            print_completions(args.shell);
            Ok(())
        }
        Command::Currency(args) => currency::handle(&args, global),
        Command::Phone(args) => phone::handle(args, &Engine::load(global)?, global),
        Command::DialCodes(args) => dial_codes::handle(&args, &Engine::load(global)?, global),
        Command::Clients(args) => clients::handle(args, &Engine::load(global)?, global).await,
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "navigest", &mut std::io::stdout());
}
