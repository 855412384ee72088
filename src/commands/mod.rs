mod build;
mod init;
mod serve;

pub use build::cmd_build;
pub use init::cmd_init;
pub use serve::cmd_serve;

use crate::api::ReportInput;
use crate::cli::ReportArgs;
use crate::config::Config;
use crate::style;
use std::path::{Path, PathBuf};

/// Shared context for command execution, reducing boilerplate across commands.
pub struct CommandContext {
    pub path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// Resolve the project path and load its config.
    /// Returns Err(exit_code) if setup fails.
    pub fn new(path: &Path) -> Result<Self, i32> {
        let resolved_path = match path.canonicalize() {
            Ok(p) => p,
            Err(_) => {
                style::error(&format!("Could not resolve path: {}", style::path(path)));
                return Err(1);
            }
        };

        let config = Config::load(&resolved_path).unwrap_or_else(|e| {
            style::warning(&format!("Failed to load config: {}. Using defaults.", e));
            Config::default()
        });

        Ok(Self {
            path: resolved_path,
            config,
        })
    }
}

impl From<&ReportArgs> for ReportInput {
    fn from(args: &ReportArgs) -> Self {
        match (&args.report, args.analyzer) {
            (Some(file), _) => ReportInput::File(file.clone()),
            (None, true) => ReportInput::Analyzer,
            (None, false) => ReportInput::None,
        }
    }
}
