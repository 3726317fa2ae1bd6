pub mod changes;
pub mod config_cmd;
pub mod output;
pub mod project;

pub use changes::execute_changes;
pub use config_cmd::execute_config;
pub use project::execute_project;

use crate::backend::Backend;
use crate::config::Config;
use crate::error::AppError;
use crate::scanner::Scanner;

/// Flags shared by every scanning subcommand.
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub workers: Option<usize>,
    pub max_requests: Option<usize>,
    pub output: Option<std::path::PathBuf>,
    pub quiet: bool,
}

impl CommonOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(max_requests) = self.max_requests {
            config.max_concurrent_requests = max_requests;
        }
    }
}

fn build_scanner(options: &CommonOptions) -> Result<Scanner, AppError> {
    let mut config = Config::resolve()?;
    options.apply(&mut config);
    config.validate()?;
    let backend = Backend::from_config(&config.backend)?;
    Scanner::new(&config, Box::new(backend))
}
