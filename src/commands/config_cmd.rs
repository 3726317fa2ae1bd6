use std::path::Path;
use std::process::Command;

use crate::config::{Config, config_file_path, ensure_config_file};
use crate::error::AppError;
use crate::utils::display_path;

pub struct ConfigOptions {
    pub show_path: bool,
    pub edit: bool,
    pub add_exclude: Option<String>,
}

/// With no flags, print the effective file contents with secrets masked.
pub fn execute_config(options: ConfigOptions) -> Result<(), AppError> {
    let dump = !options.show_path && options.add_exclude.is_none() && !options.edit;

    if options.show_path {
        println!("Configuration file: {}", display_path(&config_file_path()?));
    }

    if let Some(pattern) = options.add_exclude {
        let mut config = Config::load()?;
        if config.add_exclude_pattern(&pattern)? {
            config.save()?;
            println!("Added exclude pattern '{pattern}'.");
        } else {
            println!("Exclude pattern '{pattern}' is already configured.");
        }
    }

    if options.edit {
        let path = ensure_config_file()?;
        launch_editor(&editor_command(|key| std::env::var(key).ok()), &path)?;
    }

    if dump {
        print!("{}", Config::load()?.to_redacted_toml()?);
    }

    Ok(())
}

/// `$VISUAL`, then `$EDITOR`, then `vi`, split into program and arguments.
fn editor_command<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let command = ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(lookup)
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string());
    command.split_whitespace().map(String::from).collect()
}

fn launch_editor(command: &[String], path: &Path) -> Result<(), AppError> {
    let Some((program, args)) = command.split_first() else {
        return Err(AppError::Editor("no editor configured".to_string()));
    };
    log::debug!("Opening {} with {}", path.display(), program);

    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|err| AppError::Editor(format!("{program}: {err}")))?;
    if !status.success() {
        return Err(AppError::Editor(format!("{program} exited with status {status}")));
    }
    Ok(())
}
