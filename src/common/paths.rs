//! Configuration paths and program resolution

use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "smoke-harness";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/smoke-harness/`
/// - macOS: `~/Library/Application Support/smoke-harness/`
/// - Windows: `%APPDATA%\smoke-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve a program the way a spawned command would find it
///
/// Bare names are looked up on `PATH`. Names containing a path separator
/// are taken relative to `cwd`, matching how the child process resolves
/// them once its working directory is set.
pub fn resolve_program(program: &str, cwd: &Path) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            cwd.join(candidate)
        };
        return path.is_file().then_some(path);
    }
    which::which(program).ok()
}
