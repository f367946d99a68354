use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "sparpi")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("sparpi_config.json"))
    }

    /// Log file location. The TUI owns the terminal, so logs never go to
    /// stdout or stderr.
    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("sparpi")
                .join("sparpi.log")
        } else {
            ProjectDirs::from("", "", "sparpi")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("sparpi.log"))
                .unwrap_or_else(|| std::env::temp_dir().join("sparpi.log"))
        }
    }
}
