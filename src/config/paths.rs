//! Where the studio keeps its files, resolved with the `dirs` crate.
//!
//! ```text
//! <config_dir>/video-studio/settings.toml
//! <data_local_dir>/video-studio/exports/<job-id>.json
//! ```
//!
//! Linux resolves these to `~/.config` and `~/.local/share`, macOS to
//! `~/Library/Application Support` for both, Windows to `%APPDATA%` and
//! `%LOCALAPPDATA%`.

use std::fmt::Display;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Target of `generate --export`.
    pub exports_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "video-studio";

    /// Platform locations; a platform without them falls back to `./video-studio`.
    pub fn new() -> Self {
        let app_dir = |base: Option<PathBuf>| {
            base.unwrap_or_else(|| PathBuf::from(".")).join(Self::APP_NAME)
        };
        Self::with_dirs(app_dir(dirs::config_dir()), app_dir(dirs::data_local_dir()))
    }

    /// Keep settings and exports together under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self::with_dirs(root.clone(), root)
    }

    fn with_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            settings_file: config_dir.join("settings.toml"),
            exports_dir: data_dir.join("exports"),
            config_dir,
        }
    }

    /// Export location for one job.
    pub fn export_file(&self, job_id: impl Display) -> PathBuf {
        self.exports_dir.join(format!("{job_id}.json"))
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
