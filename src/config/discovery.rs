//! Config discovery for tailwatch.
//!
//! The project file `tailwatch.yaml` is the nearest one found walking up
//! from the working directory. The global file lives at
//! `<config_dir>/tailwatch/config.yaml`.

use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_NAME: &str = "tailwatch.yaml";
pub const GLOBAL_CONFIG_NAME: &str = "config.yaml";

/// Config files that apply to this run, and where we looked for them.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    /// Directories checked for a project file, nearest first.
    pub searched: Vec<PathBuf>,
}

impl Discovery {
    /// Files in the order they are merged; the project file goes last
    /// so its keys win.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.global.iter().chain(self.project.iter())
    }
}

/// Look for config files relative to the current directory.
pub fn discover() -> Discovery {
    let cwd = std::env::current_dir()
        .ok()
        .map(|dir| dir.canonicalize().unwrap_or(dir));
    discover_from(cwd.as_deref(), dirs::config_dir().as_deref())
}

fn discover_from(start: Option<&Path>, config_dir: Option<&Path>) -> Discovery {
    let global = config_dir
        .map(|dir| dir.join("tailwatch").join(GLOBAL_CONFIG_NAME))
        .filter(|path| path.is_file());

    let mut searched = Vec::new();
    let project = start.and_then(|start| {
        start.ancestors().find_map(|dir| {
            searched.push(dir.to_path_buf());
            Some(dir.join(PROJECT_CONFIG_NAME)).filter(|path| path.is_file())
        })
    });

    Discovery {
        global,
        project,
        searched,
    }
}
