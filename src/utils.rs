use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "jnl-dev",
            Profile::Prod => "jnl",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "jnl-dev" instead of "jnl"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "jnl", profile.app_name()).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (database and entry files live here by default)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "jnl", profile.app_name()).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_leaves_plain_paths_alone() {
        assert_eq!(expand_path("/tmp/jnl/app.db"), PathBuf::from("/tmp/jnl/app.db"));
        assert_eq!(expand_path("entries"), PathBuf::from("entries"));
    }

    #[test]
    fn expand_replaces_home_prefix() {
        if BaseDirs::new().is_none() {
            return;
        }
        let expanded = expand_path("~/journal/entries");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("journal/entries"));
    }
}
