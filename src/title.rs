use std::path::{Path, MAIN_SEPARATOR};

pub const APP_NAME: &str = "Git Statistics";

pub fn home_dir() -> Option<std::path::PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Render `path` with the home directory shortened to `~`.
pub fn abbreviate_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(rest) = home.and_then(|h| path.strip_prefix(h).ok()) {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~{MAIN_SEPARATOR}{}", rest.display());
    }
    path.display().to_string()
}

pub fn window_title(repo: &Path) -> String {
    format!("{APP_NAME}: {}", abbreviate_home(repo, home_dir().as_deref()))
}
