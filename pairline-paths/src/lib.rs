//! XDG Base Directory paths for pairline.
//!
//! Like the CLI tools it sits next to (gh, docker, kubectl), pairline uses
//! XDG paths on every platform rather than platform-native locations.

use std::path::PathBuf;

const APP_DIR: &str = "pairline";

/// Get the pairline config directory.
///
/// Returns `$XDG_CONFIG_HOME/pairline` if set, otherwise `~/.config/pairline`.
///
/// # Examples
///
/// ```
/// use pairline_paths::config_dir;
///
/// let config_file = config_dir().join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Get the pairline data directory.
///
/// Returns `$XDG_DATA_HOME/pairline` if set, otherwise `~/.local/share/pairline`.
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// Directory handed to the automation bridge for persisting the linked
/// browser session between restarts.
pub fn session_dir() -> PathBuf {
    data_dir().join("session")
}

fn xdg_dir(env_var: &str, home_relative: &str) -> PathBuf {
    if let Ok(base) = std::env::var(env_var) {
        PathBuf::from(base).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(home_relative).join(APP_DIR)
    } else {
        PathBuf::from(home_relative).join(APP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_ends_with_pairline() {
        let path = config_dir();
        assert!(
            path.ends_with("pairline"),
            "config_dir should end with 'pairline'"
        );
    }

    #[test]
    #[serial]
    fn test_session_dir_is_under_data_dir() {
        let path = session_dir();
        assert!(path.starts_with(data_dir()));
        assert!(path.ends_with("pairline/session"));
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        }
        let path = config_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-config/pairline"));
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_data_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_DATA_HOME", "/tmp/test-data");
        }
        let path = data_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-data/pairline"));
        unsafe {
            std::env::remove_var("XDG_DATA_HOME");
        }
    }
}
