//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\image-to-text\
//!   macOS:   ~/Library/Application Support/image-to-text/
//!   Linux:   ~/.config/image-to-text/
//!
//! `IMAGE_TO_TEXT_CONFIG_DIR` replaces the platform directory when set.

use std::ffi::OsString;
use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "IMAGE_TO_TEXT_CONFIG_DIR";

impl AppPaths {
    const APP_NAME: &'static str = "image-to-text";

    /// Resolves the config directory from [`CONFIG_DIR_ENV`] or the `dirs`
    /// crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        Self::resolve(override_dir(std::env::var_os(CONFIG_DIR_ENV)))
    }

    /// Paths rooted at `config_dir`.
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
        }
    }

    fn resolve(override_dir: Option<PathBuf>) -> Self {
        match override_dir {
            Some(dir) => Self::in_dir(dir),
            None => Self::in_dir(
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(Self::APP_NAME),
            ),
        }
    }
}

/// An unset or empty [`CONFIG_DIR_ENV`] means "no override".
fn override_dir(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths.settings_file.starts_with(&paths.config_dir));
    }

    #[test]
    fn platform_dir_ends_with_app_name() {
        let paths = AppPaths::resolve(None);
        assert!(paths.config_dir.ends_with("image-to-text"));
    }

    #[test]
    fn override_dir_is_used_verbatim() {
        let paths = AppPaths::resolve(Some(PathBuf::from("/srv/ocr-config")));
        assert_eq!(paths.config_dir, PathBuf::from("/srv/ocr-config"));
        assert_eq!(
            paths.settings_file,
            PathBuf::from("/srv/ocr-config/settings.toml")
        );
    }

    #[test]
    fn empty_override_is_ignored() {
        assert_eq!(override_dir(None), None);
        assert_eq!(override_dir(Some(OsString::new())), None);
        assert_eq!(
            override_dir(Some(OsString::from("/srv/ocr-config"))),
            Some(PathBuf::from("/srv/ocr-config"))
        );
    }

    #[test]
    fn env_var_overrides_config_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::env::set_var(CONFIG_DIR_ENV, dir.path());

        let paths = AppPaths::new();
        std::env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.config_dir, dir.path());
        assert_eq!(paths.settings_file, dir.path().join("settings.toml"));
    }
}
