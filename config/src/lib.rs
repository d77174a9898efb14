//! Configuration for the Weft binaries.
//!
//! [`load_and_apply`] fills the process environment from the project `.env` and the
//! XDG `config.toml` with priority **existing env > .env > XDG**; [`ModelSettings`]
//! then reads the model endpoint settings from the environment.

mod dotenv_file;
mod settings;
mod xdg_toml;

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

pub use settings::{
    ConfigError, ModelSettings, DEFAULT_API_BASE, DEFAULT_MAX_RETRIES, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
pub use xdg_toml::config_file_path;

/// Problems reading `.env` or `config.toml`.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(String),
}

/// Sets every key found in `.env` or `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]`
/// that is not already in the process environment. `.env` wins over XDG.
///
/// * `override_dir`: directory holding `.env` (default: current directory).
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv_file::load_env_map(override_dir)?;

    let keys: HashSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(value) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdg_toml::tests::with_xdg_home;
    use std::env;

    fn xdg_with(app: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), content).unwrap();
        dir
    }

    fn dotenv_with(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), content).unwrap();
        dir
    }

    #[test]
    fn existing_env_wins() {
        let dotenv = dotenv_with("WEFT_CFG_TEST_EXISTING=from_dotenv\n");
        env::set_var("WEFT_CFG_TEST_EXISTING", "from_env");
        load_and_apply("weft-config-nonexistent-app", Some(dotenv.path())).unwrap();
        assert_eq!(
            env::var("WEFT_CFG_TEST_EXISTING").as_deref(),
            Ok("from_env")
        );
        env::remove_var("WEFT_CFG_TEST_EXISTING");
    }

    #[test]
    fn dotenv_overrides_xdg() {
        let xdg = xdg_with("weft", "[env]\nWEFT_CFG_TEST_PRIORITY = \"from_xdg\"\n");
        let dotenv = dotenv_with("WEFT_CFG_TEST_PRIORITY=from_dotenv\n");
        env::remove_var("WEFT_CFG_TEST_PRIORITY");

        with_xdg_home(xdg.path(), || load_and_apply("weft", Some(dotenv.path()))).unwrap();
        let val = env::var("WEFT_CFG_TEST_PRIORITY").unwrap();
        env::remove_var("WEFT_CFG_TEST_PRIORITY");
        assert_eq!(val, "from_dotenv");
    }

    #[test]
    fn xdg_applied_when_no_dotenv() {
        let xdg = xdg_with("weft", "[env]\nWEFT_CFG_TEST_XDG_ONLY = \"from_xdg\"\n");
        let empty = tempfile::tempdir().unwrap();
        env::remove_var("WEFT_CFG_TEST_XDG_ONLY");

        with_xdg_home(xdg.path(), || load_and_apply("weft", Some(empty.path()))).unwrap();
        let val = env::var("WEFT_CFG_TEST_XDG_ONLY").unwrap();
        env::remove_var("WEFT_CFG_TEST_XDG_ONLY");
        assert_eq!(val, "from_xdg");
    }

    #[test]
    fn nothing_to_load_is_ok() {
        let empty = tempfile::tempdir().unwrap();
        with_xdg_home(empty.path(), || load_and_apply("weft", Some(empty.path()))).unwrap();
    }

    #[test]
    fn invalid_xdg_toml_fails() {
        let xdg = xdg_with("weft", "invalid [[[\n");
        let empty = tempfile::tempdir().unwrap();
        let result = with_xdg_home(xdg.path(), || load_and_apply("weft", Some(empty.path())));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
