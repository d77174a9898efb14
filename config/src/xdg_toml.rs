//! Reads the `[env]` table of `<config dir>/<app>/config.toml`.
//!
//! The config dir is `$XDG_CONFIG_HOME` when set, otherwise the platform default
//! (`~/.config` on Linux).

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into())),
    }
}

/// Path of the app's config file, whether or not it exists.
pub fn config_file_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Pairs from the `[env]` table. Missing file or table yields an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_file_path(app_name)?;
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.env)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that point `XDG_CONFIG_HOME` somewhere else.
    pub(crate) static XDG_LOCK: Mutex<()> = Mutex::new(());

    /// Runs `f` with `XDG_CONFIG_HOME` set to `dir`, restoring the old value after.
    pub(crate) fn with_xdg_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let _guard = XDG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", dir);
        let out = f();
        match prev {
            Some(p) => std::env::set_var("XDG_CONFIG_HOME", p),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
        out
    }

    fn write_config(app: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), content).unwrap();
        dir
    }

    #[test]
    fn reads_env_table() {
        let dir = write_config("weft", "[env]\nWEFT_MODEL = \"gemini-2.0-flash\"\n");
        let map = with_xdg_home(dir.path(), || load_env_map("weft")).unwrap();
        assert_eq!(
            map.get("WEFT_MODEL").map(String::as_str),
            Some("gemini-2.0-flash")
        );
    }

    #[test]
    fn missing_file_or_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = with_xdg_home(dir.path(), || load_env_map("weft")).unwrap();
        assert!(map.is_empty());

        let dir = write_config("weft", "[other]\nkey = \"ignored\"\n");
        let map = with_xdg_home(dir.path(), || load_env_map("weft")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = write_config("weft", "not valid toml [[[\n");
        let result = with_xdg_home(dir.path(), || load_env_map("weft"));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }

    #[test]
    fn path_uses_app_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = with_xdg_home(dir.path(), || config_file_path("weft")).unwrap();
        assert_eq!(path, dir.path().join("weft").join("config.toml"));
    }
}
