//! Configuration file – reads/writes `~/.scanfuse/config.toml`.

use scanfuse_registration::EngineConfig;
use scanfuse_registration::OVERLAP_THRESHOLD;
use scanfuse_types::ScannerId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration stored in `~/.scanfuse/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Correspondences needed before two scanners count as overlapping.
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: usize,

    /// Compare scanner pairs on all cores.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Scanner whose frame is the global frame; the first report when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_scanner: Option<ScannerId>,
}

fn default_overlap_threshold() -> usize {
    OVERLAP_THRESHOLD
}
fn default_parallel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlap_threshold: default_overlap_threshold(),
            parallel: default_parallel(),
            root_scanner: None,
        }
    }
}

impl Config {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            overlap_threshold: self.overlap_threshold,
            parallel: self.parallel,
            root: self.root_scanner,
        }
    }
}

/// Return the path to `~/.scanfuse/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".scanfuse").join("config.toml")
}

/// Load the config from disk with `SCANFUSE_*` overrides applied.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config from a specific path, without env overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `SCANFUSE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SCANFUSE_OVERLAP_THRESHOLD` | `overlap_threshold` |
/// | `SCANFUSE_PARALLEL` | `parallel` (`true` / `false`) |
/// | `SCANFUSE_ROOT` | `root_scanner` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("SCANFUSE_OVERLAP_THRESHOLD")
        && let Ok(threshold) = v.parse::<usize>()
    {
        cfg.overlap_threshold = threshold;
    }
    if let Ok(v) = std::env::var("SCANFUSE_PARALLEL")
        && let Ok(parallel) = v.parse::<bool>()
    {
        cfg.parallel = parallel;
    }
    if let Ok(v) = std::env::var("SCANFUSE_ROOT")
        && let Ok(root) = v.parse::<ScannerId>()
    {
        cfg.root_scanner = Some(root);
    }
}

/// Save the config to disk, creating `~/.scanfuse/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        assert_eq!(Config::default().engine_config(), EngineConfig::default());
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        assert_eq!(dir_meta.permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config {
            overlap_threshold: 9,
            parallel: false,
            root_scanner: Some(3),
        };
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "parallel = false\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.overlap_threshold, 12);
        assert!(!loaded.parallel);
        assert_eq!(loaded.root_scanner, None);
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "overlap_threshold = \"many\"\n").expect("write");
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"), "{err}");
    }

    #[test]
    fn config_path_points_to_scanfuse_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".scanfuse"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_threshold() {
        // SAFETY: tests run in parallel, but each one owns a distinct variable.
        unsafe { std::env::set_var("SCANFUSE_OVERLAP_THRESHOLD", "6") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.overlap_threshold, 6);

        unsafe { std::env::set_var("SCANFUSE_OVERLAP_THRESHOLD", "lots") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.overlap_threshold, OVERLAP_THRESHOLD);
        unsafe { std::env::remove_var("SCANFUSE_OVERLAP_THRESHOLD") };
    }

    #[test]
    fn apply_env_overrides_parallel() {
        // SAFETY: tests run in parallel, but each one owns a distinct variable.
        unsafe { std::env::set_var("SCANFUSE_PARALLEL", "false") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!(!cfg.parallel);
        unsafe { std::env::remove_var("SCANFUSE_PARALLEL") };
    }

    #[test]
    fn apply_env_overrides_root() {
        // SAFETY: tests run in parallel, but each one owns a distinct variable.
        unsafe { std::env::set_var("SCANFUSE_ROOT", "4") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.root_scanner, Some(4));
        unsafe { std::env::remove_var("SCANFUSE_ROOT") };
    }
}
