//! Destination profiles loaded from layered TOML files.
//!
//! Files use INI-style sections: a `[DEFAULT]` section naming the default
//! destination and holding fallback keys, plus one section per destination.
//! Layers are merged key by key; later layers win.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::DropError;
use crate::naming::HashAlgorithm;

/// Section holding the default destination and keys inherited by every profile.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// System-wide config, lowest precedence.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/drop.toml";

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_HASH_LENGTH: usize = 8;
const MAX_FILE_MODE: u32 = 0o7777;

/// A named upload target. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationProfile {
    pub name: String,
    /// scp host spec, e.g. `user@example.org`.
    pub remote_server: String,
    /// Directory on the remote host that is served over HTTP.
    pub remote_dir: String,
    /// Public URL prefix; the remote file name is appended verbatim.
    pub url_prefix: String,
    /// Permission bits applied to the staged file (carried over by `scp -p`).
    pub file_mode: u32,
    pub hash_length: usize,
    pub hash_algorithm: HashAlgorithm,
}

impl DestinationProfile {
    /// Public URL under which `remote_name` is served.
    pub fn public_url(&self, remote_name: &str) -> String {
        format!("{}{}", self.url_prefix, remote_name)
    }
}

/// Fully merged and validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropConfig {
    pub default_destination: Option<String>,
    pub profiles: BTreeMap<String, DestinationProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawMode {
    Bits(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    destination: Option<String>,
    remoteserver: Option<String>,
    remotedir: Option<String>,
    url: Option<String>,
    chmod: Option<RawMode>,
    hashlength: Option<i64>,
    hashalgorithm: Option<HashAlgorithm>,
}

/// Accumulates config files; sections from later files override earlier keys.
#[derive(Debug, Default)]
pub struct ConfigLayers {
    sections: BTreeMap<String, toml::Table>,
}

impl ConfigLayers {
    /// Merge one TOML document. `origin` is only used in error messages.
    pub fn merge_str(&mut self, text: &str, origin: &Path) -> Result<(), DropError> {
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| DropError::config(format!("{}: {}", origin.display(), e)))?;
        for (name, value) in table {
            let toml::Value::Table(keys) = value else {
                return Err(DropError::config(format!(
                    "{}: top-level key '{}' must be inside a [section]",
                    origin.display(),
                    name
                )));
            };
            self.sections.entry(name).or_default().extend(keys);
        }
        Ok(())
    }

    /// Read and merge a config file. A missing file is an error here; callers
    /// probing optional locations check existence first.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), DropError> {
        let text = fs::read_to_string(path)
            .map_err(|e| DropError::config(format!("cannot read {}: {}", path.display(), e)))?;
        self.merge_str(&text, path)?;
        tracing::debug!("merged config layer {}", path.display());
        Ok(())
    }

    /// Validate merged sections into profiles, applying `[DEFAULT]` fallbacks.
    pub fn build(self) -> Result<DropConfig, DropError> {
        let mut raw: BTreeMap<String, RawSection> = BTreeMap::new();
        for (name, keys) in self.sections {
            let section: RawSection = toml::Value::Table(keys)
                .try_into()
                .map_err(|e| DropError::config(format!("section [{}]: {}", name, e)))?;
            raw.insert(name, section);
        }

        let defaults = raw.remove(DEFAULT_SECTION).unwrap_or_default();
        let mut profiles = BTreeMap::new();
        for (name, section) in raw {
            if section.destination.is_some() {
                tracing::warn!(
                    "ignoring 'destination' in [{}]; it is only meaningful in [{}]",
                    name,
                    DEFAULT_SECTION
                );
            }
            let profile = build_profile(&name, &section, &defaults)?;
            profiles.insert(name, profile);
        }

        Ok(DropConfig {
            default_destination: defaults.destination.filter(|d| !d.trim().is_empty()),
            profiles,
        })
    }
}

fn build_profile(
    name: &str,
    section: &RawSection,
    defaults: &RawSection,
) -> Result<DestinationProfile, DropError> {
    let required = |value: &Option<String>, fallback: &Option<String>, key: &str| {
        value
            .as_ref()
            .or(fallback.as_ref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DropError::config(format!("[{}] is missing '{}'", name, key)))
    };

    let remote_server = required(&section.remoteserver, &defaults.remoteserver, "remoteserver")?;
    let remote_dir = required(&section.remotedir, &defaults.remotedir, "remotedir")?;
    let url_prefix = required(&section.url, &defaults.url, "url")?;
    if !url_prefix.ends_with('/') {
        tracing::warn!(
            "[{}] url '{}' does not end with '/'; file names are appended verbatim",
            name,
            url_prefix
        );
    }

    let file_mode = match section.chmod.as_ref().or(defaults.chmod.as_ref()) {
        Some(raw) => parse_mode(raw).map_err(|msg| DropError::config(format!("[{}] {}", name, msg)))?,
        None => DEFAULT_FILE_MODE,
    };

    let hash_algorithm = section
        .hashalgorithm
        .or(defaults.hashalgorithm)
        .unwrap_or_default();

    let hash_length = match section.hashlength.or(defaults.hashlength) {
        Some(n) => {
            let max = hash_algorithm.encoded_len();
            usize::try_from(n)
                .ok()
                .filter(|&len| (1..=max).contains(&len))
                .ok_or_else(|| {
                    DropError::config(format!(
                        "[{}] hashlength {} must be between 1 and {} for {}",
                        name, n, max, hash_algorithm
                    ))
                })?
        }
        None => DEFAULT_HASH_LENGTH,
    };

    Ok(DestinationProfile {
        name: name.to_string(),
        remote_server,
        remote_dir,
        url_prefix,
        file_mode,
        hash_length,
        hash_algorithm,
    })
}

/// Strings are octal (`"0644"`, `"0o644"`, `"644"`); integers are taken as-is,
/// so TOML `0o644` works.
fn parse_mode(raw: &RawMode) -> Result<u32, String> {
    let bits = match raw {
        RawMode::Bits(n) => u32::try_from(*n).map_err(|_| format!("chmod {} is out of range", n))?,
        RawMode::Text(s) => {
            let t = s.trim();
            let digits = t
                .strip_prefix("0o")
                .or_else(|| t.strip_prefix("0O"))
                .unwrap_or(t);
            u32::from_str_radix(digits, 8)
                .map_err(|_| format!("chmod '{}' is not an octal mode", s))?
        }
    };
    if bits > MAX_FILE_MODE {
        return Err(format!("chmod {:o} exceeds {:o}", bits, MAX_FILE_MODE));
    }
    Ok(bits)
}

/// Per-user config file: `$XDG_CONFIG_HOME/drop/config.toml`.
pub fn user_config_path() -> Result<PathBuf, DropError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("drop")
        .map_err(|e| DropError::config(format!("cannot locate config directory: {}", e)))?;
    Ok(xdg_dirs.get_config_file("config.toml"))
}

/// Discovered config locations, lowest precedence first.
pub fn discovered_paths() -> Result<Vec<PathBuf>, DropError> {
    Ok(vec![PathBuf::from(SYSTEM_CONFIG_PATH), user_config_path()?])
}

/// Load discovered layers plus an optional explicit file (highest precedence).
pub fn load(explicit: Option<&Path>) -> Result<DropConfig, DropError> {
    load_from(&discovered_paths()?, explicit)
}

/// Like [`load`] with caller-supplied discovery paths. Discovered paths that do
/// not exist are skipped; `explicit` must exist.
pub fn load_from(discovered: &[PathBuf], explicit: Option<&Path>) -> Result<DropConfig, DropError> {
    let mut layers = ConfigLayers::default();
    for path in discovered {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => layers.merge_file(path)?,
            Ok(_) => tracing::debug!("skipping non-file config path {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DropError::config(format!(
                    "cannot access {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }
    if let Some(path) = explicit {
        layers.merge_file(path)?;
    }

    let cfg = layers.build()?;
    if cfg.profiles.is_empty() {
        let hint = discovered
            .last()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| SYSTEM_CONFIG_PATH.to_string());
        return Err(DropError::config(format!(
            "no destinations configured; add a destination section to {}",
            hint
        )));
    }
    Ok(cfg)
}
