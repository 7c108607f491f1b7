//! Config file loading: format detection (RON/JSON/TOML), file discovery,
//! deserialization and validation into a [`SimConfig`].

use nectar_core::config::{ConfigError, SimConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name [`load_config_dir`] looks for.
pub const CONFIG_BASE_NAME: &str = "nectar";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a config.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// No config file was found in the given directory.
    #[error("no '{base}' config file found in {dir}")]
    MissingConfig { base: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The file parsed but holds values the simulation cannot run with.
    #[error("invalid config in {file}: {source}")]
    Invalid {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// Serializing a config failed.
    #[error("cannot write {format:?} config: {detail}")]
    Serialize { format: Format, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a config file with the given base name.
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_config_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Loading
// ===========================================================================

/// Deserialize and validate config text in `format`. `origin` only labels
/// errors.
pub fn parse_config(text: &str, format: Format, origin: &Path) -> Result<SimConfig, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };

    let config: SimConfig = match format {
        Format::Ron => ron::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        Format::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        Format::Toml => toml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
    };

    config.validate().map_err(|source| DataLoadError::Invalid {
        file: origin.to_path_buf(),
        source,
    })?;
    Ok(config)
}

/// [`parse_config`] for text that did not come from a file.
pub fn load_config_str(text: &str, format: Format) -> Result<SimConfig, DataLoadError> {
    parse_config(text, format, Path::new("<string>"))
}

/// Read, deserialize and validate a config file. The format comes from the
/// extension; fields the file omits keep their defaults.
pub fn load_config(path: &Path) -> Result<SimConfig, DataLoadError> {
    let format = detect_format(path)?;
    let text = std::fs::read_to_string(path)?;
    let config = parse_config(&text, format, path)?;
    debug!(file = %path.display(), ?format, "loaded config");
    Ok(config)
}

/// Load `nectar.{ron,toml,json}` from `dir`.
pub fn load_config_dir(dir: &Path) -> Result<SimConfig, DataLoadError> {
    let path = find_config_file(dir, CONFIG_BASE_NAME)?.ok_or_else(|| DataLoadError::MissingConfig {
        base: CONFIG_BASE_NAME,
        dir: dir.to_path_buf(),
    })?;
    load_config(&path)
}

// ===========================================================================
// Writing
// ===========================================================================

/// Render a config as text in `format`.
pub fn config_to_string(config: &SimConfig, format: Format) -> Result<String, DataLoadError> {
    let ser_err = |detail: String| DataLoadError::Serialize { format, detail };
    match format {
        Format::Ron => ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())
            .map_err(|e| ser_err(e.to_string())),
        Format::Json => serde_json::to_string_pretty(config).map_err(|e| ser_err(e.to_string())),
        Format::Toml => toml::to_string_pretty(config).map_err(|e| ser_err(e.to_string())),
    }
}

/// Write a config to `path`, choosing the format from the extension.
pub fn save_config(config: &SimConfig, path: &Path) -> Result<(), DataLoadError> {
    let format = detect_format(path)?;
    std::fs::write(path, config_to_string(config, format)?)?;
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
