//! Reads data files: format detection (RON/JSON/TOML), file discovery,
//! deserialization, and the top-level directory loader.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use resonance_conduit::{ConduitConfig, ConfigError};

use crate::conduit_config::load_conduit_config;
use crate::machines::{MachineCatalog, load_machines};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A decimal ratio that is negative, not finite, or too large.
    #[error("{field} = {value} in {file} is not a valid ratio")]
    BadRatio {
        file: PathBuf,
        field: &'static str,
        value: f64,
    },

    /// A resolved configuration failed validation.
    #[error("invalid configuration in {file}: {source}")]
    Invalid {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// A machine template that can never take part in a network.
    #[error("machine '{name}' in {file}: {detail}")]
    BadMachine {
        file: PathBuf,
        name: String,
        detail: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
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

/// Scan a directory for `{base_name}.ron`, `.toml`, or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
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

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so for TOML files the
/// array is read from `toml_key`; RON and JSON hold the list directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

/// Return a `DuplicateName` error if `name` is already in `map`.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Directory loader
// ===========================================================================

/// Everything a data directory defines.
#[derive(Debug, Clone, Default)]
pub struct ResonanceData {
    pub conduit: ConduitConfig,
    pub machines: MachineCatalog,
}

/// Load a data directory. Both files are optional; a missing
/// `conduit` file yields the default configuration.
pub fn load_resonance_data(dir: &Path) -> Result<ResonanceData, DataLoadError> {
    let conduit = match find_data_file(dir, "conduit")? {
        Some(path) => load_conduit_config(&path)?,
        None => {
            tracing::debug!(dir = %dir.display(), "no conduit config, using defaults");
            ConduitConfig::default()
        }
    };
    let machines = match find_data_file(dir, "machines")? {
        Some(path) => load_machines(&path)?,
        None => MachineCatalog::default(),
    };

    tracing::info!(
        dir = %dir.display(),
        machines = machines.len(),
        "resonance data loaded"
    );
    Ok(ResonanceData { conduit, machines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "resonance_loader_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("conduit.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("conduit.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("conduit.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["conduit.yaml", "conduit"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // find_data_file / require_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found() {
        let dir = make_test_dir("find_found");
        fs::write(dir.join("machines.toml"), "").unwrap();

        let result = find_data_file(&dir, "machines").unwrap();
        assert_eq!(result, Some(dir.join("machines.toml")));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "machines").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("conduit.ron"), "()").unwrap();
        fs::write(dir.join("conduit.json"), "{}").unwrap();

        let result = find_data_file(&dir, "conduit");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");

        let err = require_data_file(&dir, "conduit").unwrap_err();
        assert!(matches!(&err, DataLoadError::MissingRequired { file, .. } if file == "conduit"));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_file / deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("deser_parse_err");
        let path = dir.join("conduit.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<crate::schema::ConduitConfigData, _> = deserialize_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_needs_key() {
        let dir = make_test_dir("list_toml_key");
        let path = dir.join("machines.toml");
        fs::write(&path, "[[devices]]\nname = \"x\"\ncapacity = 1\n").unwrap();

        let result: Result<Vec<crate::schema::MachineData>, _> =
            deserialize_list(&path, "machines");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("missing key 'machines'"));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_json() {
        let dir = make_test_dir("list_json");
        let path = dir.join("machines.json");
        fs::write(&path, r#"[{"name": "cell", "capacity": 10}]"#).unwrap();

        let machines: Vec<crate::schema::MachineData> = deserialize_list(&path, "machines").unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].name, "cell");

        cleanup(&dir);
    }

    #[test]
    fn check_duplicate_detects_names() {
        let mut map = HashMap::new();
        assert!(check_duplicate(&map, "cell", Path::new("machines.ron")).is_ok());
        map.insert("cell".to_string(), 1u32);
        assert!(matches!(
            check_duplicate(&map, "cell", Path::new("machines.ron")),
            Err(DataLoadError::DuplicateName { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // load_resonance_data
    // -----------------------------------------------------------------------

    #[test]
    fn empty_dir_loads_defaults() {
        let dir = make_test_dir("load_empty");

        let data = load_resonance_data(&dir).unwrap();
        assert_eq!(data.conduit, ConduitConfig::default());
        assert!(data.machines.is_empty());

        cleanup(&dir);
    }

    #[test]
    fn full_dir_loads_both_files() {
        let dir = make_test_dir("load_full");
        fs::write(dir.join("conduit.toml"), "transfer_rate = 40\n").unwrap();
        fs::write(
            dir.join("machines.ron"),
            r#"[(name: "burner", capacity: 1000, max_extract: 100, role: Some(generator))]"#,
        )
        .unwrap();

        let data = load_resonance_data(&dir).unwrap();
        assert_eq!(data.conduit.base_transfer_rate, 40);
        assert!(data.machines.get("burner").is_some());

        cleanup(&dir);
    }
}
