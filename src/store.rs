//! The persisted profile store.
//!
//! Owns the on-disk JSON schema of `Profile.ini`: a single document holding
//! the settings and the profile collection, rewritten in full on every
//! mutation. Field names and the 4-space indentation are fixed by the
//! legacy format and must round-trip exactly against pre-existing files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};
use crate::paths::{DESCRIPTOR_FILE_NAME, MODS_DIR_NAME};

/// Process-wide configuration, replaceable via the setup wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory the game reads its active mods from.
    #[serde(rename = "exec_mods_folder_path")]
    pub live_mods_dir: PathBuf,
    /// Directory profile subdirectories are created under.
    #[serde(rename = "mods_storage_path")]
    pub storage_dir: PathBuf,
}

impl Settings {
    /// Blank paths are accepted at load time; path operations must not
    /// run until both are set.
    pub fn is_configured(&self) -> bool {
        !self.live_mods_dir.as_os_str().is_empty() && !self.storage_dir.as_os_str().is_empty()
    }
}

/// A named snapshot location for a set of mods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// `<storage root>/<name>`, holding a `Mods/` tree and a descriptor copy.
    #[serde(rename = "access_path")]
    pub storage_path: PathBuf,
}

impl Profile {
    pub fn mods_dir(&self) -> PathBuf {
        self.storage_path.join(MODS_DIR_NAME)
    }

    pub fn descriptor_file(&self) -> PathBuf {
        self.storage_path.join(DESCRIPTOR_FILE_NAME)
    }
}

/// The whole backing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "Settings")]
    pub settings: Settings,
    #[serde(rename = "Profiles")]
    pub profiles: Vec<Profile>,
}

/// Serialize-only view so `save` can take borrowed parts.
#[derive(Serialize)]
struct DocumentRef<'a> {
    #[serde(rename = "Settings")]
    settings: &'a Settings,
    #[serde(rename = "Profiles")]
    profiles: &'a [Profile],
}

/// The legacy format indents with four spaces.
const INDENT: &[u8] = b"    ";

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing file. `Ok(None)` when it does not exist yet, which
    /// callers handle by running first-time setup.
    pub fn load(&self) -> Result<Option<Document>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let document = serde_json::from_str(&raw).map_err(|source| Error::MalformedDocument {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(document))
    }

    /// Overwrite the backing file with the full document.
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// target, so a crash mid-write cannot leave a truncated store behind.
    pub fn save(&self, settings: &Settings, profiles: &[Profile]) -> Result<()> {
        let document = DocumentRef { settings, profiles };
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        document
            .serialize(&mut serializer)
            .map_err(|err| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("ini.tmp");
        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Move a corrupt backing file aside so a later save cannot clobber it.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let stem = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("store");
        let backup_name = format!("{}.{}.bak", stem, Utc::now().format("%Y%m%d_%H%M%S"));
        let backup = self.path.with_file_name(backup_name);
        fs::rename(&self.path, &backup)?;
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_document() -> Document {
        Document {
            settings: Settings {
                live_mods_dir: PathBuf::from("/game/Mods"),
                storage_dir: PathBuf::from("/profiles"),
            },
            profiles: vec![
                Profile {
                    name: "Honour".to_string(),
                    storage_path: PathBuf::from("/profiles/Honour"),
                },
                Profile {
                    name: "Tactician".to_string(),
                    storage_path: PathBuf::from("/profiles/Tactician"),
                },
            ],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = Store::new(temp.path().join("Profile.ini"));
        let document = sample_document();

        store.save(&document.settings, &document.profiles).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let store = Store::new(temp.path().join("Profile.ini"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Profile.ini");
        let store = Store::new(&path);

        fs::write(&path, "not json at all").unwrap();
        assert!(matches!(store.load(), Err(Error::MalformedDocument { .. })));

        // Valid JSON with the required holders absent is just as malformed.
        fs::write(&path, "{}").unwrap();
        assert!(matches!(store.load(), Err(Error::MalformedDocument { .. })));
    }

    #[test]
    fn writes_the_legacy_wire_format() {
        let temp = TempDir::new().unwrap();
        let store = Store::new(temp.path().join("Profile.ini"));
        let document = sample_document();
        store.save(&document.settings, &document.profiles).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        for field in [
            "\"Settings\"",
            "\"Profiles\"",
            "\"exec_mods_folder_path\"",
            "\"mods_storage_path\"",
            "\"name\"",
            "\"access_path\"",
        ] {
            assert!(raw.contains(field), "missing {field} in:\n{raw}");
        }
        // Top-level keys sit behind exactly four spaces.
        assert!(raw.contains("\n    \"Settings\"") || raw.contains("\n    \"Profiles\""));
    }

    #[test]
    fn parses_a_legacy_document_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Profile.ini");
        let raw = r#"{
    "Profiles": [
        {
            "access_path": "C:\\Profiles\\Tactician",
            "name": "Tactician"
        }
    ],
    "Settings": {
        "exec_mods_folder_path": "C:\\Games\\Baldur's Gate 3\\Mods",
        "mods_storage_path": "C:\\Profiles"
    }
}"#;
        fs::write(&path, raw).unwrap();

        let document = Store::new(&path).load().unwrap().unwrap();
        assert_eq!(document.profiles.len(), 1);
        assert_eq!(document.profiles[0].name, "Tactician");
        assert_eq!(
            document.settings.storage_dir,
            PathBuf::from("C:\\Profiles")
        );
    }

    #[test]
    fn quarantine_moves_the_file_aside() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Profile.ini");
        let store = Store::new(&path);
        fs::write(&path, "garbage").unwrap();

        let backup = store.quarantine().unwrap();
        assert!(!path.exists());
        assert!(backup.exists());
        assert!(backup.to_string_lossy().ends_with(".bak"));
    }
}
