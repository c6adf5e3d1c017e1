use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use starlay_types::HashKey;

use crate::error::StoreError;

/// Hash -> translation table. An empty text marks a hash that was captured
/// but not transcribed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationDatabase {
    entries: BTreeMap<HashKey, String>,
}

impl TranslationDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &str) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    /// Trimmed translation for `hash`, empty when absent or blank
    pub fn lookup(&self, hash: &str) -> &str {
        self.get(hash).map(str::trim).unwrap_or("")
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    /// Returns `true` when `hash` was not present before
    pub fn insert_if_absent(&mut self, hash: HashKey, text: String) -> bool {
        match self.entries.entry(hash) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(text);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn set(&mut self, hash: HashKey, text: String) {
        self.entries.insert(hash, text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HashKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Number of hashes still waiting for a translation
    pub fn untranslated(&self) -> usize {
        self.iter().filter(|(_, text)| text.trim().is_empty()).count()
    }
}

impl<K: Into<HashKey>, V: Into<String>> FromIterator<(K, V)> for TranslationDatabase {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub fn read_database(path: &Path) -> Result<TranslationDatabase, StoreError> {
    let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| StoreError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite `path` with the whole database as pretty JSON
pub fn write_database(path: &Path, database: &TranslationDatabase) -> Result<(), StoreError> {
    let data = serde_json::to_string_pretty(database).map_err(|source| StoreError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Result of a manual capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub text: String,
    pub is_new: bool,
}

/// Persisted translation database plus the archive of unseen captures
#[derive(Debug)]
pub struct TranslationStore {
    path: PathBuf,
    unseen_dir: PathBuf,
    database: TranslationDatabase,
}

impl TranslationStore {
    /// Open the database at `path`. Never fails: a missing file starts
    /// empty, an unreadable or corrupt one starts empty with a warning.
    pub fn open(path: impl Into<PathBuf>, unseen_dir: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let database = match read_database(&path) {
            Ok(database) => {
                tracing::info!(
                    "Loaded {} translations from {} ({} untranslated)",
                    database.len(),
                    path.display(),
                    database.untranslated()
                );
                database
            }
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::info!("No database at {}, starting empty", path.display());
                TranslationDatabase::new()
            }
            Err(e) => {
                tracing::warn!("{e}, starting with an empty database");
                TranslationDatabase::new()
            }
        };

        Self {
            path,
            unseen_dir: unseen_dir.into(),
            database,
        }
    }

    pub fn with_database(
        path: impl Into<PathBuf>,
        unseen_dir: impl Into<PathBuf>,
        database: TranslationDatabase,
    ) -> Self {
        Self {
            path: path.into(),
            unseen_dir: unseen_dir.into(),
            database,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn unseen_dir(&self) -> &Path {
        &self.unseen_dir
    }

    pub fn database(&self) -> &TranslationDatabase {
        &self.database
    }

    pub fn save(&self) -> Result<(), StoreError> {
        write_database(&self.path, &self.database)?;
        tracing::debug!("Saved {} entries to {}", self.database.len(), self.path.display());
        Ok(())
    }

    /// Record `hash` as seen. A new hash is archived as
    /// `<unseen_dir>/<hash>.png`, inserted with an empty text and persisted.
    /// A known hash is left untouched.
    pub fn capture(&mut self, hash: &HashKey, image: &RgbaImage) -> Result<Captured, StoreError> {
        if let Some(text) = self.database.get(hash.as_str()) {
            return Ok(Captured {
                text: text.to_string(),
                is_new: false,
            });
        }

        fs::create_dir_all(&self.unseen_dir).map_err(|source| StoreError::Io {
            path: self.unseen_dir.clone(),
            source,
        })?;
        let archive = self.unseen_dir.join(format!("{hash}.png"));
        image.save(&archive).map_err(|source| StoreError::Archive {
            path: archive.clone(),
            source,
        })?;

        self.database.insert_if_absent(hash.clone(), String::new());
        self.save()?;
        tracing::info!("Captured new hash {hash} -> {}", archive.display());

        Ok(Captured {
            text: String::new(),
            is_new: true,
        })
    }

    /// Overwrite the translation for `hash` and persist
    pub fn set_text(&mut self, hash: &HashKey, text: impl Into<String>) -> Result<(), StoreError> {
        self.database.set(hash.clone(), text.into());
        self.save()
    }
}
