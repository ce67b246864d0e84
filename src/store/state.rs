// src/store/state.rs

use crate::domain::ListingSet;
use crate::errors::StateError;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// The last sweep's listings, kept as a single JSON object on disk.
///
/// Every save replaces the whole file, so listings that vanished from the source
/// also vanish from the snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates the parent directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty snapshot. A file that isn't valid JSON is an error.
    pub fn load(&self) -> Result<ListingSet, StateError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ListingSet::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|e| StateError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, listings: &ListingSet) -> Result<(), StateError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, listings).map_err(std::io::Error::from)?;
        writer.flush()?;
        Ok(())
    }
}
