use std::{
    fs::File,
    io::{BufReader, ErrorKind},
    path::PathBuf,
};

use crate::{
    error::{LoadError, Result},
    sql::{schema::{Catalog, MAX_NAME_LEN}, types::clip},
    storage::{engine::Storage, snapshot},
};

/// Snapshot file on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct DiskStorage {
    path: PathBuf,
}

impl DiskStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for DiskStorage {
    fn load(&mut self) -> Result<Option<Catalog>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(LoadError::Io(err.to_string()).into()),
        };
        Ok(Some(snapshot::read_snapshot(&mut BufReader::new(file))?))
    }

    fn save(&mut self, catalog: &Catalog) -> Result<()> {
        snapshot::save(catalog, &self.path)
    }

    /// File name without directory and extension
    fn default_name(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        clip(&stem, MAX_NAME_LEN).to_string()
    }
}
