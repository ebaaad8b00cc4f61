use crate::{
    error::Result,
    sql::schema::Catalog,
    storage::{engine::Storage, snapshot},
};

/// In-memory storage, keeps the encoded snapshot bytes
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: Option<Vec<u8>>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing snapshot bytes
    pub fn with_snapshot(snapshot: Vec<u8>) -> Self {
        Self { snapshot: Some(snapshot), writes: 0 }
    }

    pub fn snapshot(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }

    /// Number of snapshots written so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn load(&mut self) -> Result<Option<Catalog>> {
        match &self.snapshot {
            Some(bytes) => Ok(Some(snapshot::read_snapshot(&mut bytes.as_slice())?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, catalog: &Catalog) -> Result<()> {
        let mut bytes = Vec::new();
        snapshot::write_snapshot(catalog, &mut bytes)?;
        self.snapshot = Some(bytes);
        self.writes += 1;
        Ok(())
    }

    fn default_name(&self) -> String {
        "memory".to_string()
    }
}
