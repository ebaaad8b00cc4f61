use crate::{error::Result, sql::schema::Catalog};

/// Where a database's snapshot lives
///
/// Every save replaces the whole snapshot; there is no incremental mode.
pub trait Storage {
    /// Reads the stored snapshot, `None` if nothing has been stored yet
    fn load(&mut self) -> Result<Option<Catalog>>;

    /// Replaces the stored snapshot with `catalog`
    fn save(&mut self, catalog: &Catalog) -> Result<()>;

    /// Display name for a database created from scratch
    fn default_name(&self) -> String;
}
