use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    error::{Error, LoadError, Result},
    sql::{
        executor::{ColumnInfo, Executor, ResultSet, RowSet},
        parser::Parser,
        schema::Catalog,
    },
    storage::{DiskStorage, Storage},
};

/// A database: the in-memory catalog plus the storage its snapshot goes to.
///
/// Owned by a single caller; statements run one at a time to completion.
pub struct Database<S: Storage = DiskStorage> {
    catalog: Catalog,
    storage: S,
}

impl Database<DiskStorage> {
    /// Opens the snapshot at `path`, or starts an empty database if there is
    /// none yet. The file only appears after the first mutating statement.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_storage(DiskStorage::new(path.as_ref()))
    }
}

impl<S: Storage> Database<S> {
    pub fn with_storage(mut storage: S) -> Result<Self> {
        let catalog = match storage.load() {
            Ok(Some(catalog)) => {
                info!(name = %catalog.name, tables = catalog.tables.len(), "opened database");
                catalog
            }
            Ok(None) => {
                info!("creating new database");
                Catalog::new(&storage.default_name())
            }
            Err(Error::Load(LoadError::Truncated)) => {
                warn!("snapshot header unreadable, starting with an empty database");
                Catalog::new(&storage.default_name())
            }
            Err(err) => return Err(err),
        };
        Ok(Self { catalog, storage })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Executes one statement.
    ///
    /// Mutating statements write a full snapshot before returning. If the
    /// statement or the write fails the catalog is left as it was before.
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        let stmt = Parser::new(sql).parse()?;
        debug!(?stmt, "execute");

        if !stmt.is_mutation() {
            return <dyn Executor>::build(stmt).execute(&mut self.catalog);
        }

        let backup = self.catalog.clone();
        let result = match <dyn Executor>::build(stmt).execute(&mut self.catalog) {
            Ok(result) => self.storage.save(&self.catalog).map(|_| result),
            Err(err) => Err(err),
        };
        if result.is_err() {
            self.catalog = backup;
        }
        result
    }

    /// Writes the current state, e.g. on shutdown
    pub fn save(&mut self) -> Result<()> {
        self.storage.save(&self.catalog)
    }
}

/// Executes a statement, folding any error into a failed result
pub fn execute<S: Storage>(db: &mut Database<S>, sql: &str) -> StatementResult {
    StatementResult(db.execute(sql))
}

/// Uniform outcome of one statement: success with a count or row set, or failure
#[derive(Debug, Clone, PartialEq)]
pub struct StatementResult(Result<ResultSet>);

impl StatementResult {
    pub fn is_success(&self) -> bool {
        self.0.is_ok()
    }

    /// Summary on success, error text on failure
    pub fn message(&self) -> String {
        match &self.0 {
            Ok(result) => result.message(),
            Err(err) => err.to_string(),
        }
    }

    pub fn affected_count(&self) -> usize {
        self.0.as_ref().map_or(0, ResultSet::affected_count)
    }

    /// Present only for row-set results
    pub fn columns(&self) -> Option<&[ColumnInfo]> {
        self.row_set().map(|rows| rows.columns.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.row_set().map_or(0, |rows| rows.rows.len())
    }

    /// Cell text, empty when there is no such cell
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.row_set().map_or("", |rows| rows.cell(row, col))
    }

    pub fn error(&self) -> Option<&Error> {
        self.0.as_ref().err()
    }

    fn row_set(&self) -> Option<&RowSet> {
        self.0.as_ref().ok().and_then(ResultSet::row_set)
    }
}
