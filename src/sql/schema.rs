use crate::{error::{Error, Result}, sql::types::{DataType, Value}};

/// Maximum number of tables in one database
pub const MAX_TABLES: usize = 64;
/// Maximum number of columns in one table
pub const MAX_COLUMNS: usize = 32;
/// Maximum identifier length in bytes
pub const MAX_NAME_LEN: usize = 63;
/// Maximum stored text length in bytes, longer text is truncated
pub const TEXT_CAPACITY: usize = 255;
/// Initial row capacity of a new table
pub const INITIAL_ROW_CAPACITY: usize = 16;

/// Column schema definition
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    pub nullable: bool,
    /// Informational only, uniqueness is not enforced
    pub primary_key: bool,
}

/// A stored row: one slot per column (`None` is NULL) plus the tombstone flag
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Option<Value>>,
    pub deleted: bool,
}

impl Row {
    /// A live row with every slot NULL
    pub fn empty(width: usize) -> Self {
        Self { values: vec![None; width], deleted: false }
    }
}

/// Table schema plus its rows in append order
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    /// Advanced on every insert but never read back into rows
    pub next_id: u32,
}

impl Table {
    pub fn new(name: String, columns: Vec<Column>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::with_capacity(INITIAL_ROW_CAPACITY),
            next_id: 0,
        }
    }

    /// Validates table schema
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::Schema("No columns defined".into()));
        }
        if self.columns.len() > MAX_COLUMNS {
            return Err(Error::Schema(format!(
                "Table '{}' has {} columns (max {})",
                self.name,
                self.columns.len(),
                MAX_COLUMNS
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
                return Err(Error::Schema(format!("Duplicate column '{}'", column.name)));
            }
        }
        Ok(())
    }

    /// Returns the column index for a given column name (case-insensitive)
    pub fn col_index(&self, col_name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(col_name))
    }

    /// Like `col_index`, but an unknown column is an error
    pub fn must_col_index(&self, col_name: &str) -> Result<usize> {
        self.col_index(col_name)
            .ok_or_else(|| Error::Schema(format!("Column '{}' not found", col_name)))
    }

    /// Appends a row, growing storage by doubling
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        self.rows.try_reserve(1)?;
        self.rows.push(row);
        self.next_id = self.next_id.wrapping_add(1);
        Ok(())
    }

    pub fn live_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| !r.deleted)
    }

    pub fn live_count(&self) -> usize {
        self.live_rows().count()
    }

    /// Drops tombstoned rows, keeping survivors in order. Returns the purged count.
    pub fn compact(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r.deleted);
        before - self.rows.len()
    }
}

/// The whole database: header metadata plus tables in creation order
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub name: String,
    pub created_at: String,
    pub tables: Vec<Table>,
}

impl Catalog {
    /// An empty catalog stamped with the current local time
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            tables: Vec::new(),
        }
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Returns table info, returns error if table doesn't exist
    pub fn must_get_table(&self, name: &str) -> Result<&Table> {
        self.get_table(name).ok_or_else(|| not_found(name))
    }

    pub fn must_get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.get_table_mut(name).ok_or_else(|| not_found(name))
    }

    pub fn create_table(&mut self, table: Table) -> Result<()> {
        if self.tables.len() >= MAX_TABLES {
            return Err(Error::Schema("Max tables reached".into()));
        }
        if self.get_table(&table.name).is_some() {
            return Err(Error::Schema(format!("Table '{}' exists", table.name)));
        }
        table.validate()?;
        self.tables.try_reserve(1)?;
        self.tables.push(table);
        Ok(())
    }

    /// Removes a table and its rows, keeping the order of the others
    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        let pos = self
            .tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| not_found(name))?;
        Ok(self.tables.remove(pos))
    }
}

fn not_found(name: &str) -> Error {
    Error::Schema(format!("Table '{}' not found", name))
}
