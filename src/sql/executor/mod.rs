use crate::{
    error::Result,
    sql::{
        executor::{
            mutation::{Delete, Insert, Update, Vacuum},
            query::Scan,
            schema::{CreateTable, Describe, DropTable, ShowTables},
        },
        parser::ast::Statement,
        schema::Catalog,
        types::DataType,
    },
};

mod filter;
mod mutation;
mod query;
mod schema;

/// Statement executor trait
pub trait Executor {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet>;
}

/// Builds an executor from a parsed statement
impl dyn Executor {
    pub fn build(stmt: Statement) -> Box<dyn Executor> {
        match stmt {
            Statement::Empty => Box::new(Nothing),
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::DropTable { name } => DropTable::new(name),
            Statement::Insert { table_name, columns, values } => {
                Insert::new(table_name, columns, values)
            }
            Statement::Select { table_name, columns, condition } => {
                Scan::new(table_name, columns, condition)
            }
            Statement::Update { table_name, assignments, condition } => {
                Update::new(table_name, assignments, condition)
            }
            Statement::Delete { table_name, condition } => Delete::new(table_name, condition),
            Statement::ShowTables => Box::new(ShowTables),
            Statement::Describe { table_name } => Describe::new(table_name),
            Statement::Vacuum => Box::new(Vacuum),
        }
    }
}

/// Blank input
struct Nothing;

impl Executor for Nothing {
    fn execute(self: Box<Self>, _catalog: &mut Catalog) -> Result<ResultSet> {
        Ok(ResultSet::Empty)
    }
}

/// Result column descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub datatype: DataType,
}

impl ColumnInfo {
    pub fn new(name: &str, datatype: DataType) -> Self {
        Self { name: name.to_string(), datatype }
    }
}

/// Column descriptors plus the stringified cell grid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSet {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<String>>,
}

impl RowSet {
    /// Cell text, empty when out of range
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }
}

/// Execution result set
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    Empty,
    CreateTable { table_name: String, columns: usize },
    DropTable { table_name: String },
    Insert,
    Scan(RowSet),
    Update { count: usize },
    Delete { count: usize },
    ShowTables(RowSet),
    Describe { table_name: String, rows: RowSet },
    Vacuum { purged: usize },
}

impl ResultSet {
    /// Human-readable summary line
    pub fn message(&self) -> String {
        match self {
            ResultSet::Empty => "Empty".to_string(),
            ResultSet::CreateTable { table_name, columns } => {
                format!("Table '{}' created ({} cols)", table_name, columns)
            }
            ResultSet::DropTable { table_name } => format!("Table '{}' dropped", table_name),
            ResultSet::Insert => "1 row inserted".to_string(),
            ResultSet::Scan(rows) => format!("{} row(s) returned", rows.rows.len()),
            ResultSet::Update { count } => format!("{} row(s) updated", count),
            ResultSet::Delete { count } => format!("{} row(s) deleted", count),
            ResultSet::ShowTables(rows) => format!("{} table(s)", rows.rows.len()),
            ResultSet::Describe { table_name, rows } => {
                format!("Table '{}': {} column(s)", table_name, rows.rows.len())
            }
            ResultSet::Vacuum { purged } => format!("VACUUM: purged {} row(s)", purged),
        }
    }

    /// Rows affected, returned or purged
    pub fn affected_count(&self) -> usize {
        match self {
            ResultSet::Empty
            | ResultSet::CreateTable { .. }
            | ResultSet::DropTable { .. }
            | ResultSet::Describe { .. } => 0,
            ResultSet::Insert => 1,
            ResultSet::Update { count } | ResultSet::Delete { count } => *count,
            ResultSet::Scan(rows) | ResultSet::ShowTables(rows) => rows.rows.len(),
            ResultSet::Vacuum { purged } => *purged,
        }
    }

    /// The row set, for statements that produce one
    pub fn row_set(&self) -> Option<&RowSet> {
        match self {
            ResultSet::Scan(rows)
            | ResultSet::ShowTables(rows)
            | ResultSet::Describe { rows, .. } => Some(rows),
            _ => None,
        }
    }
}
