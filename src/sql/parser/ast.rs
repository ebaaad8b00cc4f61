use crate::sql::types::DataType;

/// Parsed statement intent, one variant per command
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// Blank input
    Empty,
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// DROP TABLE statement
    DropTable {
        name: String,
    },
    /// INSERT statement, `columns: None` means schema order
    Insert {
        table_name: String,
        columns: Option<Vec<String>>,
        values: Vec<Literal>,
    },
    /// SELECT statement, `columns: None` means `*`
    Select {
        table_name: String,
        columns: Option<Vec<String>>,
        condition: Option<Condition>,
    },
    /// UPDATE statement
    Update {
        table_name: String,
        assignments: Vec<(String, Literal)>,
        condition: Option<Condition>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        condition: Option<Condition>,
    },
    ShowTables,
    Describe {
        table_name: String,
    },
    Vacuum,
}

impl Statement {
    /// Whether executing the statement must be followed by a snapshot write
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Statement::CreateTable { .. }
                | Statement::DropTable { .. }
                | Statement::Insert { .. }
                | Statement::Update { .. }
                | Statement::Delete { .. }
                | Statement::Vacuum
        )
    }
}

/// Column definition for CREATE TABLE statements
#[derive(Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    pub nullable: bool,
    pub primary_key: bool,
}

/// A value as written in the statement, coerced later to the column type
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Raw(String),
}

/// A single-predicate WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    IsNull(String),
    IsNotNull(String),
    Compare {
        column: String,
        op: Operator,
        value: String,
    },
}

/// Comparison operators, `<>` is parsed as `NotEqual`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Operator {
    /// Scan order matters: two-character operators come before their prefixes
    pub const SCAN_ORDER: [(&'static str, Operator); 7] = [
        ("<=", Operator::LessEqual),
        (">=", Operator::GreaterEqual),
        ("!=", Operator::NotEqual),
        ("<>", Operator::NotEqual),
        ("=", Operator::Equal),
        ("<", Operator::Less),
        (">", Operator::Greater),
    ];
}
