use crate::{
    error::Result,
    sql::{
        executor::{ColumnInfo, Executor, ResultSet, RowSet},
        parser::ast,
        schema::{Catalog, Column, Table},
        types::DataType,
    },
};

/// CREATE TABLE executor
pub struct CreateTable {
    name: String,
    columns: Vec<ast::Column>,
}

impl CreateTable {
    pub fn new(name: String, columns: Vec<ast::Column>) -> Box<Self> {
        Box::new(Self { name, columns })
    }
}

impl Executor for CreateTable {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let columns = self
            .columns
            .into_iter()
            .map(|c| Column {
                name: c.name,
                datatype: c.datatype,
                nullable: c.nullable,
                primary_key: c.primary_key,
            })
            .collect::<Vec<_>>();
        let count = columns.len();
        catalog.create_table(Table::new(self.name.clone(), columns))?;
        Ok(ResultSet::CreateTable { table_name: self.name, columns: count })
    }
}

/// DROP TABLE executor
pub struct DropTable {
    name: String,
}

impl DropTable {
    pub fn new(name: String) -> Box<Self> {
        Box::new(Self { name })
    }
}

impl Executor for DropTable {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        catalog.drop_table(&self.name)?;
        Ok(ResultSet::DropTable { table_name: self.name })
    }
}

/// SHOW TABLES executor
pub struct ShowTables;

impl Executor for ShowTables {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let rows = catalog
            .tables
            .iter()
            .map(|t| vec![t.name.clone(), t.columns.len().to_string(), t.live_count().to_string()])
            .collect();
        Ok(ResultSet::ShowTables(RowSet {
            columns: vec![
                ColumnInfo::new("Table", DataType::Text),
                ColumnInfo::new("Columns", DataType::Integer),
                ColumnInfo::new("Rows", DataType::Integer),
            ],
            rows,
        }))
    }
}

/// DESCRIBE / DESC executor
pub struct Describe {
    table_name: String,
}

impl Describe {
    pub fn new(table_name: String) -> Box<Self> {
        Box::new(Self { table_name })
    }
}

impl Executor for Describe {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let table = catalog.must_get_table(&self.table_name)?;
        let yes_no = |flag: bool| if flag { "YES" } else { "NO" }.to_string();
        let rows = table
            .columns
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.datatype.name().to_string(),
                    yes_no(c.nullable),
                    yes_no(c.primary_key),
                ]
            })
            .collect();
        Ok(ResultSet::Describe {
            table_name: table.name.clone(),
            rows: RowSet {
                columns: ["Column", "Type", "Nullable", "PK"]
                    .into_iter()
                    .map(|name| ColumnInfo::new(name, DataType::Text))
                    .collect(),
                rows,
            },
        })
    }
}
