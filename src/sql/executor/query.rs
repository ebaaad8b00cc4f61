use crate::{
    error::Result,
    sql::{
        executor::{ColumnInfo, Executor, ResultSet, RowSet, filter::filter},
        parser::ast::Condition,
        schema::Catalog,
    },
};

/// Table scan executor (SELECT)
pub struct Scan {
    table_name: String,
    columns: Option<Vec<String>>,
    condition: Option<Condition>,
}

impl Scan {
    pub fn new(
        table_name: String,
        columns: Option<Vec<String>>,
        condition: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self { table_name, columns, condition })
    }
}

impl Executor for Scan {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let table = catalog.must_get_table(&self.table_name)?;

        // `*` expands to schema order
        let projection = match &self.columns {
            Some(names) => names
                .iter()
                .map(|name| table.must_col_index(name))
                .collect::<Result<Vec<_>>>()?,
            None => (0..table.columns.len()).collect(),
        };

        let rows = table
            .rows
            .iter()
            .filter(|row| filter(row, table, self.condition.as_ref()))
            .map(|row| {
                projection
                    .iter()
                    .map(|&i| match &row.values[i] {
                        Some(value) => value.to_string(),
                        None => "NULL".to_string(),
                    })
                    .collect()
            })
            .collect();

        Ok(ResultSet::Scan(RowSet {
            columns: projection
                .iter()
                .map(|&i| ColumnInfo::new(&table.columns[i].name, table.columns[i].datatype))
                .collect(),
            rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{Error, Result},
        sql::{
            executor::{Executor, ResultSet},
            parser::Parser,
            schema::Catalog,
            types::DataType,
        },
    };

    fn run(catalog: &mut Catalog, sql: &str) -> Result<ResultSet> {
        <dyn Executor>::build(Parser::new(sql).parse()?).execute(catalog)
    }

    #[test]
    fn test_scan() -> Result<()> {
        let mut catalog = Catalog::new("test");
        run(&mut catalog, "CREATE TABLE t (id INT, price FLOAT, name TEXT, ok BOOL)")?;
        run(&mut catalog, "INSERT INTO t VALUES (1, 2.50, 'Ann', true)")?;
        run(&mut catalog, "INSERT INTO t VALUES (2, 1e7, NULL, 0)")?;
        run(&mut catalog, "INSERT INTO t VALUES (3, 0.1, 'bob', 1)")?;

        let result = run(&mut catalog, "SELECT * FROM t")?;
        let rows = result.row_set().expect("row set");
        assert_eq!(
            rows.columns.iter().map(|c| c.datatype).collect::<Vec<_>>(),
            vec![DataType::Integer, DataType::Float, DataType::Text, DataType::Boolean]
        );
        assert_eq!(
            rows.rows,
            vec![
                vec!["1", "2.5", "Ann", "true"],
                vec!["2", "1e+07", "NULL", "false"],
                vec!["3", "0.1", "bob", "true"],
            ]
        );
        assert_eq!(result.message(), "3 row(s) returned");

        let result = run(&mut catalog, "select NAME, id from t where name > 'ANN'")?;
        let rows = result.row_set().expect("row set");
        assert_eq!(rows.columns[0].name, "name");
        assert_eq!(rows.rows, vec![vec!["bob", "3"]]);

        let result = run(&mut catalog, "SELECT id FROM t WHERE ghost = 1")?;
        assert_eq!(result.affected_count(), 0);

        assert_eq!(
            run(&mut catalog, "SELECT id, ghost FROM t"),
            Err(Error::Schema("Column 'ghost' not found".into()))
        );
        Ok(())
    }
}
