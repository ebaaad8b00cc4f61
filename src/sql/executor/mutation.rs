use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Executor, ResultSet, filter::filter},
        parser::ast::{Condition, Literal},
        schema::{Catalog, Row, Table},
        types::Value,
    },
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    columns: Option<Vec<String>>,
    values: Vec<Literal>,
}

impl Insert {
    pub fn new(table_name: String, columns: Option<Vec<String>>, values: Vec<Literal>) -> Box<Self> {
        Box::new(Self { table_name, columns, values })
    }
}

// Column alignment
// tbl: a INT, b TEXT, c BOOL
// insert into tbl (c, a) values (true, 1);
//    a       b       c
//    1      NULL    true
fn make_row(table: &Table, columns: Option<&[String]>, values: &[Literal]) -> Result<Row> {
    let positions = match columns {
        Some(columns) => columns
            .iter()
            .map(|name| table.must_col_index(name))
            .collect::<Result<Vec<_>>>()?,
        None => (0..table.columns.len()).collect(),
    };
    if positions.len() != values.len() {
        return Err(Error::Parse(format!(
            "{} column(s) but {} value(s)",
            positions.len(),
            values.len()
        )));
    }

    let mut row = Row::empty(table.columns.len());
    for (pos, literal) in positions.into_iter().zip(values) {
        row.values[pos] = coerce(literal, table, pos);
    }
    Ok(row)
}

fn coerce(literal: &Literal, table: &Table, pos: usize) -> Option<Value> {
    match literal {
        Literal::Null => None,
        Literal::Raw(text) => Some(Value::coerce(text, table.columns[pos].datatype)),
    }
}

/// Positions of live rows passing the condition, in storage order
fn matching_rows(table: &Table, condition: Option<&Condition>) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filter(row, table, condition))
        .map(|(i, _)| i)
        .collect()
}

impl Executor for Insert {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;
        let row = make_row(table, self.columns.as_deref(), &self.values)?;
        debug!(table = %table.name, row = ?row.values, "insert row");
        table.push_row(row)?;
        Ok(ResultSet::Insert)
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    assignments: Vec<(String, Literal)>,
    condition: Option<Condition>,
}

impl Update {
    pub fn new(
        table_name: String,
        assignments: Vec<(String, Literal)>,
        condition: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self { table_name, assignments, condition })
    }
}

impl Executor for Update {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;

        // Unknown target columns are skipped
        let assignments = self
            .assignments
            .iter()
            .filter_map(|(name, literal)| {
                let pos = table.col_index(name)?;
                Some((pos, coerce(literal, table, pos)))
            })
            .collect::<Vec<_>>();

        let hits = matching_rows(table, self.condition.as_ref());
        for &i in &hits {
            for (pos, value) in &assignments {
                table.rows[i].values[*pos] = value.clone();
            }
        }
        Ok(ResultSet::Update { count: hits.len() })
    }
}

/// DELETE executor, tombstones rows in place
pub struct Delete {
    table_name: String,
    condition: Option<Condition>,
}

impl Delete {
    pub fn new(table_name: String, condition: Option<Condition>) -> Box<Self> {
        Box::new(Self { table_name, condition })
    }
}

impl Executor for Delete {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;
        let hits = matching_rows(table, self.condition.as_ref());
        for &i in &hits {
            table.rows[i].deleted = true;
        }
        Ok(ResultSet::Delete { count: hits.len() })
    }
}

/// VACUUM executor, drops tombstoned rows from every table
pub struct Vacuum;

impl Executor for Vacuum {
    fn execute(self: Box<Self>, catalog: &mut Catalog) -> Result<ResultSet> {
        let purged = catalog.tables.iter_mut().map(Table::compact).sum();
        Ok(ResultSet::Vacuum { purged })
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
            types::Value,
        },
    };

    fn run(catalog: &mut Catalog, sql: &str) -> Result<ResultSet> {
        <dyn Executor>::build(Parser::new(sql).parse()?).execute(catalog)
    }

    fn setup() -> Result<Catalog> {
        let mut catalog = Catalog::new("test");
        run(&mut catalog, "CREATE TABLE t (id INT, name TEXT, ok BOOL)")?;
        Ok(catalog)
    }

    #[test]
    fn test_insert_aligns_columns() -> Result<()> {
        let mut catalog = setup()?;
        assert_eq!(
            run(&mut catalog, "INSERT INTO t (ok, id) VALUES (1, 7)")?,
            ResultSet::Insert
        );
        let table = catalog.must_get_table("t")?;
        assert_eq!(
            table.rows[0].values,
            vec![Some(Value::Integer(7)), None, Some(Value::Boolean(true))]
        );
        assert_eq!(table.next_id, 1);
        Ok(())
    }

    #[test]
    fn test_insert_errors_leave_table_untouched() -> Result<()> {
        let mut catalog = setup()?;
        assert_eq!(
            run(&mut catalog, "INSERT INTO t (nope) VALUES (1)"),
            Err(Error::Schema("Column 'nope' not found".into()))
        );
        assert!(matches!(
            run(&mut catalog, "INSERT INTO t VALUES (1, 'a')"),
            Err(Error::Parse(_))
        ));
        assert_eq!(
            run(&mut catalog, "INSERT INTO u VALUES (1)"),
            Err(Error::Schema("Table 'u' not found".into()))
        );
        let table = catalog.must_get_table("t")?;
        assert!(table.rows.is_empty());
        assert_eq!(table.next_id, 0);
        Ok(())
    }

    #[test]
    fn test_update_ignores_unknown_targets() -> Result<()> {
        let mut catalog = setup()?;
        run(&mut catalog, "INSERT INTO t VALUES (1, 'a', true)")?;
        run(&mut catalog, "INSERT INTO t VALUES (2, 'b', false)")?;
        assert_eq!(
            run(&mut catalog, "UPDATE t SET name = 'z', ghost = 5 WHERE id >= 2")?,
            ResultSet::Update { count: 1 }
        );
        assert_eq!(
            run(&mut catalog, "UPDATE t SET ok = NULL")?,
            ResultSet::Update { count: 2 }
        );
        let table = catalog.must_get_table("t")?;
        assert_eq!(table.rows[1].values[1], Some(Value::Text("z".into())));
        assert!(table.rows.iter().all(|r| r.values[2].is_none()));
        Ok(())
    }

    #[test]
    fn test_delete_then_vacuum() -> Result<()> {
        let mut catalog = setup()?;
        for i in 0..4 {
            run(&mut catalog, &format!("INSERT INTO t VALUES ({}, 'n{}', true)", i, i))?;
        }
        assert_eq!(
            run(&mut catalog, "DELETE FROM t WHERE id < 2")?,
            ResultSet::Delete { count: 2 }
        );
        // tombstoned rows are not matched again
        assert_eq!(
            run(&mut catalog, "DELETE FROM t WHERE id < 2")?,
            ResultSet::Delete { count: 0 }
        );
        assert_eq!(catalog.must_get_table("t")?.rows.len(), 4);
        assert_eq!(run(&mut catalog, "VACUUM")?, ResultSet::Vacuum { purged: 2 });
        assert_eq!(run(&mut catalog, "VACUUM")?, ResultSet::Vacuum { purged: 0 });

        let table = catalog.must_get_table("t")?;
        let ids: Vec<_> = table.rows.iter().map(|r| r.values[0].clone()).collect();
        assert_eq!(ids, vec![Some(Value::Integer(2)), Some(Value::Integer(3))]);
        assert_eq!(table.next_id, 4);
        Ok(())
    }
}
