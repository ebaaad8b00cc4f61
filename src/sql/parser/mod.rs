use crate::error::{Error, Result};
use crate::sql::parser::ast::{Column, Condition, Literal, Operator, Statement};
use crate::sql::parser::scan::{find_ci, split_list, starts_with_ci, strip_quotes, take_ident};
use crate::sql::schema::{MAX_COLUMNS, MAX_NAME_LEN};
use super::types::DataType;

pub mod ast;
mod scan;

/// Statement parser - turns statement text into a `Statement`.
///
/// The command is picked by case-insensitive keyword prefix, then each
/// command parses only its own fragment, left to right.
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given statement text
    pub fn new(input: &'a str) -> Self {
        Parser { input }
    }

    /// Parses the input, an optional trailing `;` is dropped
    pub fn parse(&mut self) -> Result<Statement> {
        let sql = self.input.trim();
        let sql = sql.strip_suffix(';').unwrap_or(sql).trim();

        if sql.is_empty() {
            Ok(Statement::Empty)
        } else if starts_with_ci(sql, "CREATE TABLE") {
            self.parse_create_table(&sql["CREATE TABLE".len()..])
        } else if starts_with_ci(sql, "DROP TABLE") {
            Ok(Statement::DropTable { name: table_ident(sql["DROP TABLE".len()..].trim())? })
        } else if starts_with_ci(sql, "INSERT INTO") {
            self.parse_insert(&sql["INSERT INTO".len()..])
        } else if starts_with_ci(sql, "SELECT") {
            self.parse_select(&sql["SELECT".len()..])
        } else if starts_with_ci(sql, "UPDATE") {
            self.parse_update(&sql["UPDATE".len()..])
        } else if starts_with_ci(sql, "DELETE FROM") {
            let (name, rest) = take_ident(&sql["DELETE FROM".len()..]);
            Ok(Statement::Delete {
                table_name: table_ident(name)?,
                condition: parse_where(rest)?,
            })
        } else if starts_with_ci(sql, "SHOW TABLES") {
            Ok(Statement::ShowTables)
        } else if starts_with_ci(sql, "DESCRIBE") || starts_with_ci(sql, "DESC ") {
            // Whatever follows the first word is the table name
            let rest = sql.find(char::is_whitespace).map_or("", |i| &sql[i..]);
            Ok(Statement::Describe { table_name: table_ident(rest.trim())? })
        } else if starts_with_ci(sql, "VACUUM") {
            Ok(Statement::Vacuum)
        } else {
            Err(Error::Parse("Unknown command".into()))
        }
    }

    /// `name (col type [NOT NULL] [PRIMARY KEY], ...)`
    fn parse_create_table(&self, rest: &str) -> Result<Statement> {
        let (name, rest) = take_ident(rest);
        let name = table_ident(name)?;
        let body = rest
            .strip_prefix('(')
            .ok_or_else(|| Error::Parse("Expected '('".into()))?;
        let end = body
            .rfind(')')
            .ok_or_else(|| Error::Parse("Missing ')'".into()))?;

        let mut columns = Vec::new();
        for def in split_list(&body[..end]) {
            columns.push(parse_column(def)?);
        }
        if columns.is_empty() {
            return Err(Error::Schema("No columns defined".into()));
        }
        if columns.len() > MAX_COLUMNS {
            return Err(Error::Schema(format!(
                "Too many columns: {} (max {})",
                columns.len(),
                MAX_COLUMNS
            )));
        }
        Ok(Statement::CreateTable { name, columns })
    }

    /// `name [(cols)] VALUES (vals)`
    fn parse_insert(&self, rest: &str) -> Result<Statement> {
        let (name, rest) = take_ident(rest);
        let table_name = table_ident(name)?;

        let (columns, rest) = match rest.strip_prefix('(') {
            Some(list) => {
                let end = list
                    .find(')')
                    .ok_or_else(|| Error::Parse("Missing ')'".into()))?;
                let cols = split_list(&list[..end])
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                (Some(cols), list[end + 1..].trim_start())
            }
            None => (None, rest),
        };

        let pos = find_ci(rest, "VALUES").ok_or_else(|| Error::Parse("Missing VALUES".into()))?;
        let values = rest[pos + "VALUES".len()..]
            .trim_start()
            .strip_prefix('(')
            .ok_or_else(|| Error::Parse("Expected '('".into()))?;
        let end = values
            .rfind(')')
            .ok_or_else(|| Error::Parse("Missing ')'".into()))?;

        Ok(Statement::Insert {
            table_name,
            columns,
            values: split_list(&values[..end]).into_iter().map(parse_literal).collect(),
        })
    }

    /// `cols|* FROM name [WHERE cond]`
    fn parse_select(&self, rest: &str) -> Result<Statement> {
        let from = find_ci(rest, "FROM").ok_or_else(|| Error::Parse("Missing FROM".into()))?;
        let list = rest[..from].trim();
        let (name, tail) = take_ident(&rest[from + "FROM".len()..]);

        let columns = if list == "*" {
            None
        } else {
            let cols = split_list(list)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            if cols.is_empty() {
                return Err(Error::Parse("Expected column list".into()));
            }
            Some(cols)
        };

        Ok(Statement::Select {
            table_name: table_ident(name)?,
            columns,
            condition: parse_where(tail)?,
        })
    }

    /// `name SET col=val[, ...] [WHERE cond]`
    fn parse_update(&self, rest: &str) -> Result<Statement> {
        let (name, rest) = take_ident(rest);
        let table_name = table_ident(name)?;
        if !starts_with_ci(rest, "SET") {
            return Err(Error::Parse("Expected SET".into()));
        }
        let rest = rest["SET".len()..].trim_start();

        // WHERE is searched over everything after SET, quotes included
        let (set_clause, condition) = match find_ci(rest, "WHERE") {
            Some(pos) => (
                rest[..pos].trim(),
                Some(parse_condition(rest[pos + "WHERE".len()..].trim())?),
            ),
            None => (rest.trim(), None),
        };

        let mut assignments = Vec::new();
        for item in split_list(set_clause) {
            let eq = item.find('=').ok_or_else(|| Error::Parse("Bad SET".into()))?;
            assignments.push((
                item[..eq].trim().to_string(),
                parse_literal(item[eq + 1..].trim()),
            ));
        }
        if assignments.is_empty() {
            return Err(Error::Parse("Bad SET".into()));
        }

        Ok(Statement::Update { table_name, assignments, condition })
    }
}

/// Column definition inside CREATE TABLE
fn parse_column(def: &str) -> Result<Column> {
    let mut words = def.split_whitespace();
    let name = words.next().unwrap_or_default();
    let type_name = words.next().unwrap_or_default();
    let datatype = DataType::from_name(type_name)
        .ok_or_else(|| Error::Schema(format!("Unknown type '{}'", type_name)))?;

    Ok(Column {
        name: ident(name)?,
        datatype,
        nullable: find_ci(def, "NOT NULL").is_none(),
        primary_key: find_ci(def, "PRIMARY KEY").is_some(),
    })
}

/// Unquoted `NULL` (any case) is the null marker, quoted text is taken verbatim
fn parse_literal(item: &str) -> Literal {
    let (text, quoted) = strip_quotes(item.trim());
    if !quoted && text.eq_ignore_ascii_case("NULL") {
        Literal::Null
    } else {
        Literal::Raw(text.to_string())
    }
}

/// Optional `WHERE cond` anywhere in the remaining text
fn parse_where(rest: &str) -> Result<Option<Condition>> {
    match find_ci(rest, "WHERE") {
        Some(pos) => Ok(Some(parse_condition(rest[pos + "WHERE".len()..].trim())?)),
        None => Ok(None),
    }
}

/// `col IS [NOT] NULL` or `col <op> value`
fn parse_condition(text: &str) -> Result<Condition> {
    if let Some(pos) = find_ci(text, " IS NOT NULL") {
        return Ok(Condition::IsNotNull(text[..pos].trim().to_string()));
    }
    if let Some(pos) = find_ci(text, " IS NULL") {
        return Ok(Condition::IsNull(text[..pos].trim().to_string()));
    }
    for (symbol, op) in Operator::SCAN_ORDER {
        if let Some(pos) = text.find(symbol) {
            let (value, _) = strip_quotes(text[pos + symbol.len()..].trim());
            return Ok(Condition::Compare {
                column: text[..pos].trim().to_string(),
                op,
                value: value.to_string(),
            });
        }
    }
    Err(Error::Parse(format!("Bad condition '{}'", text)))
}

fn ident(name: &str) -> Result<String> {
    if name.len() > MAX_NAME_LEN {
        return Err(Error::Parse(format!(
            "Identifier '{}' longer than {} bytes",
            name, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn table_ident(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::Parse("Missing table name".into()));
    }
    ident(name)
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{Error, Result},
        sql::{
            parser::ast::{Column, Condition, Literal, Operator, Statement},
            types::DataType,
        },
    };

    use super::Parser;

    #[test]
    fn test_parser_create_table() -> Result<()> {
        let stmt = Parser::new(
            "create table users (id INTEGER PRIMARY KEY, name varchar not null, ok bool);",
        )
        .parse()?;
        assert_eq!(
            stmt,
            Statement::CreateTable {
                name: "users".into(),
                columns: vec![
                    Column {
                        name: "id".into(),
                        datatype: DataType::Integer,
                        nullable: true,
                        primary_key: true,
                    },
                    Column {
                        name: "name".into(),
                        datatype: DataType::Text,
                        nullable: false,
                        primary_key: false,
                    },
                    Column {
                        name: "ok".into(),
                        datatype: DataType::Boolean,
                        nullable: true,
                        primary_key: false,
                    },
                ],
            }
        );

        assert_eq!(
            Parser::new("CREATE TABLE t id INT").parse(),
            Err(Error::Parse("Expected '('".into()))
        );
        assert_eq!(
            Parser::new("CREATE TABLE t (id INT").parse(),
            Err(Error::Parse("Missing ')'".into()))
        );
        assert_eq!(
            Parser::new("CREATE TABLE t (id BLOB)").parse(),
            Err(Error::Schema("Unknown type 'BLOB'".into()))
        );
        assert_eq!(
            Parser::new("CREATE TABLE t ( , )").parse(),
            Err(Error::Schema("No columns defined".into()))
        );
        let defs = (0..33).map(|i| format!("c{} INT", i)).collect::<Vec<_>>();
        assert_eq!(
            Parser::new(&format!("CREATE TABLE t ({})", defs.join(", "))).parse(),
            Err(Error::Schema("Too many columns: 33 (max 32)".into()))
        );
        Ok(())
    }

    #[test]
    fn test_parser_insert() -> Result<()> {
        let stmt = Parser::new("INSERT INTO t VALUES (1, 'a, b', NULL, 'null');").parse()?;
        assert_eq!(
            stmt,
            Statement::Insert {
                table_name: "t".into(),
                columns: None,
                values: vec![
                    Literal::Raw("1".into()),
                    Literal::Raw("a, b".into()),
                    Literal::Null,
                    Literal::Raw("null".into()),
                ],
            }
        );

        let stmt = Parser::new("insert into t(name , id) values (\"x\", 2)").parse()?;
        assert_eq!(
            stmt,
            Statement::Insert {
                table_name: "t".into(),
                columns: Some(vec!["name".into(), "id".into()]),
                values: vec![Literal::Raw("x".into()), Literal::Raw("2".into())],
            }
        );

        let stmt = Parser::new("INSERT INTO t VALUES (O'Brien, 5)").parse()?;
        assert_eq!(
            stmt,
            Statement::Insert {
                table_name: "t".into(),
                columns: None,
                values: vec![Literal::Raw("O'Brien".into()), Literal::Raw("5".into())],
            }
        );

        assert_eq!(
            Parser::new("INSERT INTO t (1, 2)").parse(),
            Err(Error::Parse("Missing VALUES".into()))
        );
        assert_eq!(
            Parser::new("INSERT INTO t VALUES 1, 2").parse(),
            Err(Error::Parse("Expected '('".into()))
        );
        Ok(())
    }

    #[test]
    fn test_parser_select() -> Result<()> {
        assert_eq!(
            Parser::new("select * from t;").parse()?,
            Statement::Select { table_name: "t".into(), columns: None, condition: None }
        );
        assert_eq!(
            Parser::new("SELECT a, b FROM t WHERE age<=30").parse()?,
            Statement::Select {
                table_name: "t".into(),
                columns: Some(vec!["a".into(), "b".into()]),
                condition: Some(Condition::Compare {
                    column: "age".into(),
                    op: Operator::LessEqual,
                    value: "30".into(),
                }),
            }
        );
        assert_eq!(
            Parser::new("SELECT * t").parse(),
            Err(Error::Parse("Missing FROM".into()))
        );
        Ok(())
    }

    #[test]
    fn test_parser_conditions() -> Result<()> {
        let cond = |sql: &str| -> Result<Option<Condition>> {
            match Parser::new(sql).parse()? {
                Statement::Delete { condition, .. } => Ok(condition),
                stmt => panic!("unexpected statement {:?}", stmt),
            }
        };

        assert_eq!(
            cond("DELETE FROM t WHERE id IS NULL")?,
            Some(Condition::IsNull("id".into()))
        );
        assert_eq!(
            cond("delete from t where id is not null")?,
            Some(Condition::IsNotNull("id".into()))
        );
        assert_eq!(
            cond("DELETE FROM t WHERE a <> 'x'")?,
            Some(Condition::Compare {
                column: "a".into(),
                op: Operator::NotEqual,
                value: "x".into(),
            })
        );
        assert_eq!(
            cond("DELETE FROM t WHERE a>=1")?,
            Some(Condition::Compare {
                column: "a".into(),
                op: Operator::GreaterEqual,
                value: "1".into(),
            })
        );
        assert_eq!(cond("DELETE FROM t")?, None);
        assert!(matches!(cond("DELETE FROM t WHERE junk"), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_parser_update() -> Result<()> {
        assert_eq!(
            Parser::new("UPDATE t SET name='z', n = NULL WHERE id=1").parse()?,
            Statement::Update {
                table_name: "t".into(),
                assignments: vec![
                    ("name".into(), Literal::Raw("z".into())),
                    ("n".into(), Literal::Null),
                ],
                condition: Some(Condition::Compare {
                    column: "id".into(),
                    op: Operator::Equal,
                    value: "1".into(),
                }),
            }
        );
        assert_eq!(
            Parser::new("UPDATE t name='z'").parse(),
            Err(Error::Parse("Expected SET".into()))
        );
        assert_eq!(
            Parser::new("UPDATE t SET name").parse(),
            Err(Error::Parse("Bad SET".into()))
        );
        Ok(())
    }

    #[test]
    fn test_parser_misc() -> Result<()> {
        assert_eq!(Parser::new("  ;").parse()?, Statement::Empty);
        assert_eq!(Parser::new("show tables;").parse()?, Statement::ShowTables);
        assert_eq!(Parser::new("VACUUM").parse()?, Statement::Vacuum);
        assert_eq!(
            Parser::new("desc users").parse()?,
            Statement::Describe { table_name: "users".into() }
        );
        assert_eq!(
            Parser::new("DESCRIBE users;").parse()?,
            Statement::Describe { table_name: "users".into() }
        );
        assert_eq!(
            Parser::new("drop table users").parse()?,
            Statement::DropTable { name: "users".into() }
        );
        assert_eq!(
            Parser::new("GRANT ALL").parse(),
            Err(Error::Parse("Unknown command".into()))
        );
        let long = format!("CREATE TABLE {} (a INT)", "t".repeat(64));
        assert!(matches!(Parser::new(&long).parse(), Err(Error::Parse(_))));
        Ok(())
    }
}
