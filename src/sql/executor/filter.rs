use std::cmp::Ordering;

use crate::sql::{
    parser::ast::{Condition, Operator},
    schema::{Row, Table},
    types::Value,
};

/// Evaluates a WHERE predicate against one row.
///
/// An unknown column never matches, and a NULL slot only matches `IS NULL`.
pub fn matches(row: &Row, table: &Table, condition: &Condition) -> bool {
    match condition {
        Condition::IsNull(column) => table
            .col_index(column)
            .is_some_and(|i| row.values[i].is_none()),
        Condition::IsNotNull(column) => table
            .col_index(column)
            .is_some_and(|i| row.values[i].is_some()),
        Condition::Compare { column, op, value } => {
            let Some(i) = table.col_index(column) else {
                return false;
            };
            let Some(stored) = &row.values[i] else {
                return false;
            };
            let operand = Value::coerce(value, table.columns[i].datatype);
            apply(*op, stored.compare(&operand))
        }
    }
}

/// Live rows pass when there is no condition
pub fn filter(row: &Row, table: &Table, condition: Option<&Condition>) -> bool {
    !row.deleted && condition.is_none_or(|c| matches(row, table, c))
}

fn apply(op: Operator, ord: Ordering) -> bool {
    match op {
        Operator::Equal => ord == Ordering::Equal,
        Operator::NotEqual => ord != Ordering::Equal,
        Operator::Less => ord == Ordering::Less,
        Operator::Greater => ord == Ordering::Greater,
        Operator::LessEqual => ord != Ordering::Greater,
        Operator::GreaterEqual => ord != Ordering::Less,
    }
}
