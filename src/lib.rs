//! dbm - an embedded, single-file relational store
//!
//! This crate provides:
//! - A small SQL-like dialect (CREATE/DROP/INSERT/SELECT/UPDATE/DELETE,
//!   SHOW TABLES, DESCRIBE, VACUUM) parsed straight from statement text
//! - Typed tables with tombstoned deletes and explicit compaction
//! - A whole-database binary snapshot written after every mutation

pub mod error;
pub mod sql;
pub mod storage;

pub use sql::engine::{Database, StatementResult, execute};
