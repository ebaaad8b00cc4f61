//! Statement processing
//!
//! This module provides:
//! - `parser`: keyword-driven statement parser
//! - `types`: column data types and values
//! - `schema`: tables, rows and the catalog
//! - `executor`: one executor per command, plus WHERE evaluation
//! - `engine`: the `Database` handle and the `execute` entry point

pub mod parser;
pub mod types;
pub mod schema;
pub mod executor;
pub mod engine;
