//! # dbc
//!
//! `dbc` turns `.dbc` files into a [`Catalog`](crate::types::catalog::Catalog):
//! - [`extract`] reads the file and sorts its lines by statement kind;
//! - [`parse`] merges them into messages and signals;
//! - [`cache`] stores the catalog as JSON next to the DBC;
//! - [`ledger`] keeps the initial value of every signal;
//! - [`registry`] shares loaded databases.

pub mod cache;
pub mod core;
pub mod database;
pub mod extract;
pub mod ledger;
pub mod parse;
pub mod registry;

pub use database::DbcDatabase;
pub use ledger::{InitialValueLedger, PendingReset};
pub use parse::from_file;
pub use registry::{CatalogKey, CatalogRegistry};
