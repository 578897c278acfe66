//! # dbc_codec
//!
//! Rust utilities for turning **DBC** CAN databases into signal catalogs and CAN payloads.
//!
//! ## Highlights
//! - **DBC parser**: read `.dbc` files into a [`Catalog`] of messages and signals.
//! - **JSON cache**: the catalog is written next to the DBC and reused on the next load.
//! - **Initial values**: an [`InitialValueLedger`] tracks signals sent away from their start value.
//! - **Signal codec**: physical ↔ raw scaling and packing into a [`Frame`], Intel and Motorola.
//! - **Registry**: each DBC is loaded once and shared as an `Arc<DbcDatabase>`.
//!

pub mod codec;
pub mod config;
pub mod dbc;
#[doc(hidden)]
pub mod types;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::types::{
    attributes::FrameFormat,
    catalog::{Catalog, CatalogHead},
    errors::{DbcError, MessageLayoutError, Result},
    message::{Message, MessageRef, parse_message_id},
    signal::{ByteOrder, Signal, ValueType},
};

pub use crate::codec::{Frame, MergeReport};
pub use crate::config::{CatalogConfig, resolve_dbc_path};
pub use crate::dbc::{CatalogRegistry, DbcDatabase, InitialValueLedger, PendingReset};
