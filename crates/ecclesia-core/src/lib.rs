//! Core types and trait definitions for the Ecclesia back office.
//!
//! This crate is free of HTTP and database dependencies. It holds the
//! organizational data model (regions → districts → parishes and their
//! sub-resources), the [`store::DataService`] abstraction over the backing
//! tables, and the pure navigation/aggregation layer the dashboard is built
//! on: typed fetchers, keyed query results, roll-up counts, the selection
//! session and the section router.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures instead.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod aggregate;
pub mod asset;
pub mod census;
pub mod code;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod member;
pub mod mutate;
pub mod notify;
pub mod org;
pub mod query;
pub mod record;
pub mod report;
pub mod section;
pub mod selection;
pub mod store;
pub mod table;
pub mod worship;

#[cfg(test)]
mod fake;

pub use error::{Error, Result};
