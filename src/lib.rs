//! Calculator operation history with a dual-store persistence core.
//!
//! Every successful evaluation is recorded once in an authoritative
//! relational store, which assigns the sequential id, and mirrored into a
//! document store. Persistence failures are logged and never reach callers.
//!
//! # Examples
//!
//! Direct coordinator usage with in-memory SQLite stores:
//! ```
//! use calclog::{
//!     core::{
//!         adapter::{DocumentAdapter, RelationalAdapter},
//!         coordinator::PersistenceCoordinator,
//!     },
//!     persist::sqlite::{SqliteDocumentStore, SqliteRelationalStore},
//!     types::Flavor,
//! };
//!
//! let coord = PersistenceCoordinator::new(
//!     RelationalAdapter::new(SqliteRelationalStore::open_in_memory().expect("relational")),
//!     DocumentAdapter::new(SqliteDocumentStore::open_in_memory().expect("document")),
//! );
//! coord.save(Flavor::Independent, "plus", 12, &[5, 7]);
//! let history = coord.fetch("POSTGRES");
//! assert_eq!(history[0].id, 1);
//! assert_eq!(history, coord.fetch("MONGO"));
//! ```
//!
//! Runtime usage:
//! ```no_run
//! use std::sync::Arc;
//!
//! use calclog::{
//!     config::LoggingConfig,
//!     core::coordinator::PersistenceCoordinator,
//!     runtime::handle::{spawn_calculator, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! LoggingConfig::from_env().init();
//! let coord = PersistenceCoordinator::open_sqlite(".").expect("open sqlite");
//! let handle = spawn_calculator(Arc::new(coord), RuntimeConfig::default());
//! handle.push_arguments(vec![3, 5]).await.expect("push");
//! let diff = handle.stack_operate("minus").await.expect("operate");
//! assert_eq!(diff, 2);
//! let stack_history = handle.history("POSTGRES", Some("STACK")).await.expect("history");
//! assert_eq!(stack_history.len(), 1);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Integer operations and the operand stack.
pub mod calc;
/// Store hosts, fixed connection constants, and logging setup.
pub mod config;
/// Store adapters and the persistence coordinator.
pub mod core;
/// Store backend traits and implementations.
pub mod persist;
/// Operation records and their at-rest shapes.
pub mod record;
/// Single-writer calculator runtime and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
