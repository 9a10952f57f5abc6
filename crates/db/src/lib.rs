//! `tgapp-db` crate — pure persistence layer.
//!
//! Provides a connection pool, typed row structs, and repository functions
//! for every table in the `tgapp` profiling schema.  No business logic lives
//! here: scope masks are interpreted by the profiler, credential blobs are
//! encrypted and decrypted by the crypto layer, data-quality scores are
//! written by the test runner.  This crate only stores them.

pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod repository;

pub use config::DbConfig;
pub use error::DbError;
pub use pool::DbPool;
