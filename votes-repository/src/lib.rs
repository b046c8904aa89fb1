//! # Votes Repository
//! This crate provides the storage seam of the vote ledger. It defines the
//! `VoteStore` trait together with its errors, a PostgreSQL implementation
//! and an in-memory implementation for local development and tests.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VoteStoreError;
pub use interfaces::{RecordOutcome, VoteStore};
pub use memory::MemoryVoteStore;
pub use postgres::PostgresVoteStore;
