//! # Votes Ledger
//! This crate implements the vote ledger and quota engine.
//! It gates and records votes so that each member casts at most
//! `VOTES_PER_PERIOD` votes per quarter and every project tally matches the
//! live votes cast for it. Storage is reached through the `VoteStore` trait
//! and time through the `Clock` trait, both injected at construction.
pub mod clock;
pub mod errors;
pub mod ledger;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::LedgerError;
pub use ledger::{RetryPolicy, VoteLedger};
