//! Disclosure storage abstractions.
//!
//! This crate defines the persistence contract for the disclosure engine:
//! - Application aggregates with optimistic versioning
//! - append-only, hash-linked review chains per application
//! - edit suggestions with exactly-once resolution
//! - read-only incentive policy records
//!
//! Design stance:
//! - One `commit` call is the unit of atomicity for an aggregate. The
//!   application write, its review appends, and its suggestion writes land
//!   together or not at all.
//! - The incentive credit is a compare-and-set that needs no outer lock.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod model;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryDisclosureStore;
pub use model::{
    compute_review_hash, verify_review_chain, AggregateCommit, ApplicationQuery, CommitReceipt,
    SuggestionWrite,
};
pub use traits::{ApplicationStore, DisclosureStore, PolicyStore, ReviewStore, SuggestionStore};
