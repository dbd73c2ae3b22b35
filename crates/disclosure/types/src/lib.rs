//! IP Disclosure Domain Types
//!
//! This crate defines the domain types for intellectual-property
//! disclosures (patent, copyright, design, trademark) moving through a
//! staged, multi-party review.
//!
//! # Key Concepts
//!
//! - **Application**: The aggregate root. Owns its contributors and its
//!   status. Status only changes through the engine's transition table.
//! - **Review**: One append-only record per workflow action, hash-linked
//!   per application so the history is tamper-evident.
//! - **EditSuggestion**: A reviewer-proposed replacement value for one
//!   field. Resolved exactly once, by the applicant.
//! - **IncentivePolicy**: Base points and base incentive per IPR type.
//! - **CapabilitySet**: The resolved booleans an actor holds for one request.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. All types
//! implement `Clone`, `Debug`, `Serialize`, `Deserialize`. IDs use the
//! newtype pattern and implement `Display`, `generate()`, and `new()`.

#![deny(unsafe_code)]

mod amount;
mod application;
mod capability;
mod contributor;
mod errors;
mod events;
mod ids;
mod policy;
mod review;
mod suggestion;

pub use amount::*;
pub use application::*;
pub use capability::*;
pub use contributor::*;
pub use errors::*;
pub use events::*;
pub use ids::*;
pub use policy::*;
pub use review::*;
pub use suggestion::*;
