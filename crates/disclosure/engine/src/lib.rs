//! Disclosure engine: the IP disclosure review workflow
//!
//! - [`ApplicationStateMachine`] holds the transition table.
//! - [`PermissionGate`] decides who may take an action, from capabilities
//!   resolved per request.
//! - The suggestion ledger (on [`DisclosureService`]) tracks reviewer
//!   field edits and the applicant's accept/reject.
//! - [`IncentiveCalculator`] splits the reward once a disclosure is
//!   published.
//! - [`MentorGate`] holds student submissions for their mentor.
//!
//! [`DisclosureService`] ties these to a [`disclosure_storage::DisclosureStore`]
//! and publishes [`disclosure_types::DomainEvent`]s after each commit.

#![deny(unsafe_code)]

pub mod config;
mod events;
mod incentive;
mod locks;
mod mentor_gate;
mod permission_gate;
mod service;
mod state_machine;
mod suggestion_ledger;
pub mod telemetry;
mod workflow;

pub use config::{ConfigError, EngineConfig, PolicyDefault};
pub use events::EventBus;
pub use incentive::{Eligibility, IncentiveCalculator};
pub use locks::{AggregateGuard, AggregateLocks};
pub use mentor_gate::{MentorDirectory, MentorGate, StaticMentorDirectory, SubmitRoute};
pub use permission_gate::{
    resolve_capabilities, CapabilityResolver, Operation, PermissionGate, Relation, Requirement,
    StaticCapabilityResolver,
};
pub use service::DisclosureService;
pub use state_machine::{ApplicationStateMachine, Edge, TransitionHints};
pub use suggestion_ledger::{BatchItemResult, BatchReport, SuggestionProposal, SuggestionResolution};
pub use workflow::{TransitionOutcome, TransitionRequest};
