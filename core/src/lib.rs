//! AML Desk core: transaction risk scoring, in-memory transaction and
//! case stores, case derivation, and persisted onboarding progress.

pub mod analyzer;
pub mod auth;
pub mod case_store;
pub mod clock;
pub mod command;
pub mod config;
pub mod desk;
pub mod error;
pub mod event;
pub mod progress;
pub mod rng;
pub mod store;
pub mod summary;
pub mod transaction_store;
pub mod types;
pub mod validation;
