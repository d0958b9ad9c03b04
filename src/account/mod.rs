//! Account administration flows.

pub mod profile;

pub use profile::{CommitOutcome, Debouncer, ProfileAttributes, ProfileEditor};
