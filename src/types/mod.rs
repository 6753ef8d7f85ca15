//! Core domain types for the merge notifier.

pub mod ids;
pub mod pr;

pub use ids::{InvalidRepoId, PrId, PrNumber, RepoId};
pub use pr::MergedPr;
