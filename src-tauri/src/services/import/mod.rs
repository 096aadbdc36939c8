//! Batch-import pipeline: scan a folder of games, match each one
//! against the metadata sources, review, commit to the library.

pub mod candidate;
pub mod commit;
pub mod manual;
pub mod matcher;
pub mod normalizer;
pub mod scanner;

pub use candidate::{Candidate, CandidateCounts, LookupOutcome};
pub use matcher::{MatchPassOutcome, MatcherConfig};

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod pipeline_tests;
