pub mod criteria;
pub mod document;
pub mod job;
pub mod outcome;

pub use criteria::parse_criteria;
pub use document::Document;
pub use job::{Job, JobId};
pub use outcome::{Outcome, OutcomeStatus, ScoreCard};
