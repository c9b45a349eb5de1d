pub mod outcome;
pub mod pipeline;

pub use outcome::{FailReason, IngestOutcome, RejectReason};
pub use pipeline::Ingestor;
