use std::fmt;
use uuid::Uuid;

/// Terminal state of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// New metadata record written
    Recorded(Uuid),
    /// A record for this lap already exists; nothing written
    Duplicate,
    /// Client fault; retrying the same bytes cannot succeed
    Rejected(RejectReason),
    /// Infrastructure fault; the whole request is safe to retry
    Failed(FailReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BadEncoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    StorageError,
    IndexError,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::BadEncoding => f.write_str("bad_encoding"),
        }
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::StorageError => f.write_str("storage_error"),
            FailReason::IndexError => f.write_str("index_error"),
        }
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestOutcome::Recorded(id) => write!(f, "RECORDED({})", id),
            IngestOutcome::Duplicate => f.write_str("DUPLICATE"),
            IngestOutcome::Rejected(reason) => write!(f, "REJECTED({})", reason),
            IngestOutcome::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}
