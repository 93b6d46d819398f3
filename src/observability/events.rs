//! Observability events for tarpon
//!
//! Every log line carries an `event` field drawn from this catalogue, so
//! log consumers can match on a stable name instead of message text.

use std::fmt;

/// Observable events in tarpon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Service startup begins
    BootStart,
    /// HTTP listener bound, ready to serve
    Serving,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,

    // Datastore
    /// Backend connection established
    DatastoreConnected,
    /// Backend connection failed
    DatastoreConnectFailed,
    /// Read query executed
    QueryExecuted,
    /// Query rejected by compiler or backend
    QueryRejected,
    /// Record written
    RecordInserted,
    /// Record fields updated
    RecordUpdated,
    /// Records physically removed
    RecordsDeleted,

    // Integrity
    /// Stored checksum matches
    ChecksumVerified,
    /// Stored checksum does not match the record
    ChecksumMismatch,

    // Tokens
    /// Token created
    TokenCreated,
    /// Batch create finished
    TokenBatchCreated,
    /// Batch item rejected
    TokenBatchItemFailed,
    /// Token soft-deleted
    TokenDeleted,
    /// Cipher operation failed for one value
    CipherFailed,

    // HTTP
    /// Request failed with an error response
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "TARPON_STARTUP_BEGIN",
            Event::Serving => "TARPON_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::DatastoreConnected => "DATASTORE_CONNECTED",
            Event::DatastoreConnectFailed => "DATASTORE_CONNECT_FAILED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordsDeleted => "RECORDS_DELETED",

            Event::ChecksumVerified => "CHECKSUM_VERIFIED",
            Event::ChecksumMismatch => "CHECKSUM_MISMATCH",

            Event::TokenCreated => "TOKEN_CREATED",
            Event::TokenBatchCreated => "TOKEN_BATCH_CREATED",
            Event::TokenBatchItemFailed => "TOKEN_BATCH_ITEM_FAILED",
            Event::TokenDeleted => "TOKEN_DELETED",
            Event::CipherFailed => "CIPHER_FAILED",

            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Returns true if the event signals a condition an operator should look at
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            Event::DatastoreConnectFailed | Event::ChecksumMismatch
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
