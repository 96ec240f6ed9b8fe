// ── Core error types ──
//
// User-facing errors from zkpanel-core. Transport errors pass through
// unmodified (this layer never retries and never swallows them); decode
// errors are tolerated at the granularity each component documents.

use thiserror::Error;

use crate::codec::DecodeError;
use crate::gateway::TransportError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A string-keyed entry point named a field the model does not define.
    /// A programming error — never retried.
    #[error("no such field {model}.{field}")]
    UnknownField {
        model: &'static str,
        field: String,
    },

    /// The operation needs a device connection but the record was created
    /// standalone and never attached to one.
    #[error("record is not bound to a panel connection")]
    NotBound,

    /// A raw value failed its field codec.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Communication or device-side failure, propagated from the gateway.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A bulk upsert/delete failed part-way through. Records before
    /// `index` were sent; `index` and everything after are not guaranteed
    /// to have been written — the device has no transactions.
    #[error("bulk operation failed at record {index}")]
    Batch {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn unknown_field(model: &'static str, field: impl Into<String>) -> Self {
        Error::UnknownField {
            model,
            field: field.into(),
        }
    }

    pub(crate) fn batch(index: usize, source: Error) -> Self {
        Error::Batch {
            index,
            source: Box::new(source),
        }
    }
}
