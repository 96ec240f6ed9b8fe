// ── Device table gateway ──
//
// The capability boundary between this crate and whatever actually speaks
// the vendor PULL protocol (C SDK binding, TCP implementation, test mock).
// Everything above this trait deals in string-keyed rows; everything below
// it is out of scope for this crate.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use async_trait::async_trait;
use indexmap::IndexMap;

/// One device table row, as received from or destined to the wire.
/// Field order is preserved because the device treats rows as ordered
/// field sequences.
pub type RawRow = IndexMap<String, String>;

/// Accumulated equality filters: raw field name → set of accepted raw
/// values (OR within a field, AND across fields).
pub type TableFilters = BTreeMap<String, BTreeSet<String>>;

/// Capability interface executing raw table and event operations against
/// one connected panel.
///
/// Calls are strictly sequential per connection — the protocol is
/// request/response and the device cannot interleave two commands. Every
/// method maps to exactly one device round trip. Implementations never
/// retry; retry policy belongs to the caller.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Read rows from a table, honoring equality filters, a field
    /// projection (empty = all fields) and the unread-only flag. Reading
    /// with `unread` advances the device-side read cursor.
    async fn read_table(
        &self,
        table: &str,
        filters: &TableFilters,
        fields: &[String],
        unread: bool,
    ) -> Result<Vec<RawRow>, TransportError>;

    /// Upsert rows into a table. The device inserts or updates by the
    /// table's primary key.
    async fn write_table(&self, table: &str, rows: Vec<RawRow>) -> Result<(), TransportError>;

    /// Delete rows from a table, matching on the row content given.
    async fn delete_table(&self, table: &str, rows: Vec<RawRow>) -> Result<(), TransportError>;

    /// Total row count of a table. Ignores any filter notion entirely.
    async fn count_table(&self, table: &str) -> Result<u64, TransportError>;

    /// Fetch realtime event rows recorded since the previous fetch. The
    /// device advances its event cursor as a side effect.
    async fn read_unread_events(&self, table: &str) -> Result<Vec<RawRow>, TransportError>;
}

/// Communication or device-side failure reported by the gateway.
///
/// `code` is the vendor result code (negative PULL-SDK codes, positive
/// WINSOCK codes). Rendered with the catalogue description when the code
/// is a known one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub code: i32,
    pub message: String,
}

impl TransportError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Catalogue description for the vendor result code, if known.
    pub fn code_description(&self) -> Option<&'static str> {
        describe_vendor_code(self.code)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code_description() {
            Some(descr) => write!(f, "{}: error {}: {}", self.message, self.code, descr),
            None => write!(f, "{}: unknown error {}", self.message, self.code),
        }
    }
}

impl std::error::Error for TransportError {}

/// Vendor result-code catalogue, trimmed to the codes a data-layer call
/// can produce (table reads/writes and realtime log queries).
fn describe_vendor_code(code: i32) -> Option<&'static str> {
    Some(match code {
        -1 => "The command is not sent successfully",
        -2 => "The command has no response",
        -3 => "The buffer is not enough",
        -4 => "The decompression fails",
        -5 => "The length of the read data is not correct",
        -6 => "The length of the decompressed data is not consistent with the expected length",
        -7 => "The command is repeated",
        -8 => "The connection is not authorized",
        -9 => "Data error: The CRC result is failure",
        -10 => "Data error: PullSDK cannot resolve the data",
        -11 => "Data parameter error",
        -12 => "The command is not executed correctly",
        -13 => "Command error: This command is not available",
        -14 => "The communication password is not correct",
        -99 => "Unknown error",
        -100 => "The table structure does not exist",
        -101 => "In the table structure, the Condition field does not exist",
        -102 => "The total number of fields is not consistent",
        -103 => "The sequence of fields is not consistent",
        -104 => "Real-time event data error",
        -105 => "Data errors occur during data resolution",
        -106 => "Data overflow: The delivered data is more than 4 MB in length",
        -107 => "Fail to get the table structure",
        -108 => "Invalid options",
        10054 => "WSAECONNRESET (Connection reset by peer)",
        10060 => "WSAETIMEDOUT (Connection timed out)",
        10061 => "WSAECONNREFUSED (Connection refused)",
        _ => return None,
    })
}
