//! Typed data layer for ZKAccess C3 access-control panels.
//!
//! The panel speaks a string-table protocol: every stored record and every
//! realtime event arrives as string-keyed rows. This crate owns the typed
//! layer above that wire format:
//!
//! - **[`codec`]** — per-field codecs between raw strings and native types
//!   (packed timestamps, `YYYYMMDD` dates with the `"0"` sentinel, time
//!   ranges, door bitmasks, wire enums).
//!
//! - **Table models** ([`model`]) — one declarative struct per device
//!   table (`User`, `Transaction`, `Timezone`, …). A record stores its
//!   unmodified raw row; typed accessors decode on read, setters encode
//!   on write, so absent, empty and zero stay distinct things.
//!
//! - **[`QuerySet`]** — lazy, immutable query builder. `filter`/`select`/
//!   `unread` calls pile up state without touching the device; the first
//!   read access costs exactly one gateway round trip and is memoized per
//!   QuerySet instance.
//!
//! - **[`EventLog`]** — bounded FIFO buffer of decoded realtime [`Event`]s,
//!   refreshed by polling the device's unread-event cursor. Views derived
//!   with [`EventLog::only`]/[`EventLog::after_time`] share the buffer and
//!   AND-compose predicates; [`EventLog::poll`] blocks until a matching
//!   event arrives or a timeout lapses.
//!
//! - **[`Panel`]** — facade over one connection: table queries, the root
//!   event log, and door/reader/aux-input scoped views.
//!
//! The transport that actually executes device calls sits behind the
//! [`TableGateway`] trait and is deliberately out of scope — any vendor
//! SDK binding, network implementation or test mock plugs in there.

pub mod codec;
pub mod config;
pub mod enums;
pub mod error;
pub mod events;
pub mod gateway;
pub mod model;
pub mod panel;
pub mod query;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use codec::{CodecKind, DecodeError};
pub use config::{ConnectionOptions, PanelOptions, Protocol};
pub use error::Error;
pub use events::{Event, EventLog, EventQuery};
pub use gateway::{RawRow, TableFilters, TableGateway, TransportError};
pub use panel::Panel;
pub use query::QuerySet;
pub use topology::{AuxInput, DeviceModel, Door, Reader};

// Re-export model machinery and the table types at the crate root for
// ergonomics.
pub use model::{
    Condition,
    FieldDef,
    FieldKind,
    // Tables
    FirstCard,
    Holiday,
    InOutFun,
    Model,
    MultiCard,
    TableField,
    TemplateV10,
    Timezone,
    Transaction,
    User,
    UserAuthorize,
};

pub use enums::{
    EventCode, HolidayLoop, PassageDirection, RelayGroup, VerifyMode,
};
