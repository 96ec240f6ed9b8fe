// ── Wire enums ──
//
// Integer-coded values from the panel's PULL protocol. Codes and meanings
// come from the vendor SDK documentation; decoding an unknown code is a
// `DecodeError` at the codec layer, never a panic.

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

/// Authentication method recorded with a transaction.
///
/// See the `DoorXVerifyType` parameter in the vendor SDK docs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    FromRepr,
)]
#[repr(u8)]
pub enum VerifyMode {
    NotAvailable = 0,
    OnlyFinger = 1,
    OnlyPassword = 3,
    OnlyCard = 4,
    CardOrFinger = 6,
    CardAndFinger = 10,
    CardAndPassword = 11,
    Others = 200,
}

impl VerifyMode {
    #[allow(clippy::as_conversions)]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Whether a user entered or exited through a door.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    FromRepr,
)]
#[repr(u8)]
pub enum PassageDirection {
    Entry = 0,
    Exit = 1,
    None = 2,
}

impl PassageDirection {
    #[allow(clippy::as_conversions)]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Relay group a relay belongs to: door lock outputs or auxiliary outputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    FromRepr,
)]
#[repr(u8)]
pub enum RelayGroup {
    Lock = 1,
    Aux = 2,
}

impl RelayGroup {
    #[allow(clippy::as_conversions)]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Whether a holiday table entry repeats every year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    FromRepr,
)]
#[repr(u8)]
pub enum HolidayLoop {
    Once = 0,
    Yearly = 1,
}

impl HolidayLoop {
    #[allow(clippy::as_conversions)]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Realtime event type code.
///
/// The panel emits more codes than any published list, so this is a newtype
/// over the wire integer rather than a closed enum: known codes get a
/// catalogue description, unknown ones keep the number and stay inspectable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventCode(pub u16);

impl EventCode {
    /// The pseudo-event the device emits on every realtime query when
    /// nothing happened. Carries door/alarm status, not a transaction.
    pub const STATUS_HEARTBEAT: EventCode = EventCode(255);

    pub fn is_heartbeat(self) -> bool {
        self == Self::STATUS_HEARTBEAT
    }

    /// Human-readable description from the vendor event catalogue.
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "Normal Punch Open",
            1 => "Punch during Normal Open Time Zone",
            2 => "First Card Normal Open (Punch Card)",
            3 => "Multi-Card Open (Punching Card)",
            4 => "Emergency Password Open",
            5 => "Open during Normal Open Time Zone",
            6 => "Linkage Event Triggered",
            7 => "Cancel Alarm",
            8 => "Remote Opening",
            9 => "Remote Closing",
            10 => "Disable Intraday Normal Open Time Zone",
            11 => "Enable Intraday Normal Open Time Zone",
            12 => "Open Auxiliary Output",
            13 => "Close Auxiliary Output",
            14 => "Press Fingerprint Open",
            15 => "Multi-Card Open (Press Fingerprint)",
            16 => "Press Fingerprint during Normal Open Time Zone",
            17 => "Card plus Fingerprint Open",
            18 => "First Card Normal Open (Press Fingerprint)",
            19 => "First Card Normal Open (Card plus Fingerprint)",
            20 => "Too Short Punch Interval",
            21 => "Door Inactive Time Zone (Punch Card)",
            22 => "Illegal Time Zone",
            23 => "Access Denied",
            24 => "Anti-Passback",
            25 => "Interlock",
            26 => "Multi-Card Authentication (Punching Card)",
            27 => "Unregistered Card",
            28 => "Opening Timeout",
            29 => "Card Expired",
            30 => "Password Error",
            31 => "Too Short Fingerprint Pressing Interval",
            32 => "Multi-Card Authentication (Press Fingerprint)",
            33 => "Fingerprint Expired",
            34 => "Unregistered Fingerprint",
            35 => "Door Inactive Time Zone (Press Fingerprint)",
            36 => "Door Inactive Time Zone (Exit Button)",
            37 => "Failed to Close during Normal Open Time Zone",
            101 => "Duress Password Open",
            102 => "Opened Accidentally",
            103 => "Duress Fingerprint Open",
            200 => "Door Opened Correctly",
            201 => "Door Closed Correctly",
            202 => "Exit button Open",
            203 => "Multi-Card Open (Card plus Fingerprint)",
            204 => "Normal Open Time Zone Over",
            205 => "Remote Normal Opening",
            220 => "Auxiliary Input Disconnected",
            221 => "Auxiliary Input Shorted",
            255 => "Device status report",
            _ => "Unknown event type",
        }
    }
}

impl std::fmt::Display for EventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0, self.description())
    }
}

impl From<u16> for EventCode {
    fn from(code: u16) -> Self {
        EventCode(code)
    }
}

/// Event types fully or partially produced by a card/fingerprint reader.
/// Used as the preset predicate for reader-scoped event views.
pub const READER_EVENT_TYPES: &[u16] = &[
    0, 1, 2, 3, 4, 10, 11, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 26, 27, 29, 30, 31, 32, 33,
    34, 35, 36, 101, 103, 203,
];

/// Event types produced by an auxiliary input.
pub const AUX_INPUT_EVENT_TYPES: &[u16] = &[220, 221];
