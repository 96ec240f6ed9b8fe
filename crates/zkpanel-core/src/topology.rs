// ── Panel hardware topology ──
//
// The C3 line differs only in how many doors/readers/aux inputs a board
// carries. Doors, readers and aux inputs expose their own event views,
// which are nothing more than preset predicates over the one shared
// realtime log.

use serde::{Deserialize, Serialize};

use crate::enums::{AUX_INPUT_EVENT_TYPES, READER_EVENT_TYPES};
use crate::events::{EventLog, EventQuery};

/// Panel hardware model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceModel {
    /// C3-100: one door, one reader, one aux input.
    Zk100,
    /// C3-200: two doors.
    Zk200,
    /// C3-400: four doors.
    Zk400,
}

impl DeviceModel {
    pub fn name(self) -> &'static str {
        match self {
            DeviceModel::Zk100 => "C3-100",
            DeviceModel::Zk200 => "C3-200",
            DeviceModel::Zk400 => "C3-400",
        }
    }

    pub fn door_count(self) -> u32 {
        match self {
            DeviceModel::Zk100 => 1,
            DeviceModel::Zk200 => 2,
            DeviceModel::Zk400 => 4,
        }
    }

    /// Door numbers on this board, 1-based.
    pub fn doors(self) -> impl Iterator<Item = u32> {
        1..=self.door_count()
    }
}

impl std::fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One door on the panel.
#[derive(Debug, Clone)]
pub struct Door {
    number: u32,
    log: EventLog,
}

impl Door {
    pub(crate) fn new(number: u32, log: EventLog) -> Self {
        Self { number, log }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Events at this door: everything its reader, lock and aux input
    /// produce. A view over the shared realtime log.
    pub fn events(&self) -> EventLog {
        self.log.only(EventQuery::new().door(self.number))
    }
}

/// One card/fingerprint reader.
#[derive(Debug, Clone)]
pub struct Reader {
    number: u32,
    log: EventLog,
}

impl Reader {
    pub(crate) fn new(number: u32, log: EventLog) -> Self {
        Self { number, log }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Reader-related events only (punches, fingerprint presses, their
    /// rejections).
    pub fn events(&self) -> EventLog {
        self.log.only(
            EventQuery::new()
                .door(self.number)
                .event_types(READER_EVENT_TYPES.iter().copied()),
        )
    }
}

/// One auxiliary input (door sensor, exit button wiring, etc.).
#[derive(Debug, Clone)]
pub struct AuxInput {
    number: u32,
    log: EventLog,
}

impl AuxInput {
    pub(crate) fn new(number: u32, log: EventLog) -> Self {
        Self { number, log }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Disconnect/short events for this input.
    pub fn events(&self) -> EventLog {
        self.log.only(
            EventQuery::new()
                .door(self.number)
                .event_types(AUX_INPUT_EVENT_TYPES.iter().copied()),
        )
    }
}
