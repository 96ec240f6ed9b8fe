// ── Realtime event log ──
//
// The panel has no push channel; realtime events are pulled by polling the
// unread-event call. A root `EventLog` owns a bounded FIFO buffer; views
// derived with `only`/`after_time` share that buffer by reference and only
// add predicates, applied at read time. Refreshing through any view fills
// the one shared buffer, so sibling views see each other's fetches.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::codec::{DecodeError, zkint, zktime_string};
use crate::enums::{EventCode, PassageDirection, VerifyMode};
use crate::error::Error;
use crate::gateway::{RawRow, TableGateway};
use crate::model::{Model, Transaction};

/// One realtime event, decoded from a raw transaction-shaped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub time: NaiveDateTime,
    pub pin: String,
    pub card: String,
    pub door: u32,
    pub event_type: EventCode,
    pub entry_exit: PassageDirection,
    pub verify_mode: VerifyMode,
}

impl Event {
    /// Decode a raw realtime row. The row uses the transaction table's
    /// column names; the timestamp arrives in the plain
    /// `YYYY-MM-DD hh:mm:ss` form, unlike the packed stored-table variant.
    pub fn from_raw(row: &RawRow) -> Result<Self, DecodeError> {
        fn field<'a>(row: &'a RawRow, key: &'static str) -> Result<&'a str, DecodeError> {
            row.get(key).map(String::as_str).ok_or(DecodeError {
                raw: String::new(),
                expected: key,
            })
        }

        let door_raw = field(row, "DoorID")?;
        let door = u32::try_from(zkint::decode(door_raw)?).map_err(|_| DecodeError {
            raw: door_raw.to_owned(),
            expected: "door number",
        })?;

        Ok(Self {
            time: zktime_string::decode(field(row, "Time_second")?)?,
            pin: field(row, "Pin")?.to_owned(),
            card: field(row, "Cardno")?.to_owned(),
            door,
            event_type: crate::codec::decode_event_code(field(row, "EventType")?)?,
            entry_exit: crate::codec::decode_repr(field(row, "InOutState")?, "passage direction")?,
            verify_mode: crate::codec::decode_repr(field(row, "Verified")?, "verify mode")?,
        })
    }

    /// One-line human description.
    pub fn description(&self) -> String {
        format!(
            "Event[{}]: \"{}\" at door {} for card \"{}\" -- {}",
            self.time, self.event_type.description(), self.door, self.card, self.entry_exit
        )
    }
}

/// Attribute filter for event views. Every populated attribute must match
/// (AND across attributes); within one attribute any listed value matches
/// (OR). An attribute populated with an empty set matches nothing.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    doors: Option<BTreeSet<u32>>,
    event_types: Option<BTreeSet<u16>>,
    directions: Option<BTreeSet<PassageDirection>>,
    verify_modes: Option<BTreeSet<VerifyMode>>,
    cards: Option<BTreeSet<String>>,
    pins: Option<BTreeSet<String>>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn door(self, door: u32) -> Self {
        self.doors([door])
    }

    pub fn doors(mut self, doors: impl IntoIterator<Item = u32>) -> Self {
        self.doors = Some(doors.into_iter().collect());
        self
    }

    pub fn event_type(self, code: u16) -> Self {
        self.event_types([code])
    }

    pub fn event_types(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.event_types = Some(codes.into_iter().collect());
        self
    }

    pub fn direction(mut self, direction: PassageDirection) -> Self {
        self.directions = Some(BTreeSet::from([direction]));
        self
    }

    pub fn verify_mode(mut self, mode: VerifyMode) -> Self {
        self.verify_modes = Some(BTreeSet::from([mode]));
        self
    }

    pub fn card(mut self, card: impl Into<String>) -> Self {
        self.cards = Some(BTreeSet::from([card.into()]));
        self
    }

    pub fn pin(mut self, pin: impl Into<String>) -> Self {
        self.pins = Some(BTreeSet::from([pin.into()]));
        self
    }

    fn matches(&self, event: &Event) -> bool {
        fn check<T: Ord>(set: Option<&BTreeSet<T>>, value: &T) -> bool {
            set.is_none_or(|s| s.contains(value))
        }

        check(self.doors.as_ref(), &event.door)
            && check(self.event_types.as_ref(), &event.event_type.0)
            && check(self.directions.as_ref(), &event.entry_exit)
            && check(self.verify_modes.as_ref(), &event.verify_mode)
            && check(self.cards.as_ref(), &event.card)
            && check(self.pins.as_ref(), &event.pin)
    }
}

#[derive(Debug, Clone)]
enum EventPredicate {
    Match(EventQuery),
    /// Inclusive lower bound on event time.
    After(NaiveDateTime),
    /// Exclusive upper bound on event time.
    Before(NaiveDateTime),
}

impl EventPredicate {
    fn matches(&self, event: &Event) -> bool {
        match self {
            EventPredicate::Match(query) => query.matches(event),
            EventPredicate::After(time) => event.time >= *time,
            EventPredicate::Before(time) => event.time < *time,
        }
    }
}

/// Log of realtime events.
///
/// The log does not fill itself: call [`refresh`](EventLog::refresh)
/// periodically, or [`poll`](EventLog::poll) to block until something
/// matching arrives. The protocol is request/response, so there is no
/// tunnel the device could push through.
///
/// Cloning (or deriving a view) shares the underlying buffer; predicates
/// belong to the individual view and never remove anything from the
/// shared buffer.
#[derive(Clone)]
pub struct EventLog {
    gateway: Arc<dyn TableGateway>,
    buffer: Arc<Mutex<VecDeque<Event>>>,
    capacity: usize,
    predicates: Vec<EventPredicate>,
}

impl EventLog {
    /// Create a root log owning a fresh buffer bounded at `capacity`.
    pub fn new(gateway: Arc<dyn TableGateway>, capacity: usize) -> Self {
        Self {
            gateway,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
            predicates: Vec::new(),
        }
    }

    fn derived(&self, predicate: EventPredicate) -> Self {
        let mut view = self.clone();
        view.predicates.push(predicate);
        view
    }

    /// A view of this log restricted by an attribute filter. The view
    /// shares this log's buffer; predicates compose with AND.
    pub fn only(&self, query: EventQuery) -> Self {
        self.derived(EventPredicate::Match(query))
    }

    /// A view restricted to events at or after `time`.
    pub fn after_time(&self, time: NaiveDateTime) -> Self {
        self.derived(EventPredicate::After(time))
    }

    /// A view restricted to events strictly before `time`.
    pub fn before_time(&self, time: NaiveDateTime) -> Self {
        self.derived(EventPredicate::Before(time))
    }

    /// A view restricted to `from <= time < to`.
    pub fn between_time(&self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.after_time(from).before_time(to)
    }

    fn matches(&self, event: &Event) -> bool {
        self.predicates.iter().all(|p| p.matches(event))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Event>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Reads (no device I/O) ────────────────────────────────────────

    /// Snapshot of the buffered events visible through this view's
    /// predicates, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.lock()
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }

    /// Visible event at `index`, counting oldest first.
    pub fn get(&self, index: usize) -> Option<Event> {
        self.lock()
            .iter()
            .filter(|e| self.matches(e))
            .nth(index)
            .cloned()
    }

    /// Number of visible events.
    pub fn len(&self) -> usize {
        self.lock().iter().filter(|e| self.matches(e)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of buffered events, before this view's predicates.
    /// Identical across a root log and all of its views.
    pub fn buffered(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all buffered events (from every view, the buffer is shared).
    pub fn clear(&self) {
        self.lock().clear();
    }

    // ── Device I/O ───────────────────────────────────────────────────

    /// Fetch events recorded since the last fetch and append them to the
    /// shared buffer, evicting the oldest entries past capacity.
    ///
    /// Rows that fail to decode are skipped with a warning; the device's
    /// status-report rows (event type 255, emitted on every query) are
    /// dropped. Returns the newly appended events in received order,
    /// before view predicates — [`poll`](EventLog::poll) applies those.
    pub async fn refresh(&self) -> Result<Vec<Event>, Error> {
        let rows = self
            .gateway
            .read_unread_events(Transaction::TABLE_NAME)
            .await?;

        let mut fresh = Vec::new();
        for row in &rows {
            match Event::from_raw(row) {
                Ok(event) if event.event_type.is_heartbeat() => {}
                Ok(event) => fresh.push(event),
                Err(error) => {
                    warn!(%error, "skipping undecodable realtime event row");
                }
            }
        }

        if !fresh.is_empty() {
            let mut buffer = self.lock();
            for event in &fresh {
                if buffer.len() == self.capacity {
                    buffer.pop_front();
                }
                buffer.push_back(event.clone());
            }
            debug!(
                appended = fresh.len(),
                buffered = buffer.len(),
                "event log refreshed"
            );
        }
        Ok(fresh)
    }

    /// Wait for new events matching this view.
    ///
    /// Refreshes every `interval` until a refresh yields events that pass
    /// the view's predicates, then returns those immediately. An elapsed
    /// `timeout` yields an empty vec — a timeout is an ordinary outcome,
    /// not an error. Transport failures abort the wait and propagate.
    ///
    /// The deadline is advisory wall-clock: a slow device call may overrun
    /// it, in which case the overrunning refresh still completes.
    pub async fn poll(&self, timeout: Duration, interval: Duration) -> Result<Vec<Event>, Error> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }

            let fresh = self.refresh().await?;
            let matching: Vec<Event> =
                fresh.into_iter().filter(|e| self.matches(e)).collect();
            if !matching.is_empty() {
                return Ok(matching);
            }

            tokio::time::sleep(interval).await;
        }
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("buffered", &self.buffered())
            .field("capacity", &self.capacity)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_row() -> RawRow {
        let mut row = RawRow::new();
        row.insert("Time_second".into(), "2024-06-15 10:30:00".into());
        row.insert("Pin".into(), "1".into());
        row.insert("Cardno".into(), "16268812".into());
        row.insert("DoorID".into(), "1".into());
        row.insert("EventType".into(), "0".into());
        row.insert("InOutState".into(), "0".into());
        row.insert("Verified".into(), "4".into());
        row
    }

    #[test]
    fn event_decodes_from_raw_row() {
        let event = Event::from_raw(&sample_row()).unwrap();
        assert_eq!(event.card, "16268812");
        assert_eq!(event.door, 1);
        assert_eq!(event.event_type, EventCode(0));
        assert_eq!(event.entry_exit, PassageDirection::Entry);
        assert_eq!(event.verify_mode, VerifyMode::OnlyCard);
    }

    #[test]
    fn event_decode_fails_on_missing_field() {
        let mut row = sample_row();
        row.shift_remove("DoorID");
        assert!(Event::from_raw(&row).is_err());
    }

    #[test]
    fn event_decode_fails_on_bad_timestamp() {
        let mut row = sample_row();
        row.insert("Time_second".into(), "not a time".into());
        assert!(Event::from_raw(&row).is_err());
    }

    #[test]
    fn query_matches_with_and_across_attributes() {
        let event = Event::from_raw(&sample_row()).unwrap();

        assert!(EventQuery::new().door(1).matches(&event));
        assert!(!EventQuery::new().door(2).matches(&event));
        assert!(
            EventQuery::new()
                .door(1)
                .event_types([0, 1])
                .matches(&event)
        );
        assert!(
            !EventQuery::new()
                .door(1)
                .event_type(221)
                .matches(&event)
        );
    }

    #[test]
    fn query_with_empty_set_matches_nothing() {
        let event = Event::from_raw(&sample_row()).unwrap();
        assert!(!EventQuery::new().doors([]).matches(&event));
    }
}
