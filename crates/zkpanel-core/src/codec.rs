// ── Raw field value codecs ──
//
// Pure encode/decode pairs between the panel's string wire values and
// native types. Every decoder returns `Result` — malformed device data is
// reported, never panicked on. Decoders with a device "no value" sentinel
// (`zkdate`'s `"0"`) decode it to `None` and encode `None` back to the
// exact sentinel string.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

use crate::enums::{EventCode, HolidayLoop, PassageDirection, RelayGroup, VerifyMode};

/// A raw string that could not be decoded into its field's type.
///
/// Carries the offending raw value so callers can still inspect what the
/// device actually sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode {raw:?} as {expected}")]
pub struct DecodeError {
    pub raw: String,
    pub expected: &'static str,
}

impl DecodeError {
    fn new(raw: &str, expected: &'static str) -> Self {
        Self {
            raw: raw.to_owned(),
            expected,
        }
    }
}

/// Decimal integer fields.
pub mod zkint {
    use super::DecodeError;

    pub fn decode(raw: &str) -> Result<i64, DecodeError> {
        raw.trim()
            .parse()
            .map_err(|_| DecodeError::new(raw, "integer"))
    }

    pub fn encode(value: i64) -> String {
        value.to_string()
    }
}

/// Boolean fields, stored as integers. Any non-zero value is true.
pub mod zkbool {
    use super::{DecodeError, zkint};

    pub fn decode(raw: &str) -> Result<bool, DecodeError> {
        zkint::decode(raw)
            .map(|v| v != 0)
            .map_err(|_| DecodeError::new(raw, "boolean"))
    }

    pub fn encode(value: bool) -> String {
        if value { "1".into() } else { "0".into() }
    }
}

/// Date fields in `YYYYMMDD` form. The device uses `"0"` as its
/// no-value marker; that round-trips as `None`.
pub mod zkdate {
    use super::{DecodeError, NaiveDate};

    pub const NO_VALUE: &str = "0";

    pub fn decode(raw: &str) -> Result<Option<NaiveDate>, DecodeError> {
        if raw == NO_VALUE {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y%m%d")
            .map(Some)
            .map_err(|_| DecodeError::new(raw, "YYYYMMDD date"))
    }

    pub fn encode(value: Option<&NaiveDate>) -> String {
        match value {
            Some(date) => date.format("%Y%m%d").to_string(),
            None => NO_VALUE.into(),
        }
    }
}

/// Timestamps in the panel's packed-seconds form:
/// `((year-2000)*12*31 + (month-1)*31 + (day-1)) * 86400 + seconds-of-day`.
/// Every month counts as 31 days in this scheme.
pub mod zkctime {
    use super::{Datelike, DecodeError, NaiveDate, NaiveDateTime, Timelike, zkint};

    pub fn decode(raw: &str) -> Result<NaiveDateTime, DecodeError> {
        let err = || DecodeError::new(raw, "packed timestamp");
        let v = zkint::decode(raw).map_err(|_| err())?;
        if v < 0 {
            return Err(err());
        }

        let year = i32::try_from(v / 32_140_800 + 2000).map_err(|_| err())?;
        let month = u32::try_from((v / 2_678_400) % 12 + 1).map_err(|_| err())?;
        let day = u32::try_from((v / 86_400) % 31 + 1).map_err(|_| err())?;
        let hour = u32::try_from((v / 3_600) % 24).map_err(|_| err())?;
        let minute = u32::try_from((v / 60) % 60).map_err(|_| err())?;
        let second = u32::try_from(v % 60).map_err(|_| err())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or_else(err)
    }

    pub fn encode(value: &NaiveDateTime) -> String {
        let days = i64::from(value.year() - 2000) * 12 * 31
            + i64::from(value.month() - 1) * 31
            + i64::from(value.day() - 1);
        let seconds = days * 86_400
            + i64::from(value.hour()) * 3_600
            + i64::from(value.minute()) * 60
            + i64::from(value.second());
        seconds.to_string()
    }
}

/// Timestamps in plain `YYYY-MM-DD hh:mm:ss` form (realtime event rows).
pub mod zktime_string {
    use super::{DecodeError, NaiveDateTime};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn decode(raw: &str) -> Result<NaiveDateTime, DecodeError> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .map_err(|_| DecodeError::new(raw, "YYYY-MM-DD hh:mm:ss timestamp"))
    }

    pub fn encode(value: &NaiveDateTime) -> String {
        value.format(FORMAT).to_string()
    }
}

/// Daily time ranges packed as `from_hhmm << 16 | to_hhmm`.
pub mod zktimerange {
    use super::{DecodeError, NaiveTime, Timelike, zkint};

    pub fn decode(raw: &str) -> Result<(NaiveTime, NaiveTime), DecodeError> {
        let err = || DecodeError::new(raw, "packed time range");
        let v = zkint::decode(raw).map_err(|_| err())?;
        let v = u32::try_from(v).map_err(|_| err())?;

        let unpack = |hhmm: u32| NaiveTime::from_hms_opt(hhmm / 100, hhmm % 100, 0);
        let from = unpack((v >> 16) & 0xffff).ok_or_else(err)?;
        let to = unpack(v & 0xffff).ok_or_else(err)?;
        Ok((from, to))
    }

    pub fn encode(value: &(NaiveTime, NaiveTime)) -> String {
        let pack = |t: &NaiveTime| t.hour() * 100 + t.minute();
        ((pack(&value.0) << 16) | pack(&value.1)).to_string()
    }
}

/// A 4-door authorization bitmask: bit `n` grants door `n + 1`.
pub mod zkdoors {
    use super::{DecodeError, zkint};

    pub fn decode(raw: &str) -> Result<[bool; 4], DecodeError> {
        let v = zkint::decode(raw).map_err(|_| DecodeError::new(raw, "door bitmask"))?;
        if !(0..16).contains(&v) {
            return Err(DecodeError::new(raw, "door bitmask"));
        }
        Ok([v & 1 != 0, v & 2 != 0, v & 4 != 0, v & 8 != 0])
    }

    pub fn encode(value: &[bool; 4]) -> String {
        value
            .iter()
            .enumerate()
            .filter(|(_, granted)| **granted)
            .fold(0i64, |mask, (bit, _)| mask | (1 << bit))
            .to_string()
    }
}

/// Which codec a field uses, for the dynamic (string-keyed) entry points
/// and for the per-table field registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Text,
    Integer,
    Boolean,
    Date,
    PackedDateTime,
    TimeRange,
    DoorsMask,
    VerifyMode,
    PassageDirection,
    EventCode,
    HolidayLoop,
    RelayGroup,
}

impl CodecKind {
    /// Check that a raw string is decodable under this codec.
    pub fn validate(self, raw: &str) -> Result<(), DecodeError> {
        match self {
            CodecKind::Text => Ok(()),
            CodecKind::Integer => zkint::decode(raw).map(drop),
            CodecKind::Boolean => zkbool::decode(raw).map(drop),
            CodecKind::Date => zkdate::decode(raw).map(drop),
            CodecKind::PackedDateTime => zkctime::decode(raw).map(drop),
            CodecKind::TimeRange => zktimerange::decode(raw).map(drop),
            CodecKind::DoorsMask => zkdoors::decode(raw).map(drop),
            CodecKind::VerifyMode => decode_repr::<VerifyMode>(raw, "verify mode").map(drop),
            CodecKind::PassageDirection => {
                decode_repr::<PassageDirection>(raw, "passage direction").map(drop)
            }
            CodecKind::EventCode => decode_event_code(raw).map(drop),
            CodecKind::HolidayLoop => decode_repr::<HolidayLoop>(raw, "holiday loop").map(drop),
            CodecKind::RelayGroup => decode_repr::<RelayGroup>(raw, "relay group").map(drop),
        }
    }
}

/// Decode an integer-coded enum via its `strum::FromRepr` impl.
pub(crate) fn decode_repr<E>(raw: &str, expected: &'static str) -> Result<E, DecodeError>
where
    E: FromWireCode,
{
    let code = zkint::decode(raw).map_err(|_| DecodeError::new(raw, expected))?;
    u8::try_from(code)
        .ok()
        .and_then(E::from_wire)
        .ok_or_else(|| DecodeError::new(raw, expected))
}

/// Event type codes pass through unknown values instead of failing.
pub(crate) fn decode_event_code(raw: &str) -> Result<EventCode, DecodeError> {
    let code = zkint::decode(raw).map_err(|_| DecodeError::new(raw, "event type code"))?;
    u16::try_from(code)
        .map(EventCode)
        .map_err(|_| DecodeError::new(raw, "event type code"))
}

/// Bridges `strum::FromRepr` enums into the generic decoder above, and
/// into [`EnumField`](crate::model::EnumField) handles.
pub trait FromWireCode: Sized {
    fn from_wire(code: u8) -> Option<Self>;
    fn wire_code(&self) -> u8;
}

macro_rules! impl_from_wire_code {
    ($($ty:ty),+ $(,)?) => {
        $(impl FromWireCode for $ty {
            fn from_wire(code: u8) -> Option<Self> {
                Self::from_repr(code)
            }
            fn wire_code(&self) -> u8 {
                self.code()
            }
        })+
    };
}

impl_from_wire_code!(VerifyMode, PassageDirection, HolidayLoop, RelayGroup);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        date(y, mo, d).and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn zkdate_round_trip() {
        let d = date(2021, 4, 15);
        assert_eq!(zkdate::decode(&zkdate::encode(Some(&d))).unwrap(), Some(d));
    }

    #[test]
    fn zkdate_no_value_sentinel_round_trips_exactly() {
        assert_eq!(zkdate::decode("0").unwrap(), None);
        assert_eq!(zkdate::encode(None), "0");
    }

    #[test]
    fn zkdate_rejects_garbage() {
        assert!(zkdate::decode("not-a-date").is_err());
        assert!(zkdate::decode("20211504").is_err());
    }

    #[test]
    fn zkctime_field_widths() {
        // Every month counts as 31 days in the packed scheme, so the
        // component divisors must not borrow across field boundaries.
        let dt = datetime(2017, 2, 9, 12, 37, 34);
        let encoded = zkctime::encode(&dt);
        assert_eq!(zkctime::decode(&encoded).unwrap(), dt);
    }

    #[test]
    fn zkctime_round_trip_spread() {
        for dt in [
            datetime(2000, 1, 1, 0, 0, 0),
            datetime(2010, 12, 31, 23, 59, 59),
            datetime(2024, 6, 15, 10, 30, 0),
        ] {
            assert_eq!(zkctime::decode(&zkctime::encode(&dt)).unwrap(), dt);
        }
    }

    #[test]
    fn zkctime_rejects_malformed() {
        assert!(zkctime::decode("").is_err());
        assert!(zkctime::decode("-5").is_err());
        assert!(zkctime::decode("12:30").is_err());
    }

    #[test]
    fn zktime_string_round_trip() {
        let dt = datetime(2024, 6, 15, 10, 30, 0);
        assert_eq!(
            zktime_string::decode("2024-06-15 10:30:00").unwrap(),
            dt
        );
        assert_eq!(zktime_string::encode(&dt), "2024-06-15 10:30:00");
    }

    #[test]
    fn zktimerange_round_trip() {
        let range = (
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 45, 0).unwrap(),
        );
        let encoded = zktimerange::encode(&range);
        assert_eq!(zktimerange::decode(&encoded).unwrap(), range);
    }

    #[test]
    fn zktimerange_rejects_invalid_times() {
        // 25:00 in the high half.
        let bad = (2500u32 << 16) | 1000;
        assert!(zktimerange::decode(&bad.to_string()).is_err());
    }

    #[test]
    fn zkbool_decodes_any_nonzero_as_true() {
        assert_eq!(zkbool::decode("0").unwrap(), false);
        assert_eq!(zkbool::decode("1").unwrap(), true);
        assert_eq!(zkbool::decode("15").unwrap(), true);
        assert!(zkbool::decode("yes").is_err());
    }

    #[test]
    fn zkdoors_round_trip() {
        let doors = [true, false, true, true];
        let encoded = zkdoors::encode(&doors);
        assert_eq!(encoded, "13");
        assert_eq!(zkdoors::decode(&encoded).unwrap(), doors);
    }

    #[test]
    fn zkdoors_rejects_out_of_range() {
        assert!(zkdoors::decode("16").is_err());
        assert!(zkdoors::decode("-1").is_err());
    }

    #[test]
    fn codec_kind_validate() {
        assert!(CodecKind::Integer.validate("42").is_ok());
        assert!(CodecKind::Integer.validate("forty-two").is_err());
        assert!(CodecKind::VerifyMode.validate("4").is_ok());
        assert!(CodecKind::VerifyMode.validate("2").is_err());
        assert!(CodecKind::Text.validate("anything at all").is_ok());
    }
}
