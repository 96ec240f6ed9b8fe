// ── Field registry and typed field handles ──
//
// Each table model carries a static registry of `FieldDef`s plus one
// `const` handle per field. Handles know their device column name and
// codec, so filter conditions and projections built from them are checked
// at compile time; the string-keyed entry points go through the registry
// and can fail with `UnknownField`.

use std::collections::BTreeSet;
use std::marker::PhantomData;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::codec::{self, CodecKind, DecodeError, FromWireCode, zkbool, zkctime, zkdate,
    zkdoors, zkint, zktimerange};
use crate::enums::EventCode;

/// Static description of one model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Rust-side accessor name (what `from_fields` and `select_names`
    /// validate against).
    pub name: &'static str,
    /// Column name in the device table.
    pub raw_name: &'static str,
    pub codec: CodecKind,
}

/// Object-safe view of a field handle — enough to name a projection.
pub trait TableField {
    fn raw_name(&self) -> &'static str;
}

/// A typed field handle: encodes and decodes values of its native type.
///
/// `decode_value` returning `Ok(None)` means the codec's device-specific
/// no-value sentinel (only dates have one); an absent field is handled one
/// level up, in `Model::get`.
pub trait FieldKind: TableField + Copy {
    type Value;

    fn decode_value(&self, raw: &str) -> Result<Option<Self::Value>, DecodeError>;
    fn encode_value(&self, value: &Self::Value) -> String;

    /// Equality condition on this field.
    fn eq(&self, value: impl Into<Self::Value>) -> Condition {
        Condition {
            raw_field: self.raw_name(),
            accepted: BTreeSet::from([self.encode_value(&value.into())]),
        }
    }

    /// Membership condition: the field may match any of `values` (OR
    /// within the field). An empty iterator yields a condition that
    /// matches nothing.
    fn is_in<T: Into<Self::Value>>(&self, values: impl IntoIterator<Item = T>) -> Condition {
        Condition {
            raw_field: self.raw_name(),
            accepted: values
                .into_iter()
                .map(|v| self.encode_value(&v.into()))
                .collect(),
        }
    }
}

/// One accumulated filter condition: a raw field and the set of raw
/// values it may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub(crate) raw_field: &'static str,
    pub(crate) accepted: BTreeSet<String>,
}

impl Condition {
    pub fn raw_field(&self) -> &'static str {
        self.raw_field
    }

    pub fn accepted(&self) -> &BTreeSet<String> {
        &self.accepted
    }
}

// ── Handle types, one per codec kind ────────────────────────────────

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            raw: &'static str,
        }

        impl $name {
            pub const fn new(raw: &'static str) -> Self {
                Self { raw }
            }
        }

        impl TableField for $name {
            fn raw_name(&self) -> &'static str {
                self.raw
            }
        }
    };
}

handle_type!(
    /// Plain string field.
    TextField
);
handle_type!(
    /// Decimal integer field.
    IntField
);
handle_type!(
    /// Integer-coded boolean field.
    BoolField
);
handle_type!(
    /// `YYYYMMDD` date field with the `"0"` no-value sentinel.
    DateField
);
handle_type!(
    /// Packed-seconds timestamp field.
    DateTimeField
);
handle_type!(
    /// Packed daily time-range field.
    TimeRangeField
);
handle_type!(
    /// 4-door authorization bitmask field.
    DoorsField
);
handle_type!(
    /// Realtime event type code field.
    EventCodeField
);

impl FieldKind for TextField {
    type Value = String;

    fn decode_value(&self, raw: &str) -> Result<Option<String>, DecodeError> {
        Ok(Some(raw.to_owned()))
    }

    fn encode_value(&self, value: &String) -> String {
        value.clone()
    }
}

impl FieldKind for IntField {
    type Value = i64;

    fn decode_value(&self, raw: &str) -> Result<Option<i64>, DecodeError> {
        zkint::decode(raw).map(Some)
    }

    fn encode_value(&self, value: &i64) -> String {
        zkint::encode(*value)
    }
}

impl FieldKind for BoolField {
    type Value = bool;

    fn decode_value(&self, raw: &str) -> Result<Option<bool>, DecodeError> {
        zkbool::decode(raw).map(Some)
    }

    fn encode_value(&self, value: &bool) -> String {
        zkbool::encode(*value)
    }
}

impl FieldKind for DateField {
    type Value = NaiveDate;

    fn decode_value(&self, raw: &str) -> Result<Option<NaiveDate>, DecodeError> {
        zkdate::decode(raw)
    }

    fn encode_value(&self, value: &NaiveDate) -> String {
        zkdate::encode(Some(value))
    }
}

impl FieldKind for DateTimeField {
    type Value = NaiveDateTime;

    fn decode_value(&self, raw: &str) -> Result<Option<NaiveDateTime>, DecodeError> {
        zkctime::decode(raw).map(Some)
    }

    fn encode_value(&self, value: &NaiveDateTime) -> String {
        zkctime::encode(value)
    }
}

impl FieldKind for TimeRangeField {
    type Value = (NaiveTime, NaiveTime);

    fn decode_value(&self, raw: &str) -> Result<Option<(NaiveTime, NaiveTime)>, DecodeError> {
        zktimerange::decode(raw).map(Some)
    }

    fn encode_value(&self, value: &(NaiveTime, NaiveTime)) -> String {
        zktimerange::encode(value)
    }
}

impl FieldKind for DoorsField {
    type Value = [bool; 4];

    fn decode_value(&self, raw: &str) -> Result<Option<[bool; 4]>, DecodeError> {
        zkdoors::decode(raw).map(Some)
    }

    fn encode_value(&self, value: &[bool; 4]) -> String {
        zkdoors::encode(value)
    }
}

impl FieldKind for EventCodeField {
    type Value = EventCode;

    fn decode_value(&self, raw: &str) -> Result<Option<EventCode>, DecodeError> {
        codec::decode_event_code(raw).map(Some)
    }

    fn encode_value(&self, value: &EventCode) -> String {
        value.0.to_string()
    }
}

/// Handle for integer-coded wire enums (`VerifyMode`, `PassageDirection`,
/// `HolidayLoop`, `RelayGroup`).
#[derive(Debug)]
pub struct EnumField<E> {
    raw: &'static str,
    expected: &'static str,
    _marker: PhantomData<E>,
}

impl<E> EnumField<E> {
    pub const fn new(raw: &'static str, expected: &'static str) -> Self {
        Self {
            raw,
            expected,
            _marker: PhantomData,
        }
    }
}

impl<E> Clone for EnumField<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EnumField<E> {}

impl<E> TableField for EnumField<E> {
    fn raw_name(&self) -> &'static str {
        self.raw
    }
}

impl<E: FromWireCode + Copy> FieldKind for EnumField<E> {
    type Value = E;

    fn decode_value(&self, raw: &str) -> Result<Option<E>, DecodeError> {
        codec::decode_repr(raw, self.expected).map(Some)
    }

    fn encode_value(&self, value: &E) -> String {
        value.wire_code().to_string()
    }
}
