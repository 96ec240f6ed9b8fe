// ── Table models ──
//
// A model instance is one device table row. The unmodified raw row is the
// single source of truth: typed accessors decode on read, setters encode
// on write. That keeps the three-way distinction the device cares about —
// absent field, explicitly empty string, zero — and makes equality a plain
// raw-payload comparison.

pub mod field;
mod tables;

use std::sync::Arc;

use async_trait::async_trait;

use crate::codec::DecodeError;
use crate::error::Error;
use crate::gateway::{RawRow, TableGateway};

pub use field::{
    BoolField, Condition, DateField, DateTimeField, DoorsField, EnumField, EventCodeField,
    FieldDef, FieldKind, IntField, TableField, TextField, TimeRangeField,
};
pub use tables::{
    FirstCard, Holiday, InOutFun, MultiCard, TemplateV10, Timezone, Transaction, User,
    UserAuthorize,
};

/// One row of a named device table.
///
/// Implementations are generated by [`define_table!`]; the trait's provided
/// methods carry all the shared row behavior. A record is *bound* once it
/// holds a gateway reference (rows read through a `QuerySet` come back
/// bound); `save`/`delete` on an unbound record fail with
/// [`Error::NotBound`].
#[async_trait]
pub trait Model: Clone + Default + Send + Sync + Sized + 'static {
    /// Model name for error messages.
    const MODEL_NAME: &'static str;
    /// Table name on the device.
    const TABLE_NAME: &'static str;

    /// Ordered field registry of this table.
    fn field_defs() -> &'static [FieldDef];

    /// Raw names of the fields forming the table's natural key.
    fn key_fields() -> &'static [&'static str];

    /// Build an instance from a device row. Unknown columns are dropped;
    /// nothing is decoded yet, so junk values surface only on typed access.
    fn from_raw(raw: RawRow) -> Self;

    /// The raw string payload, exactly as received from or destined to the
    /// device. Contains only fields that are present.
    fn raw_data(&self) -> &RawRow;

    #[doc(hidden)]
    fn raw_data_mut(&mut self) -> &mut RawRow;

    /// The bound gateway, if any.
    fn gateway(&self) -> Option<&Arc<dyn TableGateway>>;

    /// Attach a gateway, enabling `save`/`delete`.
    fn bind(self, gateway: Arc<dyn TableGateway>) -> Self;

    // ── Provided behavior ────────────────────────────────────────────

    /// Typed read of one field. `Ok(None)` means the field is absent from
    /// the row or holds the codec's no-value sentinel.
    fn get<K: FieldKind>(&self, field: K) -> Result<Option<K::Value>, DecodeError> {
        match self.raw_data().get(field.raw_name()) {
            None => Ok(None),
            Some(raw) => field.decode_value(raw),
        }
    }

    /// Typed write of one field: encodes immediately into the raw payload.
    fn set<K: FieldKind>(&mut self, field: K, value: impl Into<K::Value>) {
        let raw = field.encode_value(&value.into());
        self.raw_data_mut().insert(field.raw_name().to_owned(), raw);
    }

    /// Builder-style [`set`](Model::set).
    fn with<K: FieldKind>(mut self, field: K, value: impl Into<K::Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Remove a field from the row, returning it to the absent state.
    fn unset<K: FieldKind>(&mut self, field: K) {
        self.raw_data_mut().shift_remove(field.raw_name());
    }

    /// Build an instance from `(field name, raw value)` pairs. Field names
    /// are validated against the registry and values against their codec —
    /// the string-keyed counterpart of the typed builder.
    fn from_fields<'a, I>(fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Self::default();
        for (name, value) in fields {
            let def = Self::field_defs()
                .iter()
                .find(|def| def.name == name)
                .ok_or_else(|| Error::unknown_field(Self::MODEL_NAME, name))?;
            def.codec.validate(value)?;
            record
                .raw_data_mut()
                .insert(def.raw_name.to_owned(), value.to_owned());
        }
        Ok(record)
    }

    /// Every field of the row in registry order, absent ones included as
    /// `None`. Values are the raw wire strings; use the typed accessors
    /// for decoded values.
    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        Self::field_defs()
            .iter()
            .map(|def| {
                (
                    def.name,
                    self.raw_data().get(def.raw_name).map(String::as_str),
                )
            })
            .collect()
    }

    /// The raw payload to send on a write: present fields only, in
    /// registry order. Absent fields are omitted so a partial update never
    /// clobbers device fields the caller did not touch.
    fn to_raw(&self) -> RawRow {
        let mut row = RawRow::new();
        for def in Self::field_defs() {
            if let Some(value) = self.raw_data().get(def.raw_name) {
                row.insert(def.raw_name.to_owned(), value.clone());
            }
        }
        row
    }

    /// The row identity used for deletes: the natural-key projection when
    /// every key field is present, otherwise the full payload (the device
    /// accepts either).
    fn key_row(&self) -> RawRow {
        let keys = Self::key_fields();
        let complete = !keys.is_empty()
            && keys.iter().all(|key| self.raw_data().contains_key(*key));
        if !complete {
            return self.to_raw();
        }
        let mut row = RawRow::new();
        for key in keys {
            if let Some(value) = self.raw_data().get(*key) {
                row.insert((*key).to_owned(), value.clone());
            }
        }
        row
    }

    /// Upsert this row on the device. Requires a bound gateway.
    async fn save(&self) -> Result<(), Error> {
        let gateway = self.gateway().ok_or(Error::NotBound)?;
        gateway
            .write_table(Self::TABLE_NAME, vec![self.to_raw()])
            .await?;
        Ok(())
    }

    /// Delete this row from the device by its natural key. Requires a
    /// bound gateway.
    async fn delete(&self) -> Result<(), Error> {
        let gateway = self.gateway().ok_or(Error::NotBound)?;
        gateway
            .delete_table(Self::TABLE_NAME, vec![self.key_row()])
            .await?;
        Ok(())
    }
}

/// Declare a device table model: the struct, one `const` field handle per
/// field, typed accessors, and the [`Model`] impl.
macro_rules! define_table {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            table: $table:literal,
            keys: [$($key:literal),* $(,)?],
            fields: {
                $(
                    $(#[$fmeta:meta])*
                    $accessor:ident[$handle:ident] => $kind:ident($raw:literal)
                ),+ $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            raw: $crate::gateway::RawRow,
            gateway: ::std::option::Option<
                ::std::sync::Arc<dyn $crate::gateway::TableGateway>,
            >,
        }

        impl $name {
            $(
                $(#[$fmeta])*
                pub const $handle: define_table!(@handle_ty $kind) =
                    define_table!(@handle_new $kind, $raw);
            )+

            /// Create an empty, unbound record. All fields start absent.
            pub fn new() -> Self {
                Self {
                    raw: $crate::gateway::RawRow::new(),
                    gateway: ::std::option::Option::None,
                }
            }

            $(
                define_table!(@accessor $accessor, $raw, $kind);
            )+
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        // Equality is raw-payload equality; the gateway binding is ignored.
        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.raw == other.raw
            }
        }

        impl ::std::cmp::Eq for $name {}

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut out = f.debug_struct(stringify!($name));
                for def in <Self as $crate::model::Model>::field_defs() {
                    if let ::std::option::Option::Some(value) = self.raw.get(def.raw_name) {
                        out.field(def.name, value);
                    }
                }
                out.finish()
            }
        }

        impl $crate::model::Model for $name {
            const MODEL_NAME: &'static str = stringify!($name);
            const TABLE_NAME: &'static str = $table;

            fn field_defs() -> &'static [$crate::model::FieldDef] {
                const FIELDS: &[$crate::model::FieldDef] = &[
                    $(
                        $crate::model::FieldDef {
                            name: stringify!($accessor),
                            raw_name: $raw,
                            codec: define_table!(@codec_kind $kind),
                        },
                    )+
                ];
                FIELDS
            }

            fn key_fields() -> &'static [&'static str] {
                &[$($key),*]
            }

            fn from_raw(raw: $crate::gateway::RawRow) -> Self {
                let mut known = $crate::gateway::RawRow::new();
                for def in <Self as $crate::model::Model>::field_defs() {
                    if let ::std::option::Option::Some(value) = raw.get(def.raw_name) {
                        known.insert(def.raw_name.to_owned(), value.clone());
                    }
                }
                Self {
                    raw: known,
                    gateway: ::std::option::Option::None,
                }
            }

            fn raw_data(&self) -> &$crate::gateway::RawRow {
                &self.raw
            }

            #[doc(hidden)]
            fn raw_data_mut(&mut self) -> &mut $crate::gateway::RawRow {
                &mut self.raw
            }

            fn gateway(
                &self,
            ) -> ::std::option::Option<&::std::sync::Arc<dyn $crate::gateway::TableGateway>>
            {
                self.gateway.as_ref()
            }

            fn bind(
                mut self,
                gateway: ::std::sync::Arc<dyn $crate::gateway::TableGateway>,
            ) -> Self {
                self.gateway = ::std::option::Option::Some(gateway);
                self
            }
        }
    };

    // ── Typed accessors ─────────────────────────────────────────────

    (@accessor $accessor:ident, $raw:literal, text) => {
        pub fn $accessor(&self) -> ::std::option::Option<&str> {
            self.raw.get($raw).map(::std::string::String::as_str)
        }
    };
    (@accessor $accessor:ident, $raw:literal, $kind:ident) => {
        pub fn $accessor(
            &self,
        ) -> ::std::result::Result<
            ::std::option::Option<define_table!(@value_ty $kind)>,
            $crate::codec::DecodeError,
        > {
            match self.raw.get($raw) {
                ::std::option::Option::None => ::std::result::Result::Ok(
                    ::std::option::Option::None,
                ),
                ::std::option::Option::Some(value) => {
                    $crate::model::FieldKind::decode_value(
                        &define_table!(@handle_new $kind, $raw),
                        value,
                    )
                }
            }
        }
    };

    // ── Kind dispatch ───────────────────────────────────────────────

    (@handle_ty text) => { $crate::model::TextField };
    (@handle_ty int) => { $crate::model::IntField };
    (@handle_ty boolean) => { $crate::model::BoolField };
    (@handle_ty date) => { $crate::model::DateField };
    (@handle_ty datetime) => { $crate::model::DateTimeField };
    (@handle_ty time_range) => { $crate::model::TimeRangeField };
    (@handle_ty doors) => { $crate::model::DoorsField };
    (@handle_ty event_code) => { $crate::model::EventCodeField };
    (@handle_ty verify_mode) => {
        $crate::model::EnumField<$crate::enums::VerifyMode>
    };
    (@handle_ty passage) => {
        $crate::model::EnumField<$crate::enums::PassageDirection>
    };
    (@handle_ty holiday_loop) => {
        $crate::model::EnumField<$crate::enums::HolidayLoop>
    };
    (@handle_ty relay_group) => {
        $crate::model::EnumField<$crate::enums::RelayGroup>
    };

    (@handle_new text, $raw:literal) => { $crate::model::TextField::new($raw) };
    (@handle_new int, $raw:literal) => { $crate::model::IntField::new($raw) };
    (@handle_new boolean, $raw:literal) => { $crate::model::BoolField::new($raw) };
    (@handle_new date, $raw:literal) => { $crate::model::DateField::new($raw) };
    (@handle_new datetime, $raw:literal) => { $crate::model::DateTimeField::new($raw) };
    (@handle_new time_range, $raw:literal) => { $crate::model::TimeRangeField::new($raw) };
    (@handle_new doors, $raw:literal) => { $crate::model::DoorsField::new($raw) };
    (@handle_new event_code, $raw:literal) => { $crate::model::EventCodeField::new($raw) };
    (@handle_new verify_mode, $raw:literal) => {
        $crate::model::EnumField::new($raw, "verify mode")
    };
    (@handle_new passage, $raw:literal) => {
        $crate::model::EnumField::new($raw, "passage direction")
    };
    (@handle_new holiday_loop, $raw:literal) => {
        $crate::model::EnumField::new($raw, "holiday loop")
    };
    (@handle_new relay_group, $raw:literal) => {
        $crate::model::EnumField::new($raw, "relay group")
    };

    (@codec_kind text) => { $crate::codec::CodecKind::Text };
    (@codec_kind int) => { $crate::codec::CodecKind::Integer };
    (@codec_kind boolean) => { $crate::codec::CodecKind::Boolean };
    (@codec_kind date) => { $crate::codec::CodecKind::Date };
    (@codec_kind datetime) => { $crate::codec::CodecKind::PackedDateTime };
    (@codec_kind time_range) => { $crate::codec::CodecKind::TimeRange };
    (@codec_kind doors) => { $crate::codec::CodecKind::DoorsMask };
    (@codec_kind event_code) => { $crate::codec::CodecKind::EventCode };
    (@codec_kind verify_mode) => { $crate::codec::CodecKind::VerifyMode };
    (@codec_kind passage) => { $crate::codec::CodecKind::PassageDirection };
    (@codec_kind holiday_loop) => { $crate::codec::CodecKind::HolidayLoop };
    (@codec_kind relay_group) => { $crate::codec::CodecKind::RelayGroup };

    (@value_ty int) => { i64 };
    (@value_ty boolean) => { bool };
    (@value_ty date) => { ::chrono::NaiveDate };
    (@value_ty datetime) => { ::chrono::NaiveDateTime };
    (@value_ty time_range) => { (::chrono::NaiveTime, ::chrono::NaiveTime) };
    (@value_ty doors) => { [bool; 4] };
    (@value_ty event_code) => { $crate::enums::EventCode };
    (@value_ty verify_mode) => { $crate::enums::VerifyMode };
    (@value_ty passage) => { $crate::enums::PassageDirection };
    (@value_ty holiday_loop) => { $crate::enums::HolidayLoop };
    (@value_ty relay_group) => { $crate::enums::RelayGroup };
}

pub(crate) use define_table;
