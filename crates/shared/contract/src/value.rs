//! [`ContractValue`] implementations for standard, smart-pointer and `chrono` types.

use crate::contract::{DATE_ONLY_FORMAT, ValueTransform};
use crate::engine::{DeserializeContext, SerializeContext};
use crate::error::ContractError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::{Rc, Weak};
use std::sync::Arc;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A value that can be written and read through serialization contracts.
///
/// Described structs get this from `#[derive(Contract)]`; leaf values
/// convert directly.
pub trait ContractValue: Sized {
    /// Writes the value. `Ok(None)` asks the enclosing container to omit it.
    ///
    /// # Errors
    /// Unsupported transforms, encoding failures and nested object errors.
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError>;

    /// Reads the value from its wire form.
    ///
    /// # Errors
    /// Values of the wrong shape.
    fn read(
        value: &Value,
        cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError>;

    /// Whether the value equals its type's default (used by `skip_default`).
    fn is_default_value(&self) -> bool {
        false
    }

    /// Value used when the member is absent from the wire object.
    ///
    /// # Errors
    /// [`ContractError::MissingMember`] unless the type has a natural fallback.
    fn missing(member: &str) -> Result<Self, ContractError> {
        Err(ContractError::MissingMember {
            message: format!("`{member}` is required").into(),
            context: None,
        })
    }
}

fn reject_transform<T>(transform: Option<ValueTransform>) -> Result<(), ContractError> {
    match transform {
        None => Ok(()),
        Some(transform) => Err(ContractError::UnsupportedTransform {
            message: format!("`{transform}` cannot be applied to {}", std::any::type_name::<T>())
                .into(),
            context: None,
        }),
    }
}

macro_rules! leaf_values {
    ($($ty:ty => |$v:ident| $is_default:expr),* $(,)?) => {$(
        impl ContractValue for $ty {
            fn write(
                &self,
                _cx: &mut SerializeContext<'_>,
                transform: Option<ValueTransform>,
            ) -> Result<Option<Value>, ContractError> {
                reject_transform::<Self>(transform)?;
                serde_json::to_value(self).map(Some).map_err(|e| ContractError::encoding(&e))
            }

            fn read(
                value: &Value,
                _cx: &DeserializeContext<'_>,
                transform: Option<ValueTransform>,
            ) -> Result<Self, ContractError> {
                reject_transform::<Self>(transform)?;
                Ok(Self::deserialize(value)?)
            }

            fn is_default_value(&self) -> bool {
                let $v = self;
                $is_default
            }

            fn missing(_member: &str) -> Result<Self, ContractError> {
                Ok(Self::default())
            }
        }
    )*};
}

leaf_values! {
    bool => |v| !*v,
    i8 => |v| *v == 0,
    i16 => |v| *v == 0,
    i32 => |v| *v == 0,
    i64 => |v| *v == 0,
    isize => |v| *v == 0,
    u8 => |v| *v == 0,
    u16 => |v| *v == 0,
    u32 => |v| *v == 0,
    u64 => |v| *v == 0,
    usize => |v| *v == 0,
    f32 => |v| *v == 0.0,
    f64 => |v| *v == 0.0,
    char => |v| *v == '\0',
    String => |v| v.is_empty(),
}

impl ContractValue for Value {
    fn write(
        &self,
        _cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        reject_transform::<Self>(transform)?;
        Ok(Some(self.clone()))
    }

    fn read(
        value: &Value,
        _cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        reject_transform::<Self>(transform)?;
        Ok(value.clone())
    }

    fn is_default_value(&self) -> bool {
        self.is_null()
    }

    fn missing(_member: &str) -> Result<Self, ContractError> {
        Ok(Self::Null)
    }
}

impl<T: ContractValue> ContractValue for Option<T> {
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        match self {
            Some(inner) => inner.write(cx, transform),
            None => Ok(Some(Value::Null)),
        }
    }

    fn read(
        value: &Value,
        cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        if value.is_null() { Ok(None) } else { T::read(value, cx, transform).map(Some) }
    }

    fn is_default_value(&self) -> bool {
        self.is_none()
    }

    fn missing(_member: &str) -> Result<Self, ContractError> {
        Ok(None)
    }
}

impl<T: ContractValue> ContractValue for Vec<T> {
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        let mut items = Vec::with_capacity(self.len());
        for (index, item) in self.iter().enumerate() {
            if let Some(value) =
                item.write(cx, transform).map_err(|err| err.in_member(&index.to_string()))?
            {
                items.push(value);
            }
        }
        Ok(Some(Value::Array(items)))
    }

    fn read(
        value: &Value,
        cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        let Value::Array(items) = value else {
            return Err(ContractError::type_mismatch("an array", value));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::read(item, cx, transform).map_err(|err| err.in_member(&index.to_string()))
            })
            .collect()
    }

    fn is_default_value(&self) -> bool {
        self.is_empty()
    }

    fn missing(_member: &str) -> Result<Self, ContractError> {
        Ok(Self::new())
    }
}

/// Dictionary keys are data, not member names: no convention is applied.
fn write_entries<'a, T: ContractValue + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
    cx: &mut SerializeContext<'_>,
    transform: Option<ValueTransform>,
) -> Result<Option<Value>, ContractError> {
    let mut map = Map::new();
    for (key, item) in entries {
        if let Some(value) = item.write(cx, transform).map_err(|err| err.in_member(key))? {
            map.insert(key.clone(), value);
        }
    }
    Ok(Some(Value::Object(map)))
}

fn read_entries<T: ContractValue, C: FromIterator<(String, T)>>(
    value: &Value,
    cx: &DeserializeContext<'_>,
    transform: Option<ValueTransform>,
) -> Result<C, ContractError> {
    let Value::Object(object) = value else {
        return Err(ContractError::type_mismatch("an object", value));
    };
    object
        .iter()
        .map(|(key, item)| {
            T::read(item, cx, transform).map(|v| (key.clone(), v)).map_err(|err| err.in_member(key))
        })
        .collect()
}

impl<T: ContractValue> ContractValue for BTreeMap<String, T> {
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        write_entries(self.iter(), cx, transform)
    }

    fn read(
        value: &Value,
        cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        read_entries(value, cx, transform)
    }

    fn is_default_value(&self) -> bool {
        self.is_empty()
    }

    fn missing(_member: &str) -> Result<Self, ContractError> {
        Ok(Self::new())
    }
}

impl<T: ContractValue, S: BuildHasher + Default> ContractValue for HashMap<String, T, S> {
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        write_entries(self.iter(), cx, transform)
    }

    fn read(
        value: &Value,
        cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        read_entries(value, cx, transform)
    }

    fn is_default_value(&self) -> bool {
        self.is_empty()
    }

    fn missing(_member: &str) -> Result<Self, ContractError> {
        Ok(Self::default())
    }
}

macro_rules! pointer_values {
    ($($ptr:ident),* $(,)?) => {$(
        impl<T: ContractValue> ContractValue for $ptr<T> {
            fn write(
                &self,
                cx: &mut SerializeContext<'_>,
                transform: Option<ValueTransform>,
            ) -> Result<Option<Value>, ContractError> {
                (**self).write(cx, transform)
            }

            fn read(
                value: &Value,
                cx: &DeserializeContext<'_>,
                transform: Option<ValueTransform>,
            ) -> Result<Self, ContractError> {
                T::read(value, cx, transform).map($ptr::new)
            }

            fn is_default_value(&self) -> bool {
                (**self).is_default_value()
            }

            fn missing(member: &str) -> Result<Self, ContractError> {
                T::missing(member).map($ptr::new)
            }
        }
    )*};
}

pointer_values!(Box, Rc, Arc);

impl<T: ContractValue> ContractValue for RefCell<T> {
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        let inner = self.try_borrow().map_err(|_| ContractError::Internal {
            message: "value is mutably borrowed while being serialized".into(),
            context: Some(std::any::type_name::<T>().into()),
        })?;
        inner.write(cx, transform)
    }

    fn read(
        value: &Value,
        cx: &DeserializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        T::read(value, cx, transform).map(RefCell::new)
    }

    fn is_default_value(&self) -> bool {
        self.try_borrow().is_ok_and(|inner| inner.is_default_value())
    }

    fn missing(member: &str) -> Result<Self, ContractError> {
        T::missing(member).map(RefCell::new)
    }
}

/// Back-references: written through when alive, never rebuilt from the wire.
impl<T: ContractValue> ContractValue for Weak<T> {
    fn write(
        &self,
        cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        self.upgrade().map_or(Ok(Some(Value::Null)), |strong| strong.write(cx, transform))
    }

    fn read(
        _value: &Value,
        _cx: &DeserializeContext<'_>,
        _transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        Ok(Self::new())
    }

    fn is_default_value(&self) -> bool {
        self.strong_count() == 0
    }

    fn missing(_member: &str) -> Result<Self, ContractError> {
        Ok(Self::new())
    }
}

fn expect_str<'v>(value: &'v Value, expected: &str) -> Result<&'v str, ContractError> {
    value.as_str().ok_or_else(|| ContractError::type_mismatch(expected, value))
}

fn unparsable(expected: &str, raw: &str) -> ContractError {
    ContractError::TypeMismatch {
        message: format!("`{raw}` is not {expected}").into(),
        context: None,
    }
}

/// Accepts a plain date, an RFC 3339 timestamp or a naive ISO timestamp.
fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT).ok().map(|d| d.and_time(NaiveTime::MIN))
        })
}

impl ContractValue for NaiveDate {
    fn write(
        &self,
        _cx: &mut SerializeContext<'_>,
        _transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        Ok(Some(Value::String(self.format(DATE_ONLY_FORMAT).to_string())))
    }

    fn read(
        value: &Value,
        _cx: &DeserializeContext<'_>,
        _transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        let raw = expect_str(value, "a date string")?;
        NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT)
            .ok()
            .or_else(|| parse_instant(raw).map(|dt| dt.date()))
            .ok_or_else(|| unparsable("a date", raw))
    }
}

impl ContractValue for NaiveDateTime {
    fn write(
        &self,
        _cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        let formatted = match transform {
            Some(ValueTransform::DateOnly) => self.format(DATE_ONLY_FORMAT),
            None => self.format(DATE_TIME_FORMAT),
        };
        Ok(Some(Value::String(formatted.to_string())))
    }

    fn read(
        value: &Value,
        _cx: &DeserializeContext<'_>,
        _transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        let raw = expect_str(value, "a timestamp string")?;
        parse_instant(raw).ok_or_else(|| unparsable("a timestamp", raw))
    }
}

impl ContractValue for DateTime<Utc> {
    fn write(
        &self,
        _cx: &mut SerializeContext<'_>,
        transform: Option<ValueTransform>,
    ) -> Result<Option<Value>, ContractError> {
        let formatted = match transform {
            Some(ValueTransform::DateOnly) => self.format(DATE_ONLY_FORMAT).to_string(),
            None => self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        };
        Ok(Some(Value::String(formatted)))
    }

    fn read(
        value: &Value,
        _cx: &DeserializeContext<'_>,
        _transform: Option<ValueTransform>,
    ) -> Result<Self, ContractError> {
        let raw = expect_str(value, "a timestamp string")?;
        parse_instant(raw).map(|dt| dt.and_utc()).ok_or_else(|| unparsable("a timestamp", raw))
    }
}
