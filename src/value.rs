// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Attributes and their typed values.

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use log::kv::ToValue;

/// The value of an [`Attr`].
#[derive(Clone)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed integer; both `isize` and `i64` end up here.
    Int64(i64),
    /// An unsigned integer.
    Uint64(u64),
    /// A floating point number.
    Float64(f64),
    /// A string.
    String(String),
    /// A span of time.
    Duration(Duration),
    /// A point in time.
    Time(DateTime<Utc>),
    /// An ordered list of attributes under a common namespace.
    Group(Vec<Attr>),
    /// Any other value, represented by its [`Debug`] output.
    Any(Arc<dyn Debug + Send + Sync>),
}

impl Value {
    /// Wrap an arbitrary value.
    pub fn any<T: Debug + Send + Sync + 'static>(value: T) -> Self {
        Value::Any(Arc::new(value))
    }

    /// Whether this is a group value.
    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }
}

impl PartialEq for Value {
    /// Compare two values.
    ///
    /// [`Value::Any`] values are equal if their debug representations are.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            (Value::Any(a), Value::Any(b)) => format!("{:?}", a) == format!("{:?}", b),
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            Value::Uint64(v) => f.debug_tuple("Uint64").field(v).finish(),
            Value::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Group(v) => f.debug_tuple("Group").field(v).finish(),
            Value::Any(v) => f.debug_tuple("Any").field(v).finish(),
        }
    }
}

impl Display for Value {
    /// Format the bare value.
    ///
    /// Groups are written as space separated `key=value` pairs of their
    /// members, keyed relative to the group.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Uint64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Duration(v) => write!(f, "{:?}", v),
            Value::Time(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Group(attrs) => {
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", attr)?;
                }
                Ok(())
            }
            Value::Any(v) => write!(f, "{:?}", v),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> log::kv::Value<'_> {
        match self {
            Value::Bool(v) => v.to_value(),
            Value::Int64(v) => v.to_value(),
            Value::Uint64(v) => v.to_value(),
            Value::Float64(v) => v.to_value(),
            Value::String(v) => v.as_str().to_value(),
            Value::Duration(v) => log::kv::Value::from_debug(v),
            Value::Any(v) => log::kv::Value::from_dyn_debug(v),
            Value::Time(_) | Value::Group(_) => log::kv::Value::from_display(self),
        }
    }
}

impl<'v> From<log::kv::Value<'v>> for Value {
    /// Convert a `log` key-value into the closest kind of value.
    fn from(value: log::kv::Value<'v>) -> Self {
        if let Some(v) = value.to_bool() {
            Value::Bool(v)
        } else if let Some(v) = value.to_i64() {
            Value::Int64(v)
        } else if let Some(v) = value.to_u64() {
            Value::Uint64(v)
        } else if let Some(v) = value.to_f64() {
            Value::Float64(v)
        } else {
            Value::String(value.to_string())
        }
    }
}

/// A key and a value to add to a log record.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    /// The key of this attribute.
    pub key: Cow<'static, str>,
    /// The value of this attribute.
    pub value: Value,
}

impl Attr {
    /// Create an attribute from a `key` and a `value`.
    pub fn new<K: Into<Cow<'static, str>>>(key: K, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// A boolean attribute.
    pub fn bool<K: Into<Cow<'static, str>>>(key: K, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    /// A platform sized integer attribute, stored as [`Value::Int64`].
    pub fn int<K: Into<Cow<'static, str>>>(key: K, value: isize) -> Self {
        Self::new(key, Value::Int64(value as i64))
    }

    /// A 64-bit integer attribute.
    pub fn int64<K: Into<Cow<'static, str>>>(key: K, value: i64) -> Self {
        Self::new(key, Value::Int64(value))
    }

    /// An unsigned 64-bit integer attribute.
    pub fn uint64<K: Into<Cow<'static, str>>>(key: K, value: u64) -> Self {
        Self::new(key, Value::Uint64(value))
    }

    /// A floating point attribute.
    pub fn float64<K: Into<Cow<'static, str>>>(key: K, value: f64) -> Self {
        Self::new(key, Value::Float64(value))
    }

    /// A string attribute.
    pub fn string<K: Into<Cow<'static, str>>, V: Into<String>>(key: K, value: V) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    /// A duration attribute.
    pub fn duration<K: Into<Cow<'static, str>>>(key: K, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    /// A timestamp attribute.
    pub fn time<K: Into<Cow<'static, str>>>(key: K, value: DateTime<Utc>) -> Self {
        Self::new(key, Value::Time(value))
    }

    /// A group attribute holding `attrs` in order.
    pub fn group<K: Into<Cow<'static, str>>>(key: K, attrs: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(attrs))
    }

    /// An attribute of any other type.
    pub fn any<K, T>(key: K, value: T) -> Self
    where
        K: Into<Cow<'static, str>>,
        T: Debug + Send + Sync + 'static,
    {
        Self::new(key, Value::any(value))
    }

    /// Flatten this attribute into `(key, value)` pairs.
    ///
    /// Group members get the group key and a `.` prepended to their own key,
    /// recursively; `prefix` is prepended to all keys likewise.  Empty groups
    /// produce nothing.
    pub fn flatten<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
        let key = if prefix.is_empty() {
            self.key.to_string()
        } else {
            format!("{}.{}", prefix, self.key)
        };
        match &self.value {
            Value::Group(attrs) => {
                for attr in attrs {
                    attr.flatten(&key, out);
                }
            }
            value => out.push((key, value)),
        }
    }
}

impl Display for Attr {
    /// Format as `key=value`, with group members as `group.key=value`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut pairs = Vec::new();
        self.flatten("", &mut pairs);
        for (i, (key, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{Attr, Value};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Bool(v) => serializer.serialize_bool(*v),
                Value::Int64(v) => serializer.serialize_i64(*v),
                Value::Uint64(v) => serializer.serialize_u64(*v),
                Value::Float64(v) => serializer.serialize_f64(*v),
                Value::String(v) => serializer.serialize_str(v),
                Value::Duration(v) => serializer.serialize_f64(v.as_secs_f64()),
                Value::Time(v) => v.serialize(serializer),
                Value::Group(attrs) => {
                    let mut map = serializer.serialize_map(Some(attrs.len()))?;
                    for attr in attrs {
                        map.serialize_entry(attr.key.as_ref(), &attr.value)?;
                    }
                    map.end()
                }
                Value::Any(v) => serializer.collect_str(&format_args!("{:?}", v)),
            }
        }
    }

    impl Serialize for Attr {
        /// Serialize as a map with a single entry.
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(self.key.as_ref(), &self.value)?;
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use log::kv::ToValue;
    use similar_asserts::assert_eq;

    use super::{Attr, Value};

    #[derive(Debug)]
    struct Browser {
        #[allow(dead_code)]
        js: bool,
    }

    #[test]
    fn int_is_int64() {
        assert_eq!(Attr::int("foo", 42), Attr::int64("foo", 42));
    }

    #[test]
    fn any_compares_debug_output() {
        assert_eq!(
            Attr::any("browser", Browser { js: true }),
            Attr::any("browser", Browser { js: true })
        );
        assert!(Attr::any("browser", Browser { js: true }) != Attr::any("browser", 1));
    }

    #[test]
    fn display() {
        let time = Utc.with_ymd_and_hms(2023, 10, 4, 12, 30, 0).unwrap();
        let cases = vec![
            (Attr::bool("pif", true), "pif=true"),
            (Attr::int("foo", -42), "foo=-42"),
            (Attr::uint64("foo", 42), "foo=42"),
            (Attr::float64("ratio", 2.5), "ratio=2.5"),
            (Attr::string("bar", "oom"), "bar=oom"),
            (Attr::duration("timeout", Duration::from_secs(30)), "timeout=30s"),
            (Attr::time("at", time), "at=2023-10-04T12:30:00Z"),
            (Attr::any("browser", Browser { js: false }), "browser=Browser { js: false }"),
        ];
        for (attr, expected) in cases {
            assert_eq!(attr.to_string(), expected);
        }
    }

    #[test]
    fn display_nested_group() {
        let attr = Attr::group(
            "ziz",
            vec![
                Attr::int("foo", 42),
                Attr::group("inner", vec![Attr::string("bar", "oom")]),
            ],
        );
        assert_eq!(attr.to_string(), "ziz.foo=42 ziz.inner.bar=oom");
    }

    #[test]
    fn flatten_with_prefix() {
        let attr = Attr::group("cfg", vec![Attr::int("foo", 42), Attr::group("empty", vec![])]);
        let mut pairs = Vec::new();
        attr.flatten("outer", &mut pairs);
        assert_eq!(pairs, vec![("outer.cfg.foo".to_string(), &Value::Int64(42))]);
    }

    #[test]
    fn to_log_value() {
        assert_eq!(Value::Int64(42).to_value().to_i64(), Some(42));
        assert_eq!(Value::Uint64(7).to_value().to_u64(), Some(7));
        assert_eq!(Value::Bool(true).to_value().to_bool(), Some(true));
        assert_eq!(
            Value::String("oom".into()).to_value().to_borrowed_str(),
            Some("oom")
        );
        assert_eq!(
            Value::Duration(Duration::from_millis(1500)).to_value().to_string(),
            "1.5s"
        );
    }

    #[test]
    fn from_log_value() {
        assert_eq!(Value::from(true.to_value()), Value::Bool(true));
        assert_eq!(Value::from((-3_i32).to_value()), Value::Int64(-3));
        assert_eq!(Value::from(u64::MAX.to_value()), Value::Uint64(u64::MAX));
        assert_eq!(Value::from(0.5_f64.to_value()), Value::Float64(0.5));
        assert_eq!(Value::from("oom".to_value()), Value::String("oom".into()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_group() {
        let attr = Attr::group(
            "cfg",
            vec![
                Attr::int("foo", 42),
                Attr::string("bar", "oom"),
                Attr::duration("timeout", Duration::from_millis(1500)),
            ],
        );
        assert_eq!(
            serde_json::to_value(&attr).unwrap(),
            serde_json::json!({"cfg": {"foo": 42, "bar": "oom", "timeout": 1.5}})
        );
    }
}
