//! `application/x-www-form-urlencoded` glue for serde records.
//!
//! Decoding groups repeated keys, so a `Vec<T>` field receives every value
//! and a scalar field receives the first one. Scalars are parsed from text
//! with `FromStr`. Absent keys behave exactly like absent JSON fields:
//!
//! | form option              | serde equivalent                              |
//! |--------------------------|-----------------------------------------------|
//! | alias                    | `#[serde(rename = "..")]` / `alias`           |
//! | zero when absent         | `#[serde(default)]` on the field              |
//! | presence flag            | `Option<T>`                                   |
//! | preserve default         | `#[serde(default)]` on the record + `Default` |
//! | omit when empty (encode) | `skip_serializing_if`                         |
//! | embedded record          | `#[serde(flatten)]` + [`text`] on its scalars |
//!
//! ## Embedded records
//!
//! Serde buffers the keys of a flattened record as untyped text before the
//! inner record sees them, so a flattened `u32` receives `"1"` instead of a
//! number. Scalars of an embedded record therefore go through [`text`],
//! which accepts the value either natively or as text:
//!
//! ```rust,ignore
//! #[derive(Deserialize)]
//! struct Owner {
//!     #[serde(with = "brrtrpc::binder::form::text")]
//!     uid: u32,
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Request {
//!     #[serde(flatten)]
//!     owner: Owner,
//!     limit: u32,
//! }
//!
//! let req: Request = form::from_str("uid=7&name=x&limit=3")?;
//! ```
//!
//! Fields of the outer record decode normally, and string fields need
//! nothing extra. JSON decoding is unaffected by [`text`].

use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer as _, IntoDeserializer, MapAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0}")]
    Custom(String),
    #[error("invalid {expected} value `{value}`")]
    InvalidValue { value: String, expected: &'static str },
    #[error("field `{0}` cannot be form encoded")]
    Nested(String),
    #[error("only records can be form encoded")]
    NotARecord,
}

impl de::Error for FormError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        FormError::Custom(msg.to_string())
    }
}

/// Parse a urlencoded string into `T`.
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, FormError> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect();
    from_pairs(&pairs)
}

/// Decode already split key/value pairs into `T`.
pub fn from_pairs<T: DeserializeOwned>(pairs: &[(String, String)]) -> Result<T, FormError> {
    T::deserialize(FormDeserializer::new(group(pairs)))
}

/// Encode a record as a urlencoded string.
///
/// `null` fields are skipped and sequences become repeated keys.
pub fn to_string<T: Serialize>(value: &T) -> Result<String, FormError> {
    let Value::Object(fields) =
        serde_json::to_value(value).map_err(|e| FormError::Custom(e.to_string()))?
    else {
        return Err(FormError::NotARecord);
    };
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    out.append_pair(key, &scalar_text(key, item)?);
                }
            }
            other => {
                out.append_pair(key, &scalar_text(key, other)?);
            }
        }
    }
    Ok(out.finish())
}

fn scalar_text(key: &str, value: &Value) -> Result<String, FormError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(FormError::Nested(key.to_string())),
    }
}

/// Group values by key, keys in first-seen order.
fn group(pairs: &[(String, String)]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (k, v) in pairs {
        match grouped.iter_mut().find(|(key, _)| key == k) {
            Some((_, values)) => values.push(v.clone()),
            None => grouped.push((k.clone(), vec![v.clone()])),
        }
    }
    grouped
}

struct FormDeserializer {
    fields: Vec<(String, Vec<String>)>,
}

impl FormDeserializer {
    fn new(fields: Vec<(String, Vec<String>)>) -> Self {
        Self { fields }
    }
}

impl<'de> de::Deserializer<'de> for FormDeserializer {
    type Error = FormError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(FieldMap {
            iter: self.fields.into_iter(),
            pending: None,
        })
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct FieldMap {
    iter: std::vec::IntoIter<(String, Vec<String>)>,
    pending: Option<Vec<String>>,
}

impl<'de> MapAccess<'de> for FieldMap {
    type Error = FormError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((key, values)) => {
                self.pending = Some(values);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        let values = self.pending.take().unwrap_or_default();
        seed.deserialize(FieldValues(values))
    }
}

/// All values given for one key.
struct FieldValues(Vec<String>);

impl FieldValues {
    fn first(self) -> Scalar {
        Scalar(self.0.into_iter().next().unwrap_or_default())
    }
}

macro_rules! first_scalar {
    ($de:lifetime; $($method:ident)*) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.first().$method(visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for FieldValues {
    type Error = FormError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.0.len() == 1 {
            self.first().deserialize_any(visitor)
        } else {
            self.deserialize_seq(visitor)
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(de::value::SeqDeserializer::new(self.0.into_iter().map(Scalar)))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.first().deserialize_enum(name, variants, visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    first_scalar! { 'de;
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64 deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_unit deserialize_identifier
    }

    forward_to_deserialize_any! {
        i128 u128 unit_struct tuple_struct map struct
    }
}

/// One textual value, parsed on demand.
struct Scalar(String);

impl<'de> IntoDeserializer<'de, FormError> for Scalar {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! parse_scalar {
    ($de:lifetime; $($method:ident => $visit:ident : $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                let parsed = self.0.trim().parse::<$ty>().map_err(|_| FormError::InvalidValue {
                    value: self.0.clone(),
                    expected: stringify!($ty),
                })?;
                visitor.$visit(parsed)
            }
        )*
    };
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

impl<'de> de::Deserializer<'de> for Scalar {
    type Error = FormError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_string(self.0)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match parse_bool(&self.0) {
            Some(b) => visitor.visit_bool(b),
            None => Err(FormError::InvalidValue {
                value: self.0,
                expected: "bool",
            }),
        }
    }

    parse_scalar! { 'de;
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_enum(self.0.into_deserializer())
    }

    forward_to_deserialize_any! {
        i128 u128 str string bytes byte_buf unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Field adapter for scalars of an embedded (`#[serde(flatten)]`) record.
///
/// Serializes the value unchanged. Deserializes from a native scalar or from
/// its textual form, parsed with `FromStr`.
pub mod text {
    use serde::de::{self, Deserializer, Visitor};
    use serde::{Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;
    use std::str::FromStr;

    /// # Errors
    ///
    /// Whatever the serializer reports for the value.
    pub fn serialize<T: Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    /// # Errors
    ///
    /// The value is neither a scalar nor text that parses as `T`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: fmt::Display,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TextVisitor(PhantomData))
    }

    struct TextVisitor<T>(PhantomData<T>);

    impl<T> TextVisitor<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        fn parse<E: de::Error>(text: &str) -> Result<T, E> {
            text.trim()
                .parse()
                .map_err(|err| E::custom(format!("invalid value `{text}`: {err}")))
        }
    }

    impl<'de, T> Visitor<'de> for TextVisitor<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a scalar or its textual form")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
            Self::parse(v)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<T, E> {
            Self::parse(&v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
            Self::parse(&v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
            Self::parse(&v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
            Self::parse(&v.to_string())
        }
    }
}
