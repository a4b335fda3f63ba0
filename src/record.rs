use crate::error::{MalformedRecordError, MissingFieldError};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// One parsed input line: field names and textual values, kept in the order
/// the fields appeared in the record.
///
/// The corpus is overwhelmingly scalar-valued JSON objects, so values are
/// coerced to text on parse (numbers and bools via their display form). A
/// JSON `null` counts as an absent field. Nested objects/arrays are kept as
/// compact JSON text so no record is unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Look up a field by name. First occurrence wins if a key repeats.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Like [`Record::get`], but an absent field becomes a typed error so map
    /// stages can skip-and-count the record.
    pub fn field(&self, name: &'static str) -> Result<&str, MissingFieldError> {
        self.get(name).ok_or(MissingFieldError { field: name })
    }

    // Named accessors for the fields the jobs require.
    pub fn subreddit(&self) -> Result<&str, MissingFieldError> { self.field("subreddit") }
    pub fn parent_id(&self) -> Result<&str, MissingFieldError> { self.field("parent_id") }
    pub fn name(&self) -> Result<&str, MissingFieldError> { self.field("name") }
    pub fn created_utc(&self) -> Result<&str, MissingFieldError> { self.field("created_utc") }

    /// Number of present (non-null) fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse one line into a [`Record`]. The error carries the offending line and
/// the underlying JSON cause.
pub fn parse_record(line: &str) -> Result<Record, MalformedRecordError> {
    serde_json::from_str(line)
        .map_err(|source| MalformedRecordError { line: line.to_string(), source })
}

// ----------------------------- Deserialization ------------------------------
//
// A derive can't preserve field arrival order or coerce scalars to text, so
// Record carries a hand-written map visitor. Each value goes through
// FieldText, which textualizes scalars and marks null as absent.

struct FieldText(Option<String>);

impl<'de> Deserialize<'de> for FieldText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = FieldText;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldText, E> {
                Ok(FieldText(Some(v.to_string())))
            }
            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldText, E> {
                Ok(FieldText(Some(v.to_string())))
            }
            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldText, E> {
                Ok(FieldText(Some(v.to_string())))
            }
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldText, E> {
                Ok(FieldText(Some(v.to_string())))
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldText, E> {
                Ok(FieldText(Some(v.to_owned())))
            }
            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldText, E> {
                Ok(FieldText(Some(v)))
            }
            fn visit_unit<E: de::Error>(self) -> Result<FieldText, E> {
                Ok(FieldText(None))
            }
            fn visit_map<A>(self, map: A) -> Result<FieldText, A::Error>
            where
                A: MapAccess<'de>,
            {
                let v = serde_json::Value::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(FieldText(Some(v.to_string())))
            }
            fn visit_seq<A>(self, seq: A) -> Result<FieldText, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let v = serde_json::Value::deserialize(de::value::SeqAccessDeserializer::new(seq))?;
                Ok(FieldText(Some(v.to_string())))
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Record, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, FieldText>()? {
                    if let Some(text) = value.0 {
                        fields.push((key, text));
                    }
                }
                Ok(Record { fields })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
