use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A book document as stored in the index.
///
/// Missing or `null` fields decode to their zero value and unknown fields are
/// ignored, so `{}` is a valid (empty) book. Only malformed JSON or a field of
/// the wrong type is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub year: i64,
}

/// Field map sent as a partial update.
pub type BookFields = Map<String, Value>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Book {
    pub fn from_payload(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Reads a stored source. The engine keeps the source as sent and only
    /// coerces values into its field mappings, so a source may hold `"1966"`
    /// for `year`. Values that do not fit fall back to zero.
    pub fn from_source(source: &BookFields) -> Self {
        Book {
            title: source.get("title").and_then(text_value).unwrap_or_default(),
            author: source.get("author").and_then(text_value).unwrap_or_default(),
            year: source.get("year").and_then(long_value).unwrap_or_default(),
        }
    }

    pub fn to_source(&self) -> BookFields {
        let mut source = BookFields::new();
        source.insert("title".to_string(), Value::from(self.title.clone()));
        source.insert("author".to_string(), Value::from(self.author.clone()));
        source.insert("year".to_string(), Value::from(self.year));
        source
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn long_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldMapping {
    Text,
    Long,
}

const BOOK_MAPPINGS: [(&str, FieldMapping); 3] = [
    ("title", FieldMapping::Text),
    ("author", FieldMapping::Text),
    ("year", FieldMapping::Long),
];

fn fits_mapping(value: &Value, mapping: FieldMapping) -> bool {
    match (value, mapping) {
        (Value::Null, _) => true,
        (Value::Array(items), _) => items
            .iter()
            .all(|item| !item.is_array() && fits_mapping(item, mapping)),
        (Value::Object(_), _) => false,
        (_, FieldMapping::Text) => true,
        (_, FieldMapping::Long) => long_value(value).is_some(),
    }
}

/// Checks a source against the index mappings for the book fields, the way
/// the engine rejects a document it cannot parse. Other fields are unmapped.
pub fn check_mappings(source: &BookFields) -> Result<(), String> {
    for (field, mapping) in BOOK_MAPPINGS {
        if let Some(value) = source.get(field) {
            if !fits_mapping(value, mapping) {
                return Err(format!(
                    "mapper_parsing_exception: failed to parse field [{}] of type [{}]",
                    field,
                    match mapping {
                        FieldMapping::Text => "text",
                        FieldMapping::Long => "long",
                    }
                ));
            }
        }
    }
    Ok(())
}

/// Decodes an update body. The body must be a JSON object.
pub fn fields_from_payload(body: &[u8]) -> Result<BookFields, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Applies `updates` onto `target` the way the index engine merges a partial
/// document: nested objects merge key by key, anything else is replaced.
pub fn merge_fields(target: &mut BookFields, updates: &BookFields) {
    for (key, value) in updates {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(patch)) => merge_fields(existing, patch),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
