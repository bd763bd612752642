use std::collections::BTreeMap;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value as JsonValue};

use crate::error::{invalid_argument, DocstoreResult};
use crate::model::{DatabaseId, DocumentKey, GeoPoint, Timestamp};
use crate::value::{BytesValue, DocstoreValue, MapValue, ValueKind};

/// Encodes and decodes values between their client form and the JSON wire
/// form understood by the backend.
#[derive(Clone, Debug)]
pub struct JsonProtoSerializer {
    database_id: DatabaseId,
}

impl JsonProtoSerializer {
    pub fn new(database_id: DatabaseId) -> Self {
        Self { database_id }
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.database_id
    }

    pub fn database_name(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.database_id.project_id(),
            self.database_id.database()
        )
    }

    fn documents_prefix(&self) -> String {
        format!("{}/documents", self.database_name())
    }

    pub fn document_name(&self, key: &DocumentKey) -> String {
        format!(
            "{}/{}",
            self.documents_prefix(),
            key.path().canonical_string()
        )
    }

    /// Encodes a value for the wire. Reference values expand from document
    /// paths to fully qualified resource names.
    ///
    /// Sentinels never reach the encoder: filters and cursors reject them at
    /// construction and this crate issues no writes.
    pub fn encode_value(&self, value: &DocstoreValue) -> JsonValue {
        match value.kind() {
            ValueKind::Null => json!({ "nullValue": JsonValue::Null }),
            ValueKind::Boolean(boolean) => json!({ "booleanValue": boolean }),
            ValueKind::Integer(integer) => json!({ "integerValue": integer.to_string() }),
            ValueKind::Double(double) => json!({ "doubleValue": double }),
            ValueKind::Timestamp(timestamp) => {
                json!({ "timestampValue": encode_timestamp(timestamp) })
            }
            ValueKind::String(string) => json!({ "stringValue": string }),
            ValueKind::Bytes(bytes) => {
                json!({ "bytesValue": BASE64_STANDARD.encode(bytes.as_slice()) })
            }
            ValueKind::Reference(path) => json!({
                "referenceValue": format!("{}/{}", self.documents_prefix(), path)
            }),
            ValueKind::GeoPoint(point) => json!({
                "geoPointValue": {
                    "latitude": point.latitude(),
                    "longitude": point.longitude(),
                }
            }),
            ValueKind::Array(array) => {
                let values: Vec<_> = array
                    .values()
                    .iter()
                    .map(|value| self.encode_value(value))
                    .collect();
                json!({ "arrayValue": { "values": values } })
            }
            ValueKind::Map(map) => json!({
                "mapValue": {
                    "fields": self.encode_map_fields(map)
                }
            }),
            ValueKind::Sentinel(_) => panic!("sentinel values never encode to the wire"),
        }
    }

    fn encode_map_fields(&self, map: &MapValue) -> JsonValue {
        let mut fields = serde_json::Map::new();
        for (key, value) in map.fields() {
            fields.insert(key.clone(), self.encode_value(value));
        }
        JsonValue::Object(fields)
    }

    /// Decodes the `fields` object of a wire document or map value. A
    /// document without user fields decodes to an empty map.
    pub fn decode_map_value(&self, value: &JsonValue) -> DocstoreResult<MapValue> {
        let map = value
            .as_object()
            .ok_or_else(|| invalid_argument("Expected object for map value"))?;
        let fields_object = match map.get("fields") {
            Some(fields_value) => fields_value
                .as_object()
                .ok_or_else(|| invalid_argument("Expected 'fields' to be an object"))?,
            None => return Ok(MapValue::new(BTreeMap::new())),
        };

        let mut fields = BTreeMap::new();
        for (key, value) in fields_object {
            fields.insert(key.clone(), self.decode_value(value)?);
        }
        Ok(MapValue::new(fields))
    }

    pub fn decode_value(&self, value: &JsonValue) -> DocstoreResult<DocstoreValue> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid_argument("Expected a wire value object"))?;
        if let Some(null_value) = object.get("nullValue") {
            if null_value.is_null() {
                return Ok(DocstoreValue::null());
            }
        }
        if let Some(bool_value) = object.get("booleanValue") {
            let value = bool_value
                .as_bool()
                .ok_or_else(|| invalid_argument("booleanValue must be bool"))?;
            return Ok(DocstoreValue::from_bool(value));
        }
        if let Some(integer_value) = object.get("integerValue") {
            let parsed = match integer_value {
                JsonValue::String(value) => i64::from_str(value)
                    .map_err(|err| invalid_argument(format!("Invalid integerValue: {err}")))?,
                JsonValue::Number(number) => number
                    .as_i64()
                    .ok_or_else(|| invalid_argument("Integer out of range"))?,
                _ => return Err(invalid_argument("integerValue must be a string or number")),
            };
            return Ok(DocstoreValue::from_integer(parsed));
        }
        if let Some(double_value) = object.get("doubleValue") {
            let parsed = match double_value {
                JsonValue::Number(number) => number
                    .as_f64()
                    .ok_or_else(|| invalid_argument("Invalid doubleValue"))?,
                JsonValue::String(value) => value
                    .parse::<f64>()
                    .map_err(|err| invalid_argument(format!("Invalid doubleValue: {err}")))?,
                _ => return Err(invalid_argument("doubleValue must be a number or string")),
            };
            return Ok(DocstoreValue::from_double(parsed));
        }
        if let Some(timestamp_value) = object.get("timestampValue") {
            let timestamp_str = timestamp_value
                .as_str()
                .ok_or_else(|| invalid_argument("timestampValue must be string"))?;
            return Ok(DocstoreValue::from_timestamp(parse_timestamp(
                timestamp_str,
            )?));
        }
        if let Some(string_value) = object.get("stringValue") {
            let str_value = string_value
                .as_str()
                .ok_or_else(|| invalid_argument("stringValue must be string"))?;
            return Ok(DocstoreValue::from_string(str_value));
        }
        if let Some(bytes_value) = object.get("bytesValue") {
            let str_value = bytes_value
                .as_str()
                .ok_or_else(|| invalid_argument("bytesValue must be base64 string"))?;
            let decoded = BASE64_STANDARD
                .decode(str_value)
                .map_err(|err| invalid_argument(format!("Invalid bytesValue: {err}")))?;
            return Ok(DocstoreValue::from_bytes(BytesValue::from(decoded)));
        }
        if let Some(reference_value) = object.get("referenceValue") {
            let str_value = reference_value
                .as_str()
                .ok_or_else(|| invalid_argument("referenceValue must be string"))?;
            // Qualified names from this database collapse back to paths.
            let prefix = format!("{}/", self.documents_prefix());
            let path = str_value.strip_prefix(&prefix).unwrap_or(str_value);
            return Ok(DocstoreValue::from_reference(path));
        }
        if let Some(geo_point) = object.get("geoPointValue") {
            let latitude = geo_point
                .get("latitude")
                .and_then(|value| value.as_f64())
                .ok_or_else(|| invalid_argument("geoPointValue.latitude must be f64"))?;
            let longitude = geo_point
                .get("longitude")
                .and_then(|value| value.as_f64())
                .ok_or_else(|| invalid_argument("geoPointValue.longitude must be f64"))?;
            return Ok(DocstoreValue::from_geo_point(GeoPoint::new(
                latitude, longitude,
            )?));
        }
        if let Some(array_value) = object.get("arrayValue") {
            let decoded = match array_value.get("values").and_then(JsonValue::as_array) {
                Some(entries) => entries
                    .iter()
                    .map(|entry| self.decode_value(entry))
                    .collect::<DocstoreResult<Vec<_>>>()?,
                None => Vec::new(),
            };
            return Ok(DocstoreValue::from_array(decoded));
        }
        if let Some(map_value) = object.get("mapValue") {
            let map = self.decode_map_value(map_value)?;
            return Ok(DocstoreValue::from_map(map.fields().clone()));
        }

        Err(invalid_argument("Unknown wire value type"))
    }
}

fn encode_timestamp(timestamp: &Timestamp) -> String {
    Utc.timestamp_opt(timestamp.seconds, timestamp.nanos as u32)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().expect("zero timestamp"))
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> DocstoreResult<Timestamp> {
    let datetime = DateTime::parse_from_rfc3339(value)
        .map_err(|err| invalid_argument(format!("Invalid timestamp: {err}")))?;
    let datetime_utc = datetime.with_timezone(&Utc);
    Ok(Timestamp::new(
        datetime_utc.timestamp(),
        datetime_utc.timestamp_subsec_nanos() as i32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serializer() -> JsonProtoSerializer {
        JsonProtoSerializer::new(DatabaseId::default_database("test-project"))
    }

    #[test]
    fn value_roundtrip() {
        let serializer = serializer();
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), DocstoreValue::from_string("Ada"));
        fields.insert("age".to_string(), DocstoreValue::from_integer(42));
        fields.insert(
            "nested".to_string(),
            DocstoreValue::from_map(BTreeMap::from([(
                "flag".to_string(),
                DocstoreValue::from_bool(true),
            )])),
        );
        let value = DocstoreValue::from_map(fields);

        let encoded = serializer.encode_value(&value);
        let decoded = serializer
            .decode_value(&encoded)
            .expect("decode encoded value");
        assert_eq!(decoded, value);
    }

    #[test]
    fn references_expand_to_qualified_names() {
        let serializer = serializer();
        let encoded = serializer.encode_value(&DocstoreValue::from_reference("rooms/eros"));
        assert_eq!(
            encoded["referenceValue"],
            "projects/test-project/databases/(default)/documents/rooms/eros"
        );

        let decoded = serializer.decode_value(&encoded).unwrap();
        assert_eq!(decoded, DocstoreValue::from_reference("rooms/eros"));
    }

    #[test]
    fn timestamps_roundtrip_through_rfc3339() {
        let serializer = serializer();
        let timestamp = Timestamp::new(1_700_000_000, 123_000_000);
        let encoded = serializer.encode_value(&DocstoreValue::from_timestamp(timestamp));
        let decoded = serializer.decode_value(&encoded).unwrap();
        assert_eq!(decoded, DocstoreValue::from_timestamp(timestamp));
    }

    #[test]
    fn document_name_is_fully_qualified() {
        let serializer = serializer();
        let key = DocumentKey::from_string("rooms/eros").unwrap();
        assert_eq!(
            serializer.document_name(&key),
            "projects/test-project/databases/(default)/documents/rooms/eros"
        );
    }

    #[test]
    fn unknown_value_type_is_rejected() {
        let err = serializer()
            .decode_value(&json!({ "mysteryValue": 1 }))
            .unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-argument");
    }
}
