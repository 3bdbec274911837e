//! Order payloads as received from the order form and as forwarded to the spreadsheet.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Contact text in the storage key when `orderData` has no `contact` field.
pub const MISSING_CONTACT: &str = "undefined";

/// The `orderData` part of an upload.
///
/// Every field is passed through as an opaque JSON value; nothing is type- or range-checked.
/// Fields the client did not send stay `None` and are omitted when forwarded.
/// An explicit `null` is kept as `Some(Value::Null)` and forwarded as `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(default, deserialize_with = "present")]
    pub size: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub material: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub quantity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub work_option: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub color: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub contact: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub special_request: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub total_price: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl OrderData {
    /// Contact rendered for use inside a storage key.
    ///
    /// Keys must match those already in the bucket: an absent contact is `undefined` and an
    /// explicit `null` is `null`.
    pub fn contact_label(&self) -> String {
        match &self.contact {
            None => MISSING_CONTACT.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Request timestamp in the form used by keys and records, e.g. `2026-10-16T09:30:12.345Z`.
pub fn order_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Object key for an uploaded file: `{timestamp}-{contact}-{file_name}`.
///
/// Two uploads with the same timestamp, contact and file name get the same key, and the later
/// one replaces the earlier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub const DELIMITER: char = '-';

    pub fn compose(timestamp: &str, contact: &str, file_name: &str) -> Self {
        let d = Self::DELIMITER;
        Self(format!("{timestamp}{d}{contact}{d}{file_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row forwarded to the spreadsheet webhook.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrderRecord {
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_option: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_request: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Value>,
    /// Storage key the uploaded file was written under
    pub file_name: String,
}

impl StoredOrderRecord {
    pub fn new(timestamp: String, order: OrderData, key: &StorageKey) -> Self {
        Self {
            timestamp,
            size: order.size,
            material: order.material,
            quantity: order.quantity,
            work_option: order.work_option,
            color: order.color,
            contact: order.contact,
            email: order.email,
            special_request: order.special_request,
            address: order.address,
            total_price: order.total_price,
            file_name: key.to_string(),
        }
    }
}

/// Body of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_timestamp_has_millis_and_z() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 12).unwrap() + chrono::Duration::milliseconds(345);
        assert_eq!(order_timestamp(now), "2026-10-16T09:30:12.345Z");
    }

    #[test]
    fn test_key_components_in_order() {
        let key = StorageKey::compose("2026-10-16T09:30:12.345Z", "010-1234-5678", "logo.png");
        assert_eq!(key.as_str(), "2026-10-16T09:30:12.345Z-010-1234-5678-logo.png");
    }

    #[test]
    fn test_identical_inputs_collide() {
        let a = StorageKey::compose("2026-10-16T09:30:12.345Z", "kim", "a.pdf");
        let b = StorageKey::compose("2026-10-16T09:30:12.345Z", "kim", "a.pdf");
        assert_eq!(a, b);
    }

    #[test]
    fn test_contact_label() {
        let mut order = OrderData::default();
        assert_eq!(order.contact_label(), "undefined");

        order.contact = Some(Value::Null);
        assert_eq!(order.contact_label(), "null");

        order.contact = Some(json!("kim@example.com"));
        assert_eq!(order.contact_label(), "kim@example.com");

        order.contact = Some(json!(1012345678));
        assert_eq!(order.contact_label(), "1012345678");
    }

    #[test]
    fn test_order_data_accepts_camel_case_and_opaque_values() {
        let order: OrderData = serde_json::from_value(json!({
            "size": {"w": 30, "h": 40},
            "material": "vinyl",
            "quantity": "3",
            "workOption": ["cut", "laminate"],
            "contact": "kim",
            "email": "kim@example.com",
            "totalPrice": 15000.5,
            "somethingElse": true
        }))
        .unwrap();

        assert_eq!(order.size, Some(json!({"w": 30, "h": 40})));
        assert_eq!(order.quantity, Some(json!("3")));
        assert_eq!(order.work_option, Some(json!(["cut", "laminate"])));
        assert_eq!(order.color, None);

        let order: OrderData = serde_json::from_value(json!({"contact": null})).unwrap();
        assert_eq!(order.contact, Some(Value::Null));
        assert_eq!(order.email, None);
    }

    #[test]
    fn test_record_omits_absent_fields() {
        let order = OrderData {
            size: Some(json!("A4")),
            contact: Some(json!("kim")),
            ..Default::default()
        };
        let key = StorageKey::compose("2026-10-16T09:30:12.345Z", "kim", "a.pdf");
        let record = StoredOrderRecord::new("2026-10-16T09:30:12.345Z".to_string(), order, &key);

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "timestamp": "2026-10-16T09:30:12.345Z",
                "size": "A4",
                "contact": "kim",
                "fileName": "2026-10-16T09:30:12.345Z-kim-a.pdf"
            })
        );
    }
}
