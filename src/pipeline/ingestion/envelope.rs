use serde::Deserialize;

use crate::domain::{Notification, StoreLocation};
use crate::error::{IngestError, Result};

/// Outer transport envelope: one queued record per invocation, its body a
/// JSON document describing the object that arrived.
#[derive(Debug, Deserialize)]
pub struct TransportEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<TransportRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TransportRecord {
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct ArrivalEvent {
    detail: ArrivalDetail,
}

#[derive(Debug, Deserialize)]
struct ArrivalDetail {
    bucket: ContainerRef,
    object: ObjectRef,
}

#[derive(Debug, Deserialize)]
struct ContainerRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectRef {
    key: String,
    etag: String,
}

/// Decodes one transport delivery into a notification. The etag travels as
/// the content token identifying this version of the file's bytes.
pub fn decode_notification(payload: &str) -> Result<Notification> {
    let envelope: TransportEnvelope = serde_json::from_str(payload)?;
    let record = envelope.records.first().ok_or(IngestError::EmptyEnvelope)?;
    let event: ArrivalEvent = serde_json::from_str(&record.body)?;
    Ok(Notification {
        location: StoreLocation::new(event.detail.bucket.name, event.detail.object.key),
        content_token: event.detail.object.etag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_nested_arrival_event() {
        let body = json!({
            "detail": {
                "bucket": { "name": "settlement-inbox" },
                "object": { "key": "reports/batch_118.csv", "etag": "9a1b2c3d" }
            }
        })
        .to_string();
        let payload = json!({ "Records": [{ "body": body }] }).to_string();

        let notification = decode_notification(&payload).unwrap();
        assert_eq!(notification.location.container, "settlement-inbox");
        assert_eq!(notification.location.key, "reports/batch_118.csv");
        assert_eq!(notification.content_token, "9a1b2c3d");
    }

    #[test]
    fn empty_envelope_is_rejected() {
        let payload = json!({ "Records": [] }).to_string();
        assert!(matches!(
            decode_notification(&payload),
            Err(IngestError::EmptyEnvelope)
        ));
    }

    #[test]
    fn malformed_body_is_rejected() {
        let payload = json!({ "Records": [{ "body": "not json" }] }).to_string();
        assert!(matches!(
            decode_notification(&payload),
            Err(IngestError::Envelope(_))
        ));
    }
}
