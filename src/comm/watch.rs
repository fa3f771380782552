use super::EventKind;
use crate::CodecError;

/// One decoded change record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchValue {
    pub event: EventKind,
    /// Store-local key
    pub key: String,
    /// Raw entity value; empty for deletes
    pub value: String,
}

impl WatchValue {
    pub fn new(
        event: EventKind,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            event,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An encoded change-feed batch: a JSON list of `[event, key, value]` triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchMessage {
    payload: Vec<u8>,
}

impl WatchMessage {
    pub fn new(values: &[WatchValue]) -> Result<Self, CodecError> {
        let triples: Vec<[&str; 3]> = values
            .iter()
            .map(|v| [v.event.as_str(), v.key.as_str(), v.value.as_str()])
            .collect();
        let payload = serde_json::to_vec(&triples).map_err(CodecError::Malformed)?;
        Ok(Self { payload })
    }

    /// Wraps a payload received from elsewhere; validated on [`Self::decode`]
    pub fn from_payload(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Decodes every triple. Fails the whole batch on the first bad one.
    pub fn decode(&self) -> Result<Vec<WatchValue>, CodecError> {
        let triples: Vec<[String; 3]> = serde_json::from_slice(&self.payload).map_err(CodecError::Malformed)?;

        triples
            .into_iter()
            .map(|[event, key, value]| {
                let event = event.parse::<EventKind>()?;
                if event == EventKind::Update {
                    return Err(CodecError::UnexpectedEvent {
                        expected: "add|delete",
                        actual: event.to_string(),
                    });
                }
                Ok(WatchValue { event, key, value })
            })
            .collect()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
