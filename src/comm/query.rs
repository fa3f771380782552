use std::fmt;

use super::check_header_len;
use super::EventKind;
use crate::CodecError;
use crate::DiscoveryArgs;

/// Asks a discovery backend to make its record match (add) or forget
/// (delete) one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    event: EventKind,
    entity_id: String,
    service: String,
    args: Vec<u8>,
}

impl Query {
    /// Builds a query from `[event, entity_id, service]` and the entity's
    /// discovery arguments.
    ///
    /// # Errors
    /// - [`CodecError::InvalidHeader`] when the header does not have three fields
    /// - [`CodecError::UnexpectedEvent`] when the event is not `add` or `delete`
    /// - [`CodecError::Args`] when the arguments cannot be serialized
    pub fn new(
        header: &[&str],
        args: &DiscoveryArgs,
    ) -> Result<Self, CodecError> {
        check_header_len(header, 3)?;
        let event: EventKind = header[0].parse()?;
        if event == EventKind::Update {
            return Err(CodecError::UnexpectedEvent {
                expected: "add|delete",
                actual: header[0].to_string(),
            });
        }
        let args = serde_json::to_vec(args).map_err(CodecError::Args)?;

        Ok(Self {
            event,
            entity_id: header[1].to_string(),
            service: header[2].to_string(),
            args,
        })
    }

    pub fn event(&self) -> EventKind {
        self.event
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Decodes the argument payload
    pub fn args(&self) -> Result<DiscoveryArgs, CodecError> {
        serde_json::from_slice(&self.args).map_err(CodecError::Args)
    }

    pub fn raw_args(&self) -> &[u8] {
        &self.args
    }
}

impl fmt::Display for Query {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.event,
            self.entity_id,
            self.service,
            String::from_utf8_lossy(&self.args)
        )
    }
}
