use std::fmt;

use super::check_header_len;
use super::EventKind;
use crate::CodecError;
use crate::DiscoveryArgs;

/// In-place mutation of every registration of `service` whose arguments
/// equal the old payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    service: String,
    old_args: Vec<u8>,
    new_args: Vec<u8>,
}

impl Update {
    /// Builds an update from `[update, service]` and both argument payloads.
    ///
    /// # Errors
    /// - [`CodecError::InvalidHeader`] when the header does not have two fields
    /// - [`CodecError::UnexpectedEvent`] when the event is not `update`
    /// - [`CodecError::Args`] when either payload cannot be serialized
    pub fn new(
        header: &[&str],
        old_args: &DiscoveryArgs,
        new_args: &DiscoveryArgs,
    ) -> Result<Self, CodecError> {
        check_header_len(header, 2)?;
        let event: EventKind = header[0].parse()?;
        if event != EventKind::Update {
            return Err(CodecError::UnexpectedEvent {
                expected: "update",
                actual: header[0].to_string(),
            });
        }

        Ok(Self {
            service: header[1].to_string(),
            old_args: serde_json::to_vec(old_args).map_err(CodecError::Args)?,
            new_args: serde_json::to_vec(new_args).map_err(CodecError::Args)?,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn old_args(&self) -> Result<DiscoveryArgs, CodecError> {
        serde_json::from_slice(&self.old_args).map_err(CodecError::Args)
    }

    pub fn new_args(&self) -> Result<DiscoveryArgs, CodecError> {
        serde_json::from_slice(&self.new_args).map_err(CodecError::Args)
    }
}

impl fmt::Display for Update {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {}",
            EventKind::Update,
            self.service,
            String::from_utf8_lossy(&self.old_args),
            String::from_utf8_lossy(&self.new_args)
        )
    }
}
