//! Decode targets for successful responses.
//!
//! A target either exposes a raw byte sink, in which case the body is copied
//! verbatim, or accepts the body as JSON.

use crate::client::ResponseMeta;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Write;

pub trait DecodeTarget {
    /// Raw byte sink capability. Targets returning `Some` receive the body
    /// untouched and are never asked to parse it.
    fn as_sink(&mut self) -> Option<&mut dyn Write> {
        None
    }

    fn decode_json(&mut self, body: &[u8]) -> Result<(), serde_json::Error>;
}

/// Decodes the body as JSON into `T`.
#[derive(Debug)]
pub struct Json<T> {
    value: Option<T>,
}

impl<T> Json<T> {
    pub fn new() -> Self {
        Self { value: None }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> DecodeTarget for Json<T> {
    fn decode_json(&mut self, body: &[u8]) -> Result<(), serde_json::Error> {
        self.value = Some(serde_json::from_slice(body)?);
        Ok(())
    }
}

/// Copies the body into any writer.
#[derive(Debug)]
pub struct Sink<W>(pub W);

impl<W> Sink<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> DecodeTarget for Sink<W> {
    fn as_sink(&mut self) -> Option<&mut dyn Write> {
        Some(&mut self.0)
    }

    fn decode_json(&mut self, body: &[u8]) -> Result<(), serde_json::Error> {
        self.0.write_all(body).map_err(serde_json::Error::io)
    }
}

impl DecodeTarget for Vec<u8> {
    fn as_sink(&mut self) -> Option<&mut dyn Write> {
        Some(self)
    }

    fn decode_json(&mut self, body: &[u8]) -> Result<(), serde_json::Error> {
        self.extend_from_slice(body);
        Ok(())
    }
}

#[derive(Deserialize)]
struct MetaRoot {
    meta: Option<ResponseMeta>,
}

/// Pagination block under the top-level `meta` key, if any.
///
/// Best effort: a body that is not a JSON object, or whose `meta` does not
/// parse, simply has no metadata.
pub(crate) fn extract_meta(body: &[u8]) -> Option<ResponseMeta> {
    serde_json::from_slice::<MetaRoot>(body)
        .ok()
        .and_then(|root| root.meta)
}
