//! Transport response handed to error decoders.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};

/// Response body: either still a stream or already read into memory.
pub enum Body {
    Buffered(Vec<u8>),
    Stream(Box<dyn Read + Send>),
}

impl Body {
    /// `true` once the body is held in memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self, Self::Buffered(_))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffered(bytes)
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Buffered(s.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Self::Buffered(s.as_bytes().to_vec())
    }
}

/// A failed HTTP/RPC response.
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Option<Body>,
}

impl Response {
    /// A response with the given status and no body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            reason: String::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the status reason phrase.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Append a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// A buffered body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// A streaming body, read on first buffering.
    pub fn with_stream(mut self, reader: impl Read + Send + 'static) -> Self {
        self.body = Some(Body::Stream(Box::new(reader)));
        self
    }

    /// Read a streaming body into memory so it can be read more than once.
    ///
    /// On a read error the bytes read so far are kept as the buffered body
    /// and the error is returned.
    pub fn buffer_body(&mut self) -> io::Result<()> {
        let Some(Body::Stream(reader)) = self.body.as_mut() else {
            return Ok(());
        };
        let mut bytes = Vec::new();
        let result = reader.read_to_end(&mut bytes).map(|_| ());
        self.body = Some(Body::Buffered(bytes));
        result
    }

    /// The buffered body bytes, if any.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Some(Body::Buffered(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Buffered body as UTF-8 text (lossy).
    pub fn body_text(&self) -> Option<String> {
        self.body_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}
