//! Message body with its content metadata

/// Content type used when a publisher does not set one
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    body: Vec<u8>,
    content_type: String,
    content_encoding: Option<String>,
}

impl Payload {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content_encoding: None,
        }
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..self
        }
    }

    pub fn with_content_encoding(self, content_encoding: impl Into<String>) -> Self {
        Self {
            content_encoding: Some(content_encoding.into()),
            ..self
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, if it is valid UTF-8
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl From<&str> for Payload {
    fn from(body: &str) -> Self {
        Payload::new(body.as_bytes())
    }
}

impl From<String> for Payload {
    fn from(body: String) -> Self {
        Payload::new(body.into_bytes())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(body: Vec<u8>) -> Self {
        Payload::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults_to_text_plain() {
        let payload = Payload::from("hello");
        assert_eq!(payload.content_type(), DEFAULT_CONTENT_TYPE);
        assert_eq!(payload.content_encoding(), None);
        assert_eq!(payload.as_text(), Some("hello"));
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn test_builders_return_new_values() {
        let original = Payload::from("{}");
        let json = original
            .clone()
            .with_content_type("application/json")
            .with_content_encoding("gzip");

        assert_eq!(original.content_type(), "text/plain");
        assert_eq!(json.content_type(), "application/json");
        assert_eq!(json.content_encoding(), Some("gzip"));
        assert_eq!(json.body(), original.body());
    }

    #[test]
    fn test_binary_body_is_not_text() {
        let payload = Payload::new(vec![0xff, 0xfe, 0x00]);
        assert!(payload.as_text().is_none());
        assert!(!payload.is_empty());
    }
}
