//! The unit handed to a publisher

use crate::message::{HeaderValue, Headers, Identifier, Options, Payload};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    payload: Payload,
    options: Options,
    headers: Headers,
    identifier: Identifier,
}

impl Message {
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self::from_parts(
            payload.into(),
            Options::default(),
            Headers::new(),
            Identifier::default(),
        )
    }

    pub fn from_parts(
        payload: Payload,
        options: Options,
        headers: Headers,
        identifier: Identifier,
    ) -> Self {
        Self {
            payload,
            options,
            headers,
            identifier,
        }
    }

    pub fn with_payload(self, payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            ..self
        }
    }

    pub fn with_options(self, options: Options) -> Self {
        Self { options, ..self }
    }

    pub fn with_headers(self, headers: Headers) -> Self {
        Self { headers, ..self }
    }

    pub fn with_header(self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        let headers = self.headers.with_header(name, value);
        Self { headers, ..self }
    }

    pub fn with_identifier(self, identifier: Identifier) -> Self {
        Self { identifier, ..self }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }
}
