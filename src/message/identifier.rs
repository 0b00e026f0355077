//! Message identity attributes

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifier {
    message_id: Option<String>,
    app_id: Option<String>,
    user_id: Option<String>,
}

impl Identifier {
    pub fn new(
        message_id: Option<String>,
        app_id: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            message_id,
            app_id,
            user_id,
        }
    }

    pub fn with_message_id(self, message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            ..self
        }
    }

    pub fn with_app_id(self, app_id: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            ..self
        }
    }

    pub fn with_user_id(self, user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..self
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
