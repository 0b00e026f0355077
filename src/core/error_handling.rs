//! Fatal error reporting at the process boundary
//!
//! Errors a user can fix (bad configuration, unknown consumer, rejected
//! credentials) are shown as they are. Everything else is reported with the
//! operation that failed, and the details go to the debug log.

use crate::error::Error;

/// Errors that know whether their message is meant for the user
///
/// When `is_user_actionable()` is true, `user_message()` returns `Some`.
pub trait ContextualError: std::error::Error {
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<String>;
}

impl ContextualError for Error {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Error::BadCredentials { .. }
                | Error::Configuration { .. }
                | Error::ConfigParse(_)
                | Error::InvalidDsn { .. }
                | Error::UnknownDriver { .. }
                | Error::MessageHandlerNotSupported { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        self.is_user_actionable().then(|| self.to_string())
    }
}

/// Log `error` as fatal, with `operation_context` standing in for system errors
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(error: &E, operation_context: &str) {
    match error.user_message() {
        Some(message) if error.is_user_actionable() => log::error!("FATAL: {}", message),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
