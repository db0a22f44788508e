use serde_json::Value;
use thiserror::Error;

/// Failure of a single backend call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Http { status: u16, body: Option<Value> },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text field of the error body, if the backend sent one
    fn body_field(&self, key: &str) -> Option<&str> {
        match self {
            Self::Http { body: Some(body), .. } => body
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }
}

/// Fallback strings shown when the backend gives no usable message
#[derive(Debug, Clone)]
pub struct MessageTable {
    pub unauthorized: String,
    pub forbidden: String,
    pub not_found: String,
    pub conflict: String,
    pub unprocessable: String,
    pub server: String,
    pub timeout: String,
    pub network: String,
    pub unknown: String,
}

impl Default for MessageTable {
    fn default() -> Self {
        Self {
            unauthorized: "Your session has expired. Please log in again.".to_string(),
            forbidden: "You do not have permission to perform this action.".to_string(),
            not_found: "The requested record was not found.".to_string(),
            conflict: "This record conflicts with an existing one.".to_string(),
            unprocessable: "Some of the submitted fields are invalid.".to_string(),
            server: "Server error. Please try again later.".to_string(),
            timeout: "The request timed out. Please try again.".to_string(),
            network: "Network error. Please check your connection.".to_string(),
            unknown: "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl MessageTable {
    /// Pick the message a user should see for `error`.
    ///
    /// Order: body `message`, body `error`, the error's own text for
    /// decode failures, then the status or transport fallback.
    pub fn user_message(&self, error: &ApiError) -> String {
        if let Some(message) = error.body_field("message") {
            return message.to_string();
        }
        if let Some(message) = error.body_field("error") {
            return message.to_string();
        }

        match error {
            ApiError::Decode(message) if !message.trim().is_empty() => message.clone(),
            ApiError::Http { status, .. } => self.for_status(*status).to_string(),
            ApiError::Timeout => self.timeout.clone(),
            ApiError::Network(_) => self.network.clone(),
            ApiError::Decode(_) => self.unknown.clone(),
        }
    }

    fn for_status(&self, status: u16) -> &str {
        match status {
            401 => &self.unauthorized,
            403 => &self.forbidden,
            404 => &self.not_found,
            409 => &self.conflict,
            422 => &self.unprocessable,
            500..=599 => &self.server,
            _ => &self.unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, body: Option<Value>) -> ApiError {
        ApiError::Http { status, body }
    }

    #[test]
    fn backend_message_wins_over_error_field() {
        let table = MessageTable::default();
        let err = http(400, Some(json!({"message": "Email already used", "error": "Bad Request"})));
        assert_eq!(table.user_message(&err), "Email already used");
    }

    #[test]
    fn error_field_used_when_message_missing_or_blank() {
        let table = MessageTable::default();
        let err = http(400, Some(json!({"message": "  ", "error": "Invalid phone"})));
        assert_eq!(table.user_message(&err), "Invalid phone");
    }

    #[test]
    fn status_fallbacks() {
        let table = MessageTable::default();
        assert_eq!(table.user_message(&http(401, None)), table.unauthorized);
        assert_eq!(table.user_message(&http(403, None)), table.forbidden);
        assert_eq!(table.user_message(&http(404, Some(json!({})))), table.not_found);
        assert_eq!(table.user_message(&http(409, None)), table.conflict);
        assert_eq!(table.user_message(&http(422, None)), table.unprocessable);
        assert_eq!(table.user_message(&http(503, None)), table.server);
        assert_eq!(table.user_message(&http(418, None)), table.unknown);
    }

    #[test]
    fn transport_fallbacks() {
        let table = MessageTable::default();
        assert_eq!(table.user_message(&ApiError::Timeout), table.timeout);
        assert_eq!(
            table.user_message(&ApiError::Network("connection refused".to_string())),
            table.network
        );
    }

    #[test]
    fn decode_errors_show_their_own_text() {
        let table = MessageTable::default();
        let err = ApiError::Decode("missing field `_id`".to_string());
        assert_eq!(table.user_message(&err), "missing field `_id`");
    }

    #[test]
    fn custom_table_is_used() {
        let table = MessageTable {
            not_found: "Listing removed".to_string(),
            ..Default::default()
        };
        assert_eq!(table.user_message(&http(404, None)), "Listing removed");
    }
}
