//! Admin API failures

use thiserror::Error;

/// The two ways an admin call can fail
#[derive(Debug, Error)]
pub enum AdminError {
    /// Unreachable server, timeout, or a body that could not be read
    #[error("Network error: could not reach the server.")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{message}")]
    Application { status: u16, message: String },
}

impl AdminError {
    /// Build an application error from a status and an optional `error` field
    pub fn application(status: u16, message: Option<String>) -> Self {
        AdminError::Application {
            status,
            message: message.unwrap_or_else(|| format!("HTTP {}", status)),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Transport(_) => None,
            AdminError::Application { status, .. } => Some(*status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_falls_back_to_status() {
        assert_eq!(AdminError::application(404, None).to_string(), "HTTP 404");
        assert_eq!(
            AdminError::application(422, Some("bad matcher".to_string())).to_string(),
            "bad matcher"
        );
        assert_eq!(AdminError::application(500, None).status(), Some(500));
    }
}
