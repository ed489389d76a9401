use ra_domain::error::Error;

/// Failure classes of a run-agent request.
///
/// A poll timeout is deliberately absent: it yields a normal response
/// with a warning.
#[derive(thiserror::Error, Debug)]
pub enum RunAgentError {
    /// Malformed request body.  No remote call has been made.
    #[error("{0}")]
    Validation(String),

    /// Required server configuration is missing.  No remote call has been
    /// made.
    #[error("{0}")]
    Configuration(String),

    /// Credentials or the service client could not be set up.
    #[error("Failed to initialize agent service client.")]
    Initialization(#[source] Error),

    /// A remote call failed while initiating, launching, polling or
    /// assembling.
    #[error("Agent run failed.")]
    RunFailed(#[source] Error),
}

impl RunAgentError {
    /// True for errors caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Diagnostic detail for the response body, when there is a cause.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Validation(_) | Self::Configuration(_) => None,
            Self::Initialization(e) | Self::RunFailed(e) => Some(e.to_string()),
        }
    }
}

impl From<Error> for RunAgentError {
    fn from(e: Error) -> Self {
        Self::RunFailed(e)
    }
}
