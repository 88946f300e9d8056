use std::error::Error as StdError;

use thiserror::Error;

use crate::application::levels::ResolveError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;
pub const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// Error chain captured for logging alongside a served failure.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: u16,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: u16, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    /// Emit the chain as a single structured event.
    pub fn log(&self) {
        let chain = self.messages.join(": ");
        if self.status >= STATUS_INTERNAL_SERVER_ERROR {
            tracing::error!(
                source = self.source,
                status = self.status,
                error = %chain,
                "request failed"
            );
        } else {
            tracing::info!(
                source = self.source,
                status = self.status,
                error = %chain,
                "request rejected"
            );
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Resolve(ResolveError::NotFound { .. }) => STATUS_NOT_FOUND,
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Infra(InfraError::Payload { .. }) => STATUS_BAD_REQUEST,
            AppError::Infra(InfraError::Database { .. }) => STATUS_SERVICE_UNAVAILABLE,
            AppError::Infra(_) => STATUS_INTERNAL_SERVER_ERROR,
            AppError::Resolve(ResolveError::CycleDetected { .. })
            | AppError::Resolve(ResolveError::Store(_))
            | AppError::Repo(_)
            | AppError::Unexpected(_) => STATUS_INTERNAL_SERVER_ERROR,
        }
    }

    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Resolve(ResolveError::NotFound { .. }) => "Level does not exist",
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Infra(InfraError::Payload { .. }) => "Request could not be processed",
            AppError::Infra(InfraError::Database { .. }) => "Service temporarily unavailable",
            AppError::Infra(_) => "Service misconfigured",
            AppError::Resolve(ResolveError::CycleDetected { .. }) => "Level hierarchy is invalid",
            AppError::Resolve(ResolveError::Store(_)) | AppError::Repo(_) => {
                "Level store unavailable"
            }
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }

    pub fn report(&self, source: &'static str) -> ErrorReport {
        ErrorReport::from_error(source, self.status_code(), self)
    }
}
