//! Error types for timeline refresh operations.
//!
//! Nothing in this crate is fatal to the process: a failed refresh cycle is
//! logged and retried on the next tick. Errors still carry structured context
//! so the log line tells which group and which step failed.

use std::fmt;

use crate::models::GroupKey;

/// Result type for guide operations
pub type GuideResult<T> = Result<T, GuideError>;

/// Structured context for guide errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch_all_entries", "start_worker")
    pub operation: Option<String>,
    /// The channel group involved, if any
    pub group: Option<GroupKey>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether the next refresh cycle may succeed
    pub retryable: bool,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the group.
    pub fn with_group(mut self, group: GroupKey) -> Self {
        self.group = Some(group);
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Mark this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref group) = self.group {
            parts.push(format!("group={}", group));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for guide operations
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    /// The selected group is gone or its data provider is temporarily down.
    #[error("Group unavailable: {message} {context}")]
    GroupUnavailable {
        message: String,
        context: ErrorContext,
    },

    /// Fetching schedule entries failed.
    #[error("Fetch failed: {message} {context}")]
    FetchFailed {
        message: String,
        context: ErrorContext,
    },

    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// The background worker could not be spawned or joined.
    #[error("Worker error: {message} {context}")]
    WorkerError {
        message: String,
        context: ErrorContext,
    },
}

impl GuideError {
    /// Create a group-unavailable error. Always retryable.
    pub fn group_unavailable(message: impl Into<String>) -> Self {
        Self::GroupUnavailable {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a group-unavailable error with context.
    pub fn group_unavailable_with_context(
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::GroupUnavailable {
            message: message.into(),
            context: context.retryable(),
        }
    }

    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a fetch error with context.
    pub fn fetch_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::FetchFailed {
            message: message.into(),
            context,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a worker error.
    pub fn worker(message: impl Into<String>) -> Self {
        Self::WorkerError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::GroupUnavailable { context, .. } => context.retryable,
            Self::FetchFailed { context, .. } => context.retryable,
            _ => false,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::GroupUnavailable { context, .. } => context,
            Self::FetchFailed { context, .. } => context,
            Self::ConfigurationError { context, .. } => context,
            Self::WorkerError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::GroupUnavailable { context, .. }
            | Self::FetchFailed { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::WorkerError { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }

    /// Attach the group the failure relates to.
    pub fn with_group(mut self, group: GroupKey) -> Self {
        match &mut self {
            Self::GroupUnavailable { context, .. }
            | Self::FetchFailed { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::WorkerError { context, .. } => {
                context.group = Some(group);
            }
        }
        self
    }
}
