//! Error types for viewer adapter operations.
//!
//! Adapter errors carry an [`ErrorContext`] naming the operation, the backend
//! and (when relevant) the element involved.

use std::fmt;

/// Result type for viewer adapter operations
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Structured context for viewer errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The adapter call being made (e.g., "show_objects", "initialize")
    pub operation: Option<String>,
    /// The backend kind that raised the error
    pub backend: Option<String>,
    /// Element stable id, if the failure concerns one element
    pub element: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: impl ToString) -> Self {
        self.backend = Some(backend.to_string());
        self
    }

    pub fn with_element(mut self, element: impl ToString) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref backend) = self.backend {
            parts.push(format!("backend={}", backend));
        }
        if let Some(ref element) = self.element {
            parts.push(format!("element={}", element));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for viewer adapter operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ViewerError {
    /// A call was made before `initialize` completed.
    #[error("Viewer not ready: {message} {context}")]
    NotReady {
        message: String,
        context: ErrorContext,
    },

    /// Model or geometry load failed during `initialize`.
    #[error("Model load failed: {message} {context}")]
    LoadFailed {
        message: String,
        context: ErrorContext,
    },

    /// The model source kind does not match the native backend supplied.
    #[error("Backend mismatch: {message} {context}")]
    BackendMismatch {
        message: String,
        context: ErrorContext,
    },

    /// The native client rejected a call.
    #[error("Native backend error: {message} {context}")]
    Native {
        message: String,
        context: ErrorContext,
    },

    /// The adapter was disposed.
    #[error("Viewer disposed: {message} {context}")]
    Disposed {
        message: String,
        context: ErrorContext,
    },
}

impl ViewerError {
    pub fn not_ready(context: ErrorContext) -> Self {
        Self::NotReady {
            message: "initialize has not completed".to_string(),
            context,
        }
    }

    pub fn load_failed(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::LoadFailed {
            message: message.into(),
            context,
        }
    }

    pub fn backend_mismatch(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::BackendMismatch {
            message: message.into(),
            context,
        }
    }

    pub fn native(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Native {
            message: message.into(),
            context,
        }
    }

    pub fn disposed(context: ErrorContext) -> Self {
        Self::Disposed {
            message: "adapter has been disposed".to_string(),
            context,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::NotReady { context, .. }
            | Self::LoadFailed { context, .. }
            | Self::BackendMismatch { context, .. }
            | Self::Native { context, .. }
            | Self::Disposed { context, .. } => context,
        }
    }

    /// Whether later calls on the same adapter could still succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Native { .. } | Self::NotReady { .. })
    }
}
