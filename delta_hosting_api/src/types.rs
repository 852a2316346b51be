use serde::{Deserialize, Serialize};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in backend order.
    pub items: Vec<T>,
    /// Next page number, or `None` on the last page.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// A page with no successor.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }

    /// A page followed by `next_page`.
    #[must_use]
    pub fn with_next(items: Vec<T>, next_page: u32) -> Self {
        Self {
            items,
            next_page: Some(next_page),
        }
    }
}

/// A changed file entry in a commit comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareFile {
    /// Path of the file after the change.
    pub filename: String,
    /// Backend change status (added, removed, modified, renamed, ...).
    #[serde(default)]
    pub status: Option<String>,
}

/// Response body of a commit comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Changed files in backend order.
    #[serde(default)]
    pub files: Vec<CompareFile>,
}

impl Comparison {
    /// File names in response order, duplicates included.
    #[must_use]
    pub fn filenames(&self) -> Vec<String> {
        self.files.iter().map(|file| file.filename.clone()).collect()
    }
}

/// Errors surfaced by hosted repository backends.
#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport failure description.
        message: String,
    },
    /// The backend answered with a non-success status.
    #[error("{url} responded with HTTP {status}: {message}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Body or backend message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("could not decode response from {url}: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder failure description.
        message: String,
    },
    /// Generic failure surfaced by a backend.
    #[error("{message}")]
    Failure {
        /// Human-readable error message.
        message: String,
    },
}

impl HostingError {
    /// Helper to construct a failure from any displayable message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// HTTP status code, when the backend produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience result alias for hosting operations.
pub type HostingResult<T> = std::result::Result<T, HostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_keeps_order_and_duplicates() {
        let json = r#"{"files": [
            {"filename": "b.go", "status": "modified"},
            {"filename": "a.txt"},
            {"filename": "b.go"}
        ]}"#;
        let comparison: Comparison = serde_json::from_str(json).expect("deserialize comparison");
        assert_eq!(comparison.filenames(), vec!["b.go", "a.txt", "b.go"]);
    }

    #[test]
    fn comparison_without_files_is_empty() {
        let comparison: Comparison =
            serde_json::from_str(r#"{"status": "identical"}"#).expect("deserialize comparison");
        assert!(comparison.filenames().is_empty());
    }

    #[test]
    fn status_error_exposes_code() {
        let err = HostingError::Status {
            url: "https://api.example.com/x".into(),
            status: 404,
            message: "Not Found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(HostingError::message("boom").status(), None);
        assert!(err.to_string().contains("HTTP 404"));
    }
}
