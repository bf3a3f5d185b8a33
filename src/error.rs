//! Error types shared across the report pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Message shown to the user whenever a report run fails, regardless of the stage.
pub const USER_FAILURE_MESSAGE: &str = "Failed to generate report. Please try again.";

/// Errors raised while retrieving transactions from the library service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    /// The request never produced a response.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status code.
    #[error("library service answered {status} for {url}")]
    Status { url: String, status: u16 },
    /// The response body could not be decoded into transaction records.
    #[error("failed to decode transactions from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Errors raised while laying out or serializing the PDF document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A font file could not be opened or embedded.
    #[error("failed to load font {path}: {message}")]
    FontLoad { path: PathBuf, message: String },
    /// `printpdf` rejected the document.
    #[error("failed to build PDF document: {0}")]
    Pdf(String),
    /// Writing the serialized document into memory failed.
    #[error("failed to serialize PDF document: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while persisting the rendered report.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("output directory {path} is not usable")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write report to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Failure to assemble the application context from configuration.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] FetchError),
}

/// Errors raised while interpreting a month/year selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("month index {0} is out of range (expected 0..=11)")]
    MonthOutOfRange(u32),
    #[error("'{0}' is not a month name or a number between 1 and 12")]
    UnknownMonth(String),
}

/// Terminal failure of a single report run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no active session; sign in again")]
    NotAuthenticated,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl ReportError {
    /// The user-facing text for this failure. Every stage collapses to the same message.
    pub fn user_message(&self) -> &'static str {
        USER_FAILURE_MESSAGE
    }
}
