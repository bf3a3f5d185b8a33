//! Monthly circulation reports for library transaction data.
//!
//! A run fetches every transaction from the library service, buckets borrows
//! and returns into four week slots for the selected month, lays the figures
//! out on a single page, renders it with `printpdf`, and saves the result as
//! `library-report-<Month>-<Year>.pdf`.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod context;
pub mod download;
pub mod error;
pub mod fonts;
pub mod generator;
pub mod layout;
pub mod model;
pub mod notify;
pub mod render;
pub mod session;

pub use context::AppContext;
pub use error::{ReportError, USER_FAILURE_MESSAGE};
pub use generator::{GenerationOutcome, GenerationState, ReportArtifact, ReportGenerator};
pub use model::{ReportSelection, TransactionRecord, WeeklyStats};
