//! Collaborators shared by everything that runs reports.

use std::sync::Arc;

use crate::client::{self, HttpTransactionSource, TransactionSource};
use crate::config::ReportConfig;
use crate::download::ReportDownloader;
use crate::error::{ConfigError, ContextError};
use crate::fonts;
use crate::notify::NotificationSink;
use crate::render::ReportRenderer;
use crate::session::{Session, SessionProvider};

/// Application context handed to the report generator at construction time.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<dyn SessionProvider>,
    pub notifier: Arc<dyn NotificationSink>,
    pub source: Arc<dyn TransactionSource>,
    pub renderer: ReportRenderer,
    pub downloader: ReportDownloader,
}

impl AppContext {
    pub fn new(
        session: Arc<dyn SessionProvider>,
        notifier: Arc<dyn NotificationSink>,
        source: Arc<dyn TransactionSource>,
        renderer: ReportRenderer,
        downloader: ReportDownloader,
    ) -> Self {
        Self {
            session,
            notifier,
            source,
            renderer,
            downloader,
        }
    }

    /// Wires the HTTP source, a session for the configured token, the font
    /// source and the output directory.
    pub fn from_config(
        config: &ReportConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, ContextError> {
        let token = config
            .api_token
            .clone()
            .ok_or(ConfigError::Missing(crate::config::API_TOKEN_ENV))?;
        let session = Session::new(token, config.session_timeout);

        let http = client::default_http_client()?;
        let source = HttpTransactionSource::new(http, &config.api_base_url);

        let font_source = fonts::resolve_font_source(config.fonts_dir.as_deref());

        Ok(Self::new(
            Arc::new(session),
            notifier,
            Arc::new(source),
            ReportRenderer::new(font_source),
            ReportDownloader::new(config.output_dir.clone()),
        ))
    }
}
