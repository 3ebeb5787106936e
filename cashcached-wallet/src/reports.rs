//! Admin report export.
//!
//! Downloads a CSV through the [`ReportApi`] port, saves it, and tells the
//! UI how it went through a toast on the event bus.

use std::path::{Path, PathBuf};

use cashcached_types::{ApiError, ReportApi, ReportFilters, ReportKind, Toast, UiEvent};

use crate::events::EventBus;

const FALLBACK_MESSAGE: &str = "Failed to export report. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to save report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Text for the error toast: the server's message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ExportError::Api(e) => e
                .server_message()
                .map(String::from)
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            ExportError::Io { .. } => FALLBACK_MESSAGE.to_string(),
        }
    }
}

pub struct ReportExporter<R: ReportApi> {
    api: R,
    events: EventBus,
}

impl<R: ReportApi> ReportExporter<R> {
    pub fn new(api: R, events: EventBus) -> Self {
        Self { api, events }
    }

    /// Exports `kind` into `out_dir` and returns the written path.
    pub async fn export(
        &self,
        kind: ReportKind,
        filters: &ReportFilters,
        out_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        match self.try_export(kind, filters, out_dir).await {
            Ok(path) => {
                tracing::info!(report = %kind, path = %path.display(), "report exported");
                self.events.publish(UiEvent::Toast(Toast::success(format!(
                    "Report downloaded: {}",
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                ))));
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(report = %kind, error = %e, "report export failed");
                self.events.publish(UiEvent::Toast(Toast::error(e.user_message())));
                Err(e)
            }
        }
    }

    async fn try_export(
        &self,
        kind: ReportKind,
        filters: &ReportFilters,
        out_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let report = self.api.export_csv(kind, filters).await?;
        let path = out_dir.join(&report.filename);

        let io_err = |source| ExportError::Io {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(out_dir).await.map_err(io_err)?;
        tokio::fs::write(&path, &report.content)
            .await
            .map_err(io_err)?;

        Ok(path)
    }
}
