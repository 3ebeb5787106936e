//! Report export port.

use crate::domain::{ExportedReport, ReportFilters, ReportKind};
use crate::error::ApiError;

#[async_trait::async_trait]
pub trait ReportApi: Send + Sync + 'static {
    /// `GET /api/v1/{kind}/reports/export-csv?<filters>`
    async fn export_csv(
        &self,
        kind: ReportKind,
        filters: &ReportFilters,
    ) -> Result<ExportedReport, ApiError>;
}
