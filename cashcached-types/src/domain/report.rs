//! Admin report export: kinds, filters, and downloaded files.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reports the backend can export as CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Product,
    Customer,
    Accounts,
}

impl ReportKind {
    /// Path segment under `/api/v1/`.
    pub fn segment(&self) -> &'static str {
        match self {
            ReportKind::Product => "product",
            ReportKind::Customer => "customer",
            ReportKind::Accounts => "accounts",
        }
    }

    /// Relative export path, without the query string.
    pub fn export_path(&self) -> String {
        format!("/api/v1/{}/reports/export-csv", self.segment())
    }

    /// Filename used when the server sends no `Content-Disposition`.
    pub fn default_filename(&self, date: NaiveDate) -> String {
        format!("{}-report-{}.csv", self.segment(), date.format("%Y-%m-%d"))
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product" | "products" => Ok(ReportKind::Product),
            "customer" | "customers" => Ok(ReportKind::Customer),
            "accounts" | "account" => Ok(ReportKind::Accounts),
            _ => Err(format!(
                "Unknown report: {}. Supported: product, customer, accounts",
                s
            )),
        }
    }
}

/// Query filters for a report export.
///
/// Keeps insertion order. Blank values are dropped so that an untouched
/// form field never reaches the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    params: Vec<(String, String)>,
}

impl ReportFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key=value` unless the value is blank. A repeated key replaces
    /// the earlier value in place.
    pub fn with(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let key = key.into();
        let value = value.as_ref().trim();
        if key.trim().is_empty() || value.is_empty() {
            return self;
        }
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.params.push((key, value.to_string())),
        }
        self
    }

    /// Adds `key=value` when `value` is present.
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl AsRef<str>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn status(self, status: Option<&str>) -> Self {
        self.with_opt("status", status)
    }

    pub fn search(self, term: Option<&str>) -> Self {
        self.with_opt("search", term)
    }

    pub fn customer_id(self, id: Option<&str>) -> Self {
        self.with_opt("customerId", id)
    }

    pub fn product_code(self, code: Option<&str>) -> Self {
        self.with_opt("productCode", code)
    }

    pub fn date_range(self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
        self.with_opt("fromDate", from.map(fmt))
            .with_opt("toDate", to.map(fmt))
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Percent-encoded `k=v&k=v`, empty when there are no filters.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A downloaded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub kind: ReportKind,
    pub filename: String,
    pub content: Vec<u8>,
}

/// Extracts a safe filename from a `Content-Disposition` header value.
///
/// `filename*=` (RFC 5987) wins over `filename=`. Any directory part is
/// stripped; `.`/`..`/empty names yield `None`.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let params: Vec<(String, &str)> = header
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            Some((key.trim().to_ascii_lowercase(), value.trim()))
        })
        .collect();

    let extended = params
        .iter()
        .find(|(key, _)| key == "filename*")
        .and_then(|(_, value)| {
            let encoded = value
                .split_once("''")
                .map(|(_, rest)| rest)
                .unwrap_or(*value);
            urlencoding::decode(encoded.trim_matches('"'))
                .ok()
                .map(|decoded| decoded.into_owned())
        });

    let plain = || {
        params
            .iter()
            .find(|(key, _)| key == "filename")
            .map(|(_, value)| value.trim_matches('"').to_string())
    };

    let raw = extended.or_else(plain)?;
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match name {
        "" | "." | ".." => None,
        _ => Some(name.to_string()),
    }
}
