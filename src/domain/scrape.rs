use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::domain::record::ExtractedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Company,
    Profile,
    Post,
}

impl PageKind {
    pub fn parse(kind: &str) -> Result<Self, RequestValidationError> {
        match kind {
            "company" => Ok(PageKind::Company),
            "profile" => Ok(PageKind::Profile),
            "post" => Ok(PageKind::Post),
            other => Err(RequestValidationError::UnknownKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Company => "company",
            PageKind::Profile => "profile",
            PageKind::Post => "post",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestValidationError {
    #[error("malformed url: {0}")]
    MalformedUrl(#[from] url::ParseError),
    #[error("unknown page type: {0}")]
    UnknownKind(String),
}

/// A validated scrape request. Construct through [`ScrapeRequest::parse`] so
/// the url and page kind invariants hold before any resource is acquired.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: Url,
    pub kind: PageKind,
    pub page_id: Option<String>,
}

impl ScrapeRequest {
    pub fn parse(
        url: &str,
        kind: &str,
        page_id: Option<String>,
    ) -> Result<Self, RequestValidationError> {
        let kind = PageKind::parse(kind)?;
        let url = Url::parse(url)?;
        Ok(ScrapeRequest { url, kind, page_id })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Success,
    Partial,
    Failed,
}

impl ScrapeStatus {
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "success" => Some(ScrapeStatus::Success),
            "partial" => Some(ScrapeStatus::Partial),
            "failed" => Some(ScrapeStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::Success => "success",
            ScrapeStatus::Partial => "partial",
            ScrapeStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    NotFound,
    ParseFailure,
}

/// One field the extractor could not populate. Accumulated per run and
/// persisted with the log entry, never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn not_found(field: &str) -> Self {
        FieldError {
            field: field.to_string(),
            kind: FieldErrorKind::NotFound,
        }
    }

    pub fn parse_failure(field: &str) -> Self {
        FieldError {
            field: field.to_string(),
            kind: FieldErrorKind::ParseFailure,
        }
    }
}

/// Outcome of one scrape attempt. Written once by the recorder and read
/// back by id or filtered query, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperLog {
    pub url: String,
    pub kind: PageKind,
    pub page_id: Option<String>,
    pub status: ScrapeStatus,
    pub failure_reason: Option<String>,
    pub field_errors: Vec<FieldError>,
    pub record: Option<ExtractedRecord>,
    pub attempted_at: DateTime<Utc>,
}

impl ScraperLog {
    pub fn failed(request: &ScrapeRequest, reason: String) -> Self {
        ScraperLog {
            url: request.url.to_string(),
            kind: request.kind,
            page_id: request.page_id.clone(),
            status: ScrapeStatus::Failed,
            failure_reason: Some(reason),
            field_errors: vec![],
            record: None,
            attempted_at: Utc::now(),
        }
    }

    pub fn extracted(
        request: &ScrapeRequest,
        record: ExtractedRecord,
        field_errors: Vec<FieldError>,
    ) -> Self {
        let status = match field_errors.is_empty() {
            true => ScrapeStatus::Success,
            false => ScrapeStatus::Partial,
        };
        ScraperLog {
            url: request.url.to_string(),
            kind: request.kind,
            page_id: request.page_id.clone(),
            status,
            failure_reason: None,
            field_errors,
            record: Some(record),
            attempted_at: Utc::now(),
        }
    }
}

/// A log entry as the store returns it, with its assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScraperLog {
    pub id: Uuid,
    #[serde(flatten)]
    pub log: ScraperLog,
}

#[cfg(test)]
mod tests {
    use super::{PageKind, RequestValidationError, ScrapeRequest};

    #[test]
    fn page_kind_parses_the_three_variants() {
        assert_eq!(PageKind::parse("company").unwrap(), PageKind::Company);
        assert_eq!(PageKind::parse("profile").unwrap(), PageKind::Profile);
        assert_eq!(PageKind::parse("post").unwrap(), PageKind::Post);
    }

    #[test]
    fn page_kind_rejects_anything_else() {
        for kind in ["group", "Company", "COMPANY", "", "event"] {
            assert!(matches!(
                PageKind::parse(kind),
                Err(RequestValidationError::UnknownKind(_))
            ));
        }
    }

    #[test]
    fn scrape_request_accepts_absolute_urls() {
        let request =
            ScrapeRequest::parse("https://www.linkedin.com/company/acme/", "company", None)
                .unwrap();
        assert_eq!(request.url.host_str(), Some("www.linkedin.com"));
        assert_eq!(request.kind, PageKind::Company);
        assert!(request.page_id.is_none());
    }

    #[test]
    fn scrape_request_rejects_relative_urls() {
        assert!(matches!(
            ScrapeRequest::parse("/company/acme", "company", None),
            Err(RequestValidationError::MalformedUrl(_))
        ));
    }

    #[test]
    fn scrape_request_rejects_unknown_kind_before_url() {
        assert!(matches!(
            ScrapeRequest::parse("https://www.linkedin.com/groups/1/", "group", None),
            Err(RequestValidationError::UnknownKind(_))
        ));
    }
}
