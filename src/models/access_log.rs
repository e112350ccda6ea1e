use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One access-log row: a visitor identity with an access counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLog {
    pub id: i64,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub email: Option<String>,
    pub access_count: i64,
    pub last_access_time: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
pub struct RecordAccessRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAccessResponse {
    pub message: String,
    #[serde(rename = "accessLog")]
    pub access_log: AccessLog,
}

/// Columns the backend accepts in the `sortBy` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Ipv4,
    Ipv6,
    Email,
    AccessCount,
    LastAccessTime,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Email => "email",
            Self::AccessCount => "access_count",
            Self::LastAccessTime => "last_access_time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Pagination, sorting and search parameters for the access-log listing.
/// Unset fields are left to the backend's defaults.
#[derive(Debug, Default, Clone)]
pub struct AccessLogQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
}

impl AccessLogQuery {
    /// Query-string pairs in the backend's vocabulary.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(field) = self.sort_by {
            pairs.push(("sortBy", field.as_str().to_string()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder", order.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// One page of access logs plus pagination bookkeeping.
#[derive(Debug, Deserialize)]
pub struct GetAccessLogsResponse {
    pub data: Vec<AccessLog>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// The statistics card numbers on the access-count page.
#[derive(Debug, Deserialize)]
pub struct AccessCountStats {
    pub total: u64,
    #[serde(rename = "uniqueIPs")]
    pub unique_ips: u64,
    #[serde(rename = "totalAccessCount")]
    pub total_access_count: u64,
}
