//! Response models for the CDO endpoints.
//!
//! Collection endpoints wrap their rows in a metadata/results envelope;
//! by-id endpoints return the record directly. Both forms deserialize into
//! the types here. Error and quota-exceeded bodies (`{status, message}`)
//! never surface as success values; the dispatcher folds them into
//! [`crate::Error::Http`].

use serde::{Deserialize, Serialize};

/// Pagination details of a collection response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    pub offset: i64,
    pub count: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub resultset: ResultSet,
}

/// Envelope returned by every collection endpoint.
///
/// `metadata` is absent when the caller asked `/data` for
/// `includemetadata=false`; `results` is absent when a filter matches
/// nothing at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// A dataset, e.g. `GHCND` (Daily Summaries).
///
/// `uid` is present in `/datasets` rows but not in `/datasets/{id}`
/// responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Earliest date with data, `YYYY-MM-DD`.
    pub mindate: String,
    /// Latest date with data, `YYYY-MM-DD`.
    pub maxdate: String,
    pub name: String,
    /// Proportion of data coverage, 0 to 1.
    pub datacoverage: f64,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCategory {
    pub name: String,
    pub id: String,
}

/// A data type, e.g. `TMAX`. The by-id response omits `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataType {
    pub mindate: String,
    pub maxdate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub datacoverage: f64,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCategory {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub mindate: String,
    pub maxdate: String,
    pub name: String,
    pub datacoverage: f64,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    pub mindate: String,
    pub maxdate: String,
    pub latitude: f64,
    pub name: String,
    pub datacoverage: f64,
    pub id: String,
    #[serde(default, rename = "elevationUnit", skip_serializing_if = "Option::is_none")]
    pub elevation_unit: Option<String>,
    pub longitude: f64,
}

/// One observation from `/data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    /// Observation timestamp, `YYYY-MM-DDThh:mm:ss`.
    pub date: String,
    pub datatype: String,
    pub station: String,
    /// Source/quality flags, comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    pub value: f64,
}

/// Body the service sends with rate-limit and other error statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMessage {
    pub status: String,
    pub message: String,
}
