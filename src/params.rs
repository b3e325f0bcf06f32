//! Query parameter records for the CDO endpoints.
//!
//! Every endpoint method builds a [`Params`] record from a typed query
//! struct and hands it to the dispatcher, which serializes it as URL query
//! parameters. Multi-value id filters are sent as `&`-joined chains, the
//! format the service documents.

use std::collections::BTreeMap;

use crate::util::join_ids;

/// Maximum accepted value for the `limit` parameter. Larger values are
/// rejected by the dispatcher before any request is made.
pub const MAX_LIMIT: i64 = 1000;

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    fn render(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Bool(b) => b.to_string(),
        }
    }
}

/// A parameter record: declared parameter names mapped to scalar values.
///
/// Empty string values are omitted rather than sent, so unset filters do
/// not appear in the request URL at all.
#[derive(Debug, Clone, Default)]
pub struct Params(BTreeMap<&'static str, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `limit` parameter, if one is set.
    pub fn limit(&self) -> Option<i64> {
        match self.0.get("limit") {
            Some(ParamValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn set_str(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(key, ParamValue::Str(value));
        }
    }

    pub(crate) fn set_ids(&mut self, key: &'static str, ids: &[String]) {
        self.set_str(key, join_ids(ids));
    }

    pub(crate) fn set_int(&mut self, key: &'static str, value: Option<i64>) {
        if let Some(value) = value {
            self.0.insert(key, ParamValue::Int(value));
        }
    }

    pub(crate) fn set_bool(&mut self, key: &'static str, value: Option<bool>) {
        if let Some(value) = value {
            self.0.insert(key, ParamValue::Bool(value));
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        self.0.iter().map(|(k, v)| (*k, v.render())).collect()
    }
}

/// Field to sort results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    MinDate,
    MaxDate,
    DataCoverage,
}

impl SortField {
    fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::MinDate => "mindate",
            SortField::MaxDate => "maxdate",
            SortField::DataCoverage => "datacoverage",
        }
    }
}

/// Sort direction. The service default is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Unit conversion for `/data` values. The service default is no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Standard,
    Metric,
}

impl Units {
    fn as_str(self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
        }
    }
}

/// Pagination and sorting fields shared by every collection endpoint.
#[derive(Debug, Clone, Default)]
pub struct Paging {
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    /// Maximum number of results per page. Service default is 25, maximum 1000.
    pub limit: Option<i64>,
    /// Number of results to skip. Service default is 0.
    pub offset: Option<i64>,
}

impl Paging {
    fn apply(&self, params: &mut Params) {
        if let Some(f) = self.sort_field {
            params.set_str("sortfield", f.as_str());
        }
        if let Some(o) = self.sort_order {
            params.set_str("sortorder", o.as_str());
        }
        params.set_int("limit", self.limit);
        params.set_int("offset", self.offset);
    }
}

/// Filters for `/datasets`.
#[derive(Debug, Clone, Default)]
pub struct DatasetsQuery {
    pub datatype_ids: Vec<String>,
    pub location_ids: Vec<String>,
    pub station_ids: Vec<String>,
    /// Beginning of date range, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// End of date range, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    pub paging: Paging,
}

impl DatasetsQuery {
    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_ids("datatypeid", &self.datatype_ids);
        p.set_ids("locationid", &self.location_ids);
        p.set_ids("stationid", &self.station_ids);
        p.set_str("startdate", self.start_date.unwrap_or_default());
        p.set_str("enddate", self.end_date.unwrap_or_default());
        self.paging.apply(&mut p);
        p
    }
}

/// Filters for `/datacategories`.
#[derive(Debug, Clone, Default)]
pub struct DataCategoriesQuery {
    pub dataset_ids: Vec<String>,
    pub location_ids: Vec<String>,
    pub station_ids: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub paging: Paging,
}

impl DataCategoriesQuery {
    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_ids("datasetid", &self.dataset_ids);
        p.set_ids("locationid", &self.location_ids);
        p.set_ids("stationid", &self.station_ids);
        p.set_str("startdate", self.start_date.unwrap_or_default());
        p.set_str("enddate", self.end_date.unwrap_or_default());
        self.paging.apply(&mut p);
        p
    }
}

/// Filters for `/datatypes`.
#[derive(Debug, Clone, Default)]
pub struct DataTypesQuery {
    pub dataset_ids: Vec<String>,
    pub location_ids: Vec<String>,
    pub station_ids: Vec<String>,
    pub data_category_ids: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub paging: Paging,
}

impl DataTypesQuery {
    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_ids("datasetid", &self.dataset_ids);
        p.set_ids("locationid", &self.location_ids);
        p.set_ids("stationid", &self.station_ids);
        p.set_ids("datacategoryid", &self.data_category_ids);
        p.set_str("startdate", self.start_date.unwrap_or_default());
        p.set_str("enddate", self.end_date.unwrap_or_default());
        self.paging.apply(&mut p);
        p
    }
}

/// Filters for `/locationcategories`.
#[derive(Debug, Clone, Default)]
pub struct LocationCategoriesQuery {
    pub dataset_ids: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub paging: Paging,
}

impl LocationCategoriesQuery {
    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_ids("datasetid", &self.dataset_ids);
        p.set_str("startdate", self.start_date.unwrap_or_default());
        p.set_str("enddate", self.end_date.unwrap_or_default());
        self.paging.apply(&mut p);
        p
    }
}

/// Filters for `/locations`.
#[derive(Debug, Clone, Default)]
pub struct LocationsQuery {
    pub dataset_ids: Vec<String>,
    pub location_category_ids: Vec<String>,
    pub data_category_ids: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub paging: Paging,
}

impl LocationsQuery {
    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_ids("datasetid", &self.dataset_ids);
        p.set_ids("locationcategoryid", &self.location_category_ids);
        p.set_ids("datacategoryid", &self.data_category_ids);
        p.set_str("startdate", self.start_date.unwrap_or_default());
        p.set_str("enddate", self.end_date.unwrap_or_default());
        self.paging.apply(&mut p);
        p
    }
}

/// Filters for `/stations`.
#[derive(Debug, Clone, Default)]
pub struct StationsQuery {
    pub dataset_ids: Vec<String>,
    pub location_ids: Vec<String>,
    pub data_category_ids: Vec<String>,
    pub datatype_ids: Vec<String>,
    /// Geographic bounding box,
    /// `latitude_min,longitude_min,latitude_max,longitude_max`.
    pub extent: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub paging: Paging,
}

impl StationsQuery {
    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_ids("datasetid", &self.dataset_ids);
        p.set_ids("locationid", &self.location_ids);
        p.set_ids("datacategoryid", &self.data_category_ids);
        p.set_ids("datatypeid", &self.datatype_ids);
        p.set_str("extent", self.extent.unwrap_or_default());
        p.set_str("startdate", self.start_date.unwrap_or_default());
        p.set_str("enddate", self.end_date.unwrap_or_default());
        self.paging.apply(&mut p);
        p
    }
}

/// Query for `/data`. Dataset id and date range are mandatory; annual and
/// monthly data are limited by the service to a 10-year range, everything
/// else to a 1-year range (enforced server-side, since the allowed range
/// depends on the datatype).
#[derive(Debug, Clone)]
pub struct DataQuery {
    pub dataset_id: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ss`.
    pub start_date: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ss`.
    pub end_date: String,
    pub datatype_ids: Vec<String>,
    pub location_ids: Vec<String>,
    pub station_ids: Vec<String>,
    pub units: Option<Units>,
    /// Set to `false` to skip the metadata envelope calculation.
    pub include_metadata: Option<bool>,
    pub paging: Paging,
}

impl DataQuery {
    pub fn new(
        dataset_id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            datatype_ids: Vec::new(),
            location_ids: Vec::new(),
            station_ids: Vec::new(),
            units: None,
            include_metadata: None,
            paging: Paging::default(),
        }
    }

    pub(crate) fn into_params(self) -> Params {
        let mut p = Params::new();
        p.set_str("datasetid", self.dataset_id);
        p.set_str("startdate", self.start_date);
        p.set_str("enddate", self.end_date);
        p.set_ids("datatypeid", &self.datatype_ids);
        p.set_ids("locationid", &self.location_ids);
        p.set_ids("stationid", &self.station_ids);
        if let Some(u) = self.units {
            p.set_str("units", u.as_str());
        }
        p.set_bool("includemetadata", self.include_metadata);
        self.paging.apply(&mut p);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_are_omitted() {
        let params = DatasetsQuery::default().into_params();
        assert!(params.is_empty());
    }

    #[test]
    fn id_filters_join_with_ampersands() {
        let query = DataTypesQuery {
            station_ids: vec!["GHCND:USW00094728".into(), "GHCND:USC00042319".into()],
            ..Default::default()
        };
        let q = query.into_params().to_query();
        assert!(
            q.contains(&("stationid", "GHCND:USW00094728&GHCND:USC00042319".to_string()))
        );
    }

    #[test]
    fn limit_is_visible_to_the_dispatcher() {
        let query = DatasetsQuery {
            paging: Paging {
                limit: Some(1001),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(query.into_params().limit(), Some(1001));
    }

    #[test]
    fn data_query_carries_required_fields() {
        let q = DataQuery::new("GHCND", "2022-01-01", "2022-01-31")
            .into_params()
            .to_query();
        assert!(q.contains(&("datasetid", "GHCND".to_string())));
        assert!(q.contains(&("startdate", "2022-01-01".to_string())));
        assert!(q.contains(&("enddate", "2022-01-31".to_string())));
    }

    #[test]
    fn booleans_render_lowercase() {
        let mut query = DataQuery::new("GHCND", "2022-01-01", "2022-01-31");
        query.include_metadata = Some(false);
        let q = query.into_params().to_query();
        assert!(q.contains(&("includemetadata", "false".to_string())));
    }
}
