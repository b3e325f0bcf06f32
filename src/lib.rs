//! An async Rust client for the NOAA NCEI Climate Data Online (CDO) Web API v2.
//!
//! The client handles authentication, the service's request quotas
//! (5 requests/second, 10,000 requests/day), and connection pooling, and
//! exposes one typed query method per endpoint: datasets, data categories,
//! data types, location categories, locations, stations, and the actual
//! climate observations.
//!
//! ## Quick start
//! - Get a token from <https://www.ncdc.noaa.gov/cdo-web/token>.
//! - Configure it via `CDO_API_TOKEN`, a `.cdorc` file (current or home
//!   directory), or pass it to [`Client::new`].
//!
//! ```no_run
//! use cdoapi::{Client, DataQuery};
//!
//! #[tokio::main]
//! async fn main() -> cdoapi::Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let datasets = client.datasets(Default::default(), None).await?;
//!     for dataset in &datasets.results {
//!         println!("{}: {}", dataset.id, dataset.name);
//!     }
//!
//!     let mut query = DataQuery::new("GHCND", "2022-01-01", "2022-01-31");
//!     query.station_ids = vec!["GHCND:USW00094728".to_string()];
//!     let observations = client.data(query, None).await?;
//!     println!("{} observations", observations.results.len());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! Responses can additionally be checked against the documented shapes with
//! the [`schema`] module, which the sample-capture programs use for
//! regression checks.

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod limiter;
pub mod models;
mod params;
pub mod schema;
mod util;

pub use client::{Client, ClientConfig, ENDPOINT, TokenLocation};
pub use error::{Error, Result};
pub use limiter::RequestPacer;
pub use models::{
    Collection, DataCategory, DataPoint, DataType, Dataset, Location, LocationCategory, Metadata,
    ResultSet, ServiceMessage, Station,
};
pub use params::{
    DataCategoriesQuery, DataQuery, DataTypesQuery, DatasetsQuery, LocationCategoriesQuery,
    LocationsQuery, MAX_LIMIT, Paging, ParamValue, Params, SortField, SortOrder, StationsQuery,
    Units,
};
