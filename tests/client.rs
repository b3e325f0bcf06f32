//! Dispatch tests against a local mock server: parameter validation before
//! I/O, token precedence, and HTTP failure surfacing.

use std::time::{Duration, Instant};

use cdoapi::{Client, DataQuery, DatasetsQuery, Error, Paging};
use mockito::{Matcher, Server, ServerGuard};

const DATASETS_BODY: &str = r#"{
    "metadata": {"resultset": {"offset": 1, "count": 11, "limit": 25}},
    "results": [{
        "uid": "gov.noaa.ncdc:C00861",
        "mindate": "1763-01-01",
        "maxdate": "2026-08-20",
        "name": "Daily Summaries",
        "datacoverage": 1,
        "id": "GHCND"
    }]
}"#;

async fn server_and_client(token: Option<&str>) -> (ServerGuard, Client) {
    let server = Server::new_async().await;
    let client = Client::new(token.map(str::to_string)).with_url(server.url());
    (server, client)
}

#[tokio::test]
async fn oversized_limit_fails_before_any_request() {
    let (mut server, client) = server_and_client(Some("A")).await;
    let unreached = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let query = DatasetsQuery {
        paging: Paging {
            limit: Some(1001),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = client.datasets(query, None).await.unwrap_err();

    assert!(matches!(err, Error::InvalidParameter(_)));
    unreached.assert_async().await;
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let (mut server, client) = server_and_client(None).await;
    let unreached = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client
        .datasets(DatasetsQuery::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingToken));
    unreached.assert_async().await;
}

#[tokio::test]
async fn per_call_token_overrides_everything() {
    let (mut server, client) = server_and_client(Some("A")).await;
    let mock = server
        .mock("GET", "/datasets")
        .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
        .match_header("token", "C")
        .with_header("content-type", "application/json")
        .with_body(DATASETS_BODY)
        .create_async()
        .await;

    let query = DatasetsQuery {
        paging: Paging {
            limit: Some(5),
            ..Default::default()
        },
        ..Default::default()
    };
    let datasets = client.datasets(query, Some("C")).await.unwrap();

    assert_eq!(datasets.results[0].id, "GHCND");
    mock.assert_async().await;
}

#[tokio::test]
async fn session_token_wins_over_client_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/datasets")
        .match_header("token", "B")
        .with_body(DATASETS_BODY)
        .create_async()
        .await;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert("token", reqwest::header::HeaderValue::from_static("B"));
    let session = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap();

    // Attribute token "A" must lose to the session-bound "B".
    let client = Client::new(Some("A".to_string()))
        .with_url(server.url())
        .with_session(session, true);

    client.datasets(DatasetsQuery::default(), None).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn client_token_is_sent_when_session_has_none() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/datasets")
        .match_header("token", "A")
        .with_body(DATASETS_BODY)
        .create_async()
        .await;

    let client = Client::new(Some("A".to_string()))
        .with_url(server.url())
        .with_session(reqwest::Client::new(), false);

    client.datasets(DatasetsQuery::default(), None).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn owned_session_carries_the_client_token() {
    let (mut server, client) = server_and_client(Some("A")).await;
    let mock = server
        .mock("GET", "/datasets/GHCND")
        .match_header("token", "A")
        .with_body(
            r#"{
                "mindate": "1763-01-01",
                "maxdate": "2026-08-20",
                "name": "Daily Summaries",
                "datacoverage": 1,
                "id": "GHCND"
            }"#,
        )
        .create_async()
        .await;

    let dataset = client.dataset_by_id("GHCND", None).await.unwrap();
    assert_eq!(dataset.name, "Daily Summaries");
    mock.assert_async().await;
}

#[tokio::test]
async fn quota_exceeded_surfaces_as_http_429_without_retry() {
    let (mut server, client) = server_and_client(Some("A")).await;
    let mock = server
        .mock("GET", "/datasets")
        .with_status(429)
        .with_body(r#"{"status":"429","message":"This token has reached its request limit"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client
        .datasets(DatasetsQuery::default(), None)
        .await
        .unwrap_err();

    match err {
        Error::Http {
            status, message, ..
        } => {
            assert_eq!(status, 429);
            assert_eq!(message, "This token has reached its request limit");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn data_query_sends_required_fields() {
    let (mut server, client) = server_and_client(Some("A")).await;
    let mock = server
        .mock("GET", "/data")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("datasetid".into(), "GHCND".into()),
            Matcher::UrlEncoded("startdate".into(), "2022-01-01".into()),
            Matcher::UrlEncoded("enddate".into(), "2022-01-31".into()),
            Matcher::UrlEncoded("stationid".into(), "GHCND:USW00094728".into()),
        ]))
        .with_body(
            r#"{
                "metadata": {"resultset": {"offset": 1, "count": 1, "limit": 25}},
                "results": [{
                    "date": "2022-01-01T00:00:00",
                    "datatype": "TMAX",
                    "station": "GHCND:USW00094728",
                    "attributes": ",,W,2400",
                    "value": 44
                }]
            }"#,
        )
        .create_async()
        .await;

    let mut query = DataQuery::new("GHCND", "2022-01-01", "2022-01-31");
    query.station_ids = vec!["GHCND:USW00094728".to_string()];
    let data = client.data(query, None).await.unwrap();

    assert_eq!(data.results[0].datatype, "TMAX");
    assert_eq!(data.results[0].value, 44.0);
    mock.assert_async().await;
}

#[tokio::test]
async fn dispatch_waits_for_a_rate_limit_slot() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/datasets")
        .with_body(DATASETS_BODY)
        .expect(2)
        .create_async()
        .await;

    // A 1/second quota makes the second dispatch stall for the window.
    let client = Client::new(Some("A".to_string()))
        .with_url(server.url())
        .with_rate_limits(1, 10_000);

    let start = Instant::now();
    client.datasets(DatasetsQuery::default(), None).await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));

    client.datasets(DatasetsQuery::default(), None).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(1));

    mock.assert_async().await;
}

#[tokio::test]
async fn closed_client_recreates_its_session() {
    let (mut server, client) = server_and_client(Some("A")).await;
    let mock = server
        .mock("GET", "/datasets")
        .with_body(DATASETS_BODY)
        .expect(2)
        .create_async()
        .await;

    client.datasets(DatasetsQuery::default(), None).await.unwrap();
    client.close();
    client.datasets(DatasetsQuery::default(), None).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (mut server, client) = server_and_client(Some("A")).await;
    server
        .mock("GET", "/datasets")
        .with_body("{not json")
        .create_async()
        .await;

    let err = client
        .datasets(DatasetsQuery::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}
