//! Catalog client tests against a mocked `HttpClient`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_catalog::{CatalogClient, CatalogError, TrackCatalog};
use core_playback::Track;
use core_runtime::config::CatalogSettings;
use mockall::{mock, Sequence};

mock! {
    Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
    }
}

fn settings() -> CatalogSettings {
    CatalogSettings::default()
        .with_base_url("https://catalog.test/v3")
        .with_api_key("secret-key")
        .with_max_results(5)
}

fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

const SEARCH_BODY: &str = r#"{
    "items": [
        { "id": { "kind": "youtube#video", "videoId": "v1" },
          "snippet": { "title": "First", "channelTitle": "Band A",
                       "thumbnails": { "medium": { "url": "https://img/1.jpg" } } } },
        { "id": { "kind": "youtube#channel", "channelId": "UC9" },
          "snippet": { "title": "Channel", "channelTitle": "Band A" } },
        { "id": { "kind": "youtube#video", "videoId": "v2" },
          "snippet": { "title": "Second", "channelTitle": "Band B",
                       "thumbnails": { "high": { "url": "https://img/2.jpg" } } } }
    ]
}"#;

const DETAILS_BODY: &str = r#"{
    "items": [
        { "id": "v1",
          "contentDetails": { "duration": "PT4M2S" },
          "statistics": { "viewCount": "1234567" } }
    ]
}"#;

#[test]
fn test_requires_api_key() {
    let result = CatalogClient::new(Arc::new(MockHttp::new()), CatalogSettings::default());
    assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
}

#[tokio::test]
async fn test_search_builds_music_query() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .withf(|request| {
            request.url.starts_with("https://catalog.test/v3/search?part=snippet&maxResults=5&q=daft%20punk%20music&type=video&videoCategoryId=10&videoEmbeddable=true&key=secret-key")
        })
        .times(1)
        .returning(|_| Ok(json_response(200, SEARCH_BODY)));

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    let hits = client.search("daft punk").await.unwrap();

    let ids: Vec<_> = hits.iter().filter_map(|hit| hit.id.video_id.clone()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);
}

#[tokio::test]
async fn test_details_skip_request_for_no_ids() {
    let mut http = MockHttp::new();
    http.expect_execute().never();

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    assert!(client.video_details(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_joins_hits_and_details() {
    let mut http = MockHttp::new();
    let mut seq = Sequence::new();
    http.expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(json_response(200, SEARCH_BODY)));
    http.expect_execute()
        .withf(|request| {
            request.url
                == "https://catalog.test/v3/videos?part=snippet,contentDetails,statistics&id=v1,v2&key=secret-key"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(json_response(200, DETAILS_BODY)));

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    let tracks = client.resolve("lofi audio").await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].external_media_id, "v1");
    assert_eq!(tracks[0].raw_duration, "PT4M2S");
    assert_eq!(tracks[0].raw_view_count, "1234567");
    assert_eq!(tracks[1].thumbnail_url, "https://img/2.jpg");
    assert_eq!(tracks[1].raw_duration, "PT0S");
    assert_eq!(tracks[1].raw_view_count, "");

    let playable: Vec<Track> = tracks.into_iter().map(Track::from).collect();
    assert_eq!(playable[0].duration, "4:02");
    assert_eq!(playable[0].views.as_deref(), Some("1.2M views"));
    assert_eq!(playable[1].duration, "0:00");
    assert_eq!(playable[1].views, None);
}

#[tokio::test]
async fn test_api_error_is_surfaced_without_retry() {
    let mut http = MockHttp::new();
    http.expect_execute().times(1).returning(|_| {
        Ok(json_response(
            403,
            r#"{ "error": { "code": 403, "message": "The request cannot be completed because you have exceeded your quota." } }"#,
        ))
    });

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    let err = client.resolve("anything").await.unwrap_err();

    match err {
        CatalogError::Api { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("quota"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_without_body_uses_fallback() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(json_response(500, "<html>oops</html>")));

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    let err = client.search("x").await.unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Api { status: 500, ref message } if message == "Failed to fetch search results"
    ));
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .returning(|_| Err(BridgeError::OperationFailed("connection reset".into())));

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    let err = client.search("x").await.unwrap_err();

    assert!(matches!(err, CatalogError::Network(_)));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .returning(|_| Ok(json_response(200, "not json")));

    let client = CatalogClient::new(Arc::new(http), settings()).unwrap();
    let err = client.search("x").await.unwrap_err();

    assert!(matches!(err, CatalogError::Parse(_)));
}
