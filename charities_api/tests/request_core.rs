use std::time::Duration;

use charities_api::types::Regulator;
use charities_api::{
    AuthProvider, ClientConfig, ConfigError, Error, HeaderMap, HeaderValue, QueryParams,
    RequestBody, RequestCore, RequestOptions, ResponseBody,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestAuth;

impl AuthProvider for TestAuth {
    fn regulator(&self) -> Regulator {
        Regulator::Ccew
    }

    fn default_base_url(&self) -> &'static str {
        "https://example.invalid/api"
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("test-key"));
        headers
    }
}

fn config(base_url: &str, max_retries: u32) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(base_url)
        .with_max_retries(max_retries)
        .with_retry_base_delay(Duration::from_millis(1))
        .with_retry_max_delay(Duration::from_millis(5))
        .with_retry_jitter(false)
}

fn core(base_url: &str, max_retries: u32) -> RequestCore<TestAuth> {
    RequestCore::new(TestAuth, &config(base_url, max_retries)).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn get_sends_default_and_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .and(header("accept", "application/json"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = core(&server.uri(), 0)
        .get("/things", RequestOptions::new())
        .await
        .unwrap();
    assert!(resp.ok);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, ResponseBody::Json(json!({"ok": true})));
}

#[tokio::test]
async fn caller_headers_override_defaults_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .and(header("accept", "text/csv"))
        .and(header("x-api-key", "override"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a,b"))
        .expect(1)
        .mount(&server)
        .await;

    let options = RequestOptions::new()
        .with_header("accept", HeaderValue::from_static("text/csv"))
        .with_header("x-api-key", HeaderValue::from_static("override"));
    let resp = core(&server.uri(), 0).get("/things", options).await.unwrap();
    assert_eq!(resp.body, ResponseBody::Text("a,b".to_string()));
    assert_eq!(resp.raw_text, "a,b");
}

#[tokio::test]
async fn query_parameters_skip_empty_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .and(query_param("flag", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let query = QueryParams::new()
        .with("page", 1)
        .with("search", None::<String>)
        .with("note", "")
        .with("flag", false);
    core(&server.uri(), 0)
        .get("/search", RequestOptions::new().with_query(query))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let qs = requests[0].url.query().unwrap_or_default().to_string();
    assert!(qs.contains("page=1"));
    assert!(qs.contains("flag=false"));
    assert!(!qs.contains("search"));
    assert!(!qs.contains("note"));
}

#[tokio::test]
async fn retries_server_error_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .mount(&server)
        .await;

    let resp = core(&server.uri(), 3)
        .get("/flaky", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn unbounded_retry_budget_is_logged_without_overflow() {
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish(),
    );
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .mount(&server)
        .await;

    let resp = core(&server.uri(), u32::MAX)
        .get("/flaky", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn persistent_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = core(&server.uri(), 2)
        .get("/down", RequestOptions::new())
        .await
        .unwrap_err();
    match err {
        Error::Api { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn request_timeout_status_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(408))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let resp = core(&server.uri(), 1)
        .get("/slow", RequestOptions::new())
        .await
        .unwrap();
    assert!(resp.ok);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn not_found_is_classified_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = core(&server.uri(), 3)
        .get("/missing", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn other_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unprocessable"))
        .mount(&server)
        .await;

    let err = core(&server.uri(), 3)
        .get("/bad", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 422, .. }));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn authentication_failures_carry_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/401"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/403"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let core = core(&server.uri(), 2);
    let err = core.get("/401", RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed { status: 401 }));
    let err = core.get("/403", RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed { status: 403 }));
    assert_eq!(request_count(&server).await, 2);
}

async fn rate_limited_with(retry_after: Option<&str>) -> Error {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(429);
    if let Some(value) = retry_after {
        template = template.insert_header("retry-after", value);
    }
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(template)
        .mount(&server)
        .await;
    core(&server.uri(), 0)
        .get("/limited", RequestOptions::new())
        .await
        .unwrap_err()
}

#[tokio::test]
async fn rate_limit_exposes_numeric_retry_after() {
    let err = rate_limited_with(Some("30")).await;
    match err {
        Error::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(30)))
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn rate_limit_without_usable_retry_after() {
    for value in [None, Some("soon"), Some("")] {
        let err = rate_limited_with(value).await;
        assert!(
            matches!(err, Error::RateLimited { retry_after: None }),
            "{:?} -> {:?}",
            value,
            err
        );
    }
}

#[tokio::test]
async fn rate_limit_is_retried_before_surfacing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resp = core(&server.uri(), 1)
        .get("/limited", RequestOptions::new())
        .await
        .unwrap();
    assert!(resp.ok);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn malformed_json_falls_back_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not valid json}", "application/json"))
        .mount(&server)
        .await;

    let core = core(&server.uri(), 0);
    let resp = core.get("/broken", RequestOptions::new()).await.unwrap();
    assert!(resp.ok);
    assert_eq!(resp.body, ResponseBody::Text("{not valid json}".to_string()));
    assert!(matches!(
        core.expect_json(resp),
        Err(Error::Api { status: 200, .. })
    ));
}

#[tokio::test]
async fn post_serializes_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"searchText": "oxfam", "pageNumber": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalCount": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let body = RequestBody::Json(json!({"searchText": "oxfam", "pageNumber": 0}));
    let resp = core(&server.uri(), 0)
        .post("/search", body, RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.body.as_json().unwrap()["totalCount"], 0);
}

#[tokio::test]
async fn post_sends_text_bodies_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/raw"))
        .and(body_string("name=oxfam&page=1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resp = core(&server.uri(), 0)
        .post("/raw", RequestBody::from("name=oxfam&page=1"), RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.status, 204);
    assert!(resp.is_blank());
}

#[tokio::test]
async fn timeouts_become_network_failures_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hang"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = config(&server.uri(), 1).with_timeout(Duration::from_millis(50));
    let core = RequestCore::new(TestAuth, &config).unwrap();
    let err = core.get("/hang", RequestOptions::new()).await.unwrap_err();
    match err {
        Error::NetworkFailure { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(source.is_timeout());
        }
        other => panic!("expected NetworkFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn connection_refused_is_a_network_failure() {
    let core = core("http://127.0.0.1:1", 1);
    let err = core.get("/x", RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::NetworkFailure { attempts: 2, .. }), "{:?}", err);
}

#[tokio::test]
async fn cached_fetches_once_per_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"v": 7})))
        .mount(&server)
        .await;

    let core = core(&server.uri(), 0);
    let key = core.cache_key("value", &QueryParams::new().with("id", 7));
    for _ in 0..2 {
        let value: serde_json::Value = core
            .cached(&key, || async {
                let resp = core.get("/value", RequestOptions::new()).await?;
                core.expect_json(resp)
            })
            .await
            .unwrap();
        assert_eq!(value["v"], 7);
    }
    assert_eq!(request_count(&server).await, 1);

    core.clear_cache();
    let _: serde_json::Value = core
        .cached(&key, || async {
            let resp = core.get("/value", RequestOptions::new()).await?;
            core.expect_json(resp)
        })
        .await
        .unwrap();
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn errors_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let core = core(&server.uri(), 0);
    for _ in 0..2 {
        let result: Result<serde_json::Value, Error> = core
            .cached("k", || async {
                let resp = core.get("/missing", RequestOptions::new()).await?;
                core.expect_json(resp)
            })
            .await;
        assert!(result.is_err());
    }
    assert_eq!(request_count(&server).await, 2);
}

#[test]
fn cache_keys_are_scoped_by_regulator_and_operation() {
    let core = core("http://localhost", 0);
    let params = QueryParams::new().with("id", "123").with("page", 2);
    assert_eq!(core.cache_key("getCharity", &params), "CCEW:getCharity:id=123&page=2");
    assert_ne!(
        core.cache_key("getCharity", &params),
        core.cache_key("getTrustees", &params)
    );
}

#[test]
fn disabled_cache_config_stores_nothing() {
    let config = config("http://localhost", 0).with_cache_enabled(false);
    let core = RequestCore::new(TestAuth, &config).unwrap();
    core.set_cache("k", &Some(1));
    assert_eq!(core.get_cached::<Option<i32>>("k"), None);
}

#[test]
fn negative_results_round_trip_through_cache() {
    let core = core("http://localhost", 0);
    core.set_cache("k", &None::<String>);
    assert_eq!(core.get_cached::<Option<String>>("k"), Some(None));
}

#[test]
fn invalid_base_url_is_rejected() {
    let config = ClientConfig::new().with_base_url("not a url");
    let result = RequestCore::new(TestAuth, &config);
    assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
}

#[test]
fn default_base_url_is_used_without_override() {
    let core = RequestCore::new(TestAuth, &ClientConfig::default()).unwrap();
    assert_eq!(core.base_url(), "https://example.invalid/api");
}
