use babylog_client::http_client::HttpDataSource;
use babylog_client::retry::RetryPolicy;
use babylog_client::{Config, DataSource, Delimiter, TableName};
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLEEP_BODY: &str = "日期 入睡 睡醒 总睡眠时间（mins）\n\
2024-03-09 21:10 23:40 150\n\
2024-03-10 23:30 00:15 45\n";

#[tokio::test]
async fn fetch_table_reads_whitespace_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/sleep_data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SLEEP_BODY))
        .mount(&server)
        .await;

    let src = HttpDataSource::new(&format!("{}/data", server.uri())).expect("source");
    let table = src.fetch_table(TableName::Sleep).await.expect("table");
    assert_eq!(table.column_count(), 4);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[1], vec!["2024-03-10", "23:30", "00:15", "45"]);
}

#[tokio::test]
async fn fetch_table_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeding_data.csv"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("date,type,time,ml\n2024-03-10,formula,08:00,120\n"),
        )
        .mount(&server)
        .await;

    let src = HttpDataSource::new(&server.uri())
        .expect("source")
        .with_delimiter(Delimiter::Comma)
        .with_token(SecretString::new("tok".into()));
    let table = src.fetch_table(TableName::Feeding).await.expect("table");
    assert_eq!(table.rows[0][1], "formula");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn not_found_is_fetch_failure_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such key"))
        .mount(&server)
        .await;

    let src = HttpDataSource::new(&server.uri()).expect("source");
    let err = src.fetch_table(TableName::Sleep).await.unwrap_err();
    assert!(err.is_fetch_failure());
    assert!(err.to_string().contains("404"));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn server_errors_are_retried_then_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SLEEP_BODY))
        .mount(&server)
        .await;

    let src = HttpDataSource::new(&server.uri())
        .expect("source")
        .with_retry(RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        });
    let table = src.fetch_table(TableName::Sleep).await.expect("table");
    assert_eq!(table.len(), 2);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn malformed_body_is_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a b c d\n1 2 3 4 5\n"))
        .mount(&server)
        .await;

    let src = HttpDataSource::new(&server.uri()).expect("source");
    let err = src.fetch_table(TableName::Sleep).await.unwrap_err();
    assert!(err.is_parse_failure());
    assert!(!err.is_fetch_failure());
}

#[tokio::test]
async fn slow_store_times_out_as_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SLEEP_BODY)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cfg = Config {
        source: server.uri(),
        fetch_timeout: Duration::from_millis(200),
        ..Config::default()
    };
    let src = HttpDataSource::from_config(&cfg)
        .expect("source")
        .with_retry(RetryPolicy::none());
    let err = src.fetch_table(TableName::Sleep).await.unwrap_err();
    assert!(err.is_fetch_failure());
}

#[tokio::test]
async fn timed_out_attempt_is_retried_within_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SLEEP_BODY)
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sleep_data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SLEEP_BODY))
        .mount(&server)
        .await;

    let cfg = Config {
        source: server.uri(),
        fetch_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    let src = HttpDataSource::from_config(&cfg)
        .expect("source")
        .with_retry(RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
        });
    assert_eq!(src.attempt_timeout(), Duration::from_secs(1));

    let started = std::time::Instant::now();
    let table = tokio::time::timeout(cfg.fetch_timeout, src.fetch_table(TableName::Sleep))
        .await
        .expect("within fetch budget")
        .expect("table");
    assert_eq!(table.len(), 2);
    assert!(started.elapsed() < cfg.fetch_timeout);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
}
