use std::sync::Arc;
use std::time::Duration;

use babylog_client::http_client::HttpDataSource;
use babylog_client::retry::RetryPolicy;
use babylog_dashboard::domains::WindowSelector;
use babylog_dashboard::http::{AppState, create_router};
use babylog_dashboard::{Dashboard, view};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLEEP_BODY: &str = "日期 入睡 睡醒 总睡眠时间（mins）\n\
2024-03-01 20:00 06:00 600\n\
2024-03-09 21:10 23:40 150\n\
2024-03-10 23:30 00:15 45\n";

const FEEDING_BODY: &str = "日期 类型 时间 奶量（ml）\n\
2024-03-09 亲喂 07:00\n\
2024-03-10 配方奶 08:00 120\n\
2024-03-10 母乳瓶喂 11:30 90\n";

async fn serve(sleep: ResponseTemplate, feeding: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/sleep_data.csv"))
        .respond_with(sleep)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/feeding_data.csv"))
        .respond_with(feeding)
        .mount(&server)
        .await;
    server
}

fn dashboard_for(server: &MockServer) -> Dashboard {
    let source = HttpDataSource::new(&format!("{}/data", server.uri()))
        .expect("source")
        .with_retry(RetryPolicy::none());
    Dashboard::new(Arc::new(source), Duration::from_secs(5))
}

#[tokio::test]
async fn remote_tables_flow_into_charts() {
    let server = serve(
        ResponseTemplate::new(200).set_body_string(SLEEP_BODY),
        ResponseTemplate::new(200).set_body_string(FEEDING_BODY),
    )
    .await;

    let ds = dashboard_for(&server).load().await.expect("dataset");
    assert_eq!(ds.sleep.len(), 3);
    assert_eq!(ds.feeding.len(), 3);

    let v = view(&ds, &WindowSelector::Last7Days);
    let window = v.window.expect("window");
    assert_eq!(window.start_date().to_string(), "2024-03-03");
    assert_eq!(v.totals.days, 2);
    // one sleep series per segment, then direct, formula, bottled
    assert_eq!(v.timeline.series.len(), 5);
    assert_eq!(v.timeline.series[2].name, "direct");
    assert_eq!(v.timeline.series[2].points[0].size, Some(8.0));
    let sleep_labels: Vec<_> = v.daily.series[0]
        .points
        .iter()
        .filter_map(|p| p.label.clone())
        .collect();
    assert_eq!(sleep_labels, vec!["2.5h", "0.8h"]);
}

#[tokio::test]
async fn missing_feeding_table_gives_no_data() {
    let server = serve(
        ResponseTemplate::new(200).set_body_string(SLEEP_BODY),
        ResponseTemplate::new(404),
    )
    .await;

    let err = dashboard_for(&server).load().await.unwrap_err();
    assert_eq!(err.kind(), "fetch");
}

#[tokio::test]
async fn api_reports_upstream_failure() {
    let server = serve(
        ResponseTemplate::new(200).set_body_string("a b c\n1 2 3\n"),
        ResponseTemplate::new(200).set_body_string(FEEDING_BODY),
    )
    .await;

    let state = Arc::new(AppState {
        dashboard: dashboard_for(&server),
        metrics: None,
    });
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let resp = reqwest::get(format!("http://{addr}/api/dashboard?range=all"))
        .await
        .expect("response");
    assert_eq!(resp.status().as_u16(), 502);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert!(body["error"].as_str().unwrap().contains("3 columns"));
}
