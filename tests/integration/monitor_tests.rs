use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_watch::config::{parse_config, MonitorConfig, PageEntry, DEFAULT_USER_AGENT};
use sumi_watch::output::{CycleKind, CycleObserver, CycleStats, LogNotifier};
use sumi_watch::watcher::{watch, ChangeRecord, HttpFetcher, Monitor};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Collects every cycle's statistics
#[derive(Clone, Default)]
struct RecordingObserver {
    cycles: Arc<Mutex<Vec<CycleStats>>>,
}

impl CycleObserver for RecordingObserver {
    fn on_cycle(&self, stats: &CycleStats) {
        self.cycles.lock().unwrap().push(stats.clone());
    }
}

fn page_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();
    format!(
        "<html><head><title>Results</title></head><body><ul>{}</ul></body></html>",
        anchors
    )
}

fn html_response(links: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(page_html(links))
        .insert_header("content-type", "text/html")
}

fn http_monitor(config: MonitorConfig, timeout: Duration) -> Monitor {
    let fetcher = HttpFetcher::with_user_agent(DEFAULT_USER_AGENT, timeout)
        .expect("Failed to build HTTP fetcher");
    Monitor::new(config, Arc::new(fetcher))
}

#[tokio::test]
async fn test_new_link_reported_after_warmup() {
    let server = MockServer::start().await;
    let warmup_cycles = 3;

    // Baseline and warm-up cycles see the first version of the page, later cycles a new story
    Mock::given(method("GET"))
        .and(path("/elections"))
        .respond_with(html_response(&["/foo"]))
        .up_to_n_times(1 + warmup_cycles)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/elections"))
        .respond_with(html_response(&["/foo", "/bar"]))
        .mount(&server)
        .await;

    let url = format!("{}/elections", server.uri());
    let config = MonitorConfig {
        warmup_cycles: warmup_cycles as u32,
        ..MonitorConfig::default()
    };
    let observer = RecordingObserver::default();
    let mut monitor =
        http_monitor(config, Duration::from_secs(5)).with_observer(observer.clone());

    let count = monitor
        .build_baseline(&[
            PageEntry::new("A", url.clone()),
            PageEntry::new("B", "not-a-url"),
        ])
        .await;
    assert_eq!(count, 1);

    let records = monitor.check_updates().await;
    assert_eq!(
        records,
        vec![ChangeRecord::new("A", url.clone(), vec!["/bar".to_string()])]
    );

    let links = monitor.page("A").unwrap().links();
    assert!(links.contains("/foo") && links.contains("/bar"));

    assert!(monitor.check_updates().await.is_empty());

    let kinds: Vec<CycleKind> = observer
        .cycles
        .lock()
        .unwrap()
        .iter()
        .map(|stats| stats.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            CycleKind::Baseline,
            CycleKind::Warmup,
            CycleKind::Warmup,
            CycleKind::Warmup,
            CycleKind::Check,
            CycleKind::Check,
        ]
    );
}

#[tokio::test]
async fn test_warmup_noise_is_not_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&["/home"]))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&["/home", "/ad-slot-7"]))
        .mount(&server)
        .await;

    let config = MonitorConfig {
        warmup_cycles: 2,
        ..MonitorConfig::default()
    };
    let mut monitor = http_monitor(config, Duration::from_secs(5));
    monitor
        .build_baseline(&[PageEntry::new("Home", format!("{}/", server.uri()))])
        .await;

    assert!(monitor.check_updates().await.is_empty());
}

#[tokio::test]
async fn test_timeout_produces_no_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_response(&["/foo"]))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_response(&["/foo", "/late"]).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = MonitorConfig {
        warmup_cycles: 0,
        ..MonitorConfig::default()
    };
    let mut monitor = http_monitor(config, Duration::from_millis(300));
    monitor
        .build_baseline(&[PageEntry::new("A", format!("{}/slow", server.uri()))])
        .await;

    let records = monitor.check_updates().await;

    assert!(records.is_empty());
    let page = monitor.page("A").unwrap();
    assert_eq!(page.links().len(), 1);
    assert_eq!(monitor.last_stats().unwrap().failed, 1);
}

#[tokio::test]
async fn test_thirty_pages_with_cap_of_twenty_five() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(&["/a"]).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let entries: Vec<PageEntry> = (0..30)
        .map(|i| PageEntry::new(format!("Page {}", i), format!("{}/page/{}", server.uri(), i)))
        .collect();

    let config = MonitorConfig {
        max_concurrent_fetches: 25,
        warmup_cycles: 0,
        ..MonitorConfig::default()
    };
    let observer = RecordingObserver::default();
    let mut monitor =
        http_monitor(config, Duration::from_secs(5)).with_observer(observer.clone());

    assert_eq!(monitor.build_baseline(&entries).await, 30);
    assert!(monitor.check_updates().await.is_empty());

    for stats in observer.cycles.lock().unwrap().iter() {
        assert_eq!(stats.pages, 30);
        assert_eq!(stats.failed, 0);
        assert!(stats.peak_in_flight <= 25);
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 60);
}

#[tokio::test]
async fn test_watch_stops_on_cancel() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(&["/a"]))
        .mount(&server)
        .await;

    let config = parse_config(&format!(
        r#"
[monitor]
warmup-cycles = 1
fetch-timeout-secs = 2

[[page]]
label = "A"
url = "{}/a"
"#,
        server.uri()
    ))
    .expect("Failed to parse config");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        trigger.cancel();
    });

    let cycles = tokio::time::timeout(
        Duration::from_secs(10),
        watch(&config, &config.pages, &LogNotifier, &cancel),
    )
    .await
    .expect("watch did not stop after cancellation")
    .expect("watch failed");

    assert!(cycles >= 1);
}
