use std::fs;
use std::sync::{Mutex, Once};
use std::time::Duration;

use poller_core::{RunLimits, StopReason};
use poller_engine::{
    FetchSettings, PollEvent, PollSettings, Poller, ProgressSink, ReqwestFetcher,
    ResponsePersister,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(poll_logging::initialize_for_tests);
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<PollEvent>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: PollEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn polls_live_server_until_quota() {
    init_logging();
    let server = MockServer::start().await;
    // Mounted mocks are matched in order; each answers once.
    for body in [r#"{"v":1}"#, r#"{"v":1}"#, r#"{"v":2}"#] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("responses");
    let settings = PollSettings {
        url: server.uri(),
        limits: RunLimits {
            run_duration: Duration::from_secs(30),
            max_unique: 2,
        },
        delay: Duration::ZERO,
    };
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).expect("client");
    let poller = Poller::new(settings, Box::new(fetcher), ResponsePersister::new(out.clone()));
    let sink = RecordingSink::default();
    let mut state = poller.begin();

    let summary = poller
        .run(&mut state, &sink, &CancellationToken::new())
        .await;

    assert_eq!(summary.reason, StopReason::QuotaReached);
    assert_eq!(summary.queries, 3);
    assert_eq!(summary.unique, 2);

    let mut contents: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, vec![r#"{"v":1}"#.to_string(), r#"{"v":2}"#.to_string()]);

    let events = sink.events.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, PollEvent::Duplicate { .. })));
}
