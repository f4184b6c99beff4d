use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use reservation_watch::checker::ParkPageChecker;
use reservation_watch::domain::NewMonitoringRequest;
use reservation_watch::monitor::{PollSummary, ReservationMonitor, SubmitOutcome};
use reservation_watch::notifier::{EmailError, EmailGateway, OutboundEmail, ReservationNotifier};
use reservation_watch::store::{InMemoryMonitoringStore, MonitoringStore};

const QUIET_PAGE: &str = r#"
<html><body>
  <main>
    <h1>Reservations</h1>
    <p>No entry reservation requirements have been announced for this winter.</p>
  </main>
</body></html>
"#;

const ANNOUNCED_PAGE: &str = r#"
<html><body>
  <header>February 1 alerts</header>
  <main>
    <h1>Entry Reservations</h1>
    <p>A reservation is required to drive into Yosemite 24 hours per day for
       visitors arriving February 8–9, February 15–17, and February 22–23.</p>
  </main>
  <footer>Updated February 2</footer>
</body></html>
"#;

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl EmailGateway for Outbox {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        self.sent
            .lock()
            .map_err(|_| EmailError::Unavailable("outbox poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}

async fn page(State(body): State<Arc<Mutex<&'static str>>>) -> Html<&'static str> {
    Html(*body.lock().expect("page mutex"))
}

#[tokio::test]
async fn subscriber_is_emailed_once_dates_are_posted() {
    let body = Arc::new(Mutex::new(QUIET_PAGE));
    let router = Router::new()
        .route("/yose/reservations.htm", get(page))
        .with_state(body.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind page server");
    let addr = listener.local_addr().expect("page server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("page server");
    });

    let page_url = format!("http://{addr}/yose/reservations.htm");
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client builds");
    let checker = Arc::new(ParkPageChecker::with_client(client, page_url.clone()));
    let store = Arc::new(InMemoryMonitoringStore::new());
    let outbox = Arc::new(Outbox::default());
    let monitor = ReservationMonitor::new(
        store.clone(),
        checker,
        ReservationNotifier::new(outbox.clone(), page_url.clone()),
    );

    let outcome = monitor
        .submit(NewMonitoringRequest::new("subscriber@example.com", "February").expect("valid"))
        .await
        .expect("submit succeeds");
    assert!(matches!(outcome, SubmitOutcome::Monitoring(_)));
    assert_eq!(monitor.poll_once().await.no_match, 1);

    *body.lock().expect("page mutex") = ANNOUNCED_PAGE;
    let summary = monitor.poll_once().await;
    assert_eq!(
        summary,
        PollSummary {
            examined: 1,
            notified: 1,
            ..PollSummary::default()
        }
    );

    let sent = outbox.sent.lock().expect("outbox").clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "subscriber@example.com");
    assert_eq!(
        sent[0].subject,
        "Important: Entry Reservation Requirements at Yosemite for February"
    );
    for date in ["February 8–9", "February 15–17", "February 22–23"] {
        assert!(sent[0].text_body.contains(&format!("  - {date}\n")));
    }
    assert!(!sent[0].text_body.contains("February 1 "));
    assert!(sent[0].html_body.contains(&page_url));

    assert_eq!(monitor.poll_once().await, PollSummary::default());
    let records = store.list_all().await.expect("list");
    assert_eq!(records.len(), 1);
    assert!(!records[0].active);
    assert_eq!(records[0].view().masked_email, "su********@example.com");
}
