use super::*;
use crate::services::metadata::models::MetadataSource;
use crate::services::metadata::provider::MetadataProvider;
use crate::services::metadata::stub::{record, StubProvider};
use serde_json::Value;
use std::time::Instant;
use tauri::ipc::InvokeResponseBody;

/// Channel that parses every sent event back into JSON for assertions.
fn capture_channel() -> (Channel<ImportEvent>, Arc<Mutex<Vec<Value>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let channel = Channel::new(move |body| {
        if let InvokeResponseBody::Json(json) = body {
            if let Ok(value) = serde_json::from_str::<Value>(&json) {
                sink.lock().unwrap().push(value);
            }
        }
        Ok(())
    });
    (channel, events)
}

fn pending(folder: &str, query: &str) -> Candidate {
    Candidate::new(
        format!("/import/{folder}"),
        folder.to_string(),
        vec![format!("/import/{folder}/game.exe")],
        Some(format!("/import/{folder}/game.exe")),
        query.to_string(),
    )
}

fn list(candidates: Vec<Candidate>) -> Arc<Mutex<Vec<Candidate>>> {
    Arc::new(Mutex::new(candidates))
}

fn single_provider(stub: StubProvider) -> (Arc<StubProvider>, Arc<ProviderSet>) {
    let stub = Arc::new(stub);
    let set = Arc::new(ProviderSet::new(vec![
        Arc::clone(&stub) as Arc<dyn MetadataProvider>
    ]));
    (stub, set)
}

fn fast() -> MatcherConfig {
    MatcherConfig {
        request_delay: Duration::ZERO,
    }
}

fn event_names(events: &Arc<Mutex<Vec<Value>>>) -> Vec<String> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|v| v["event"].as_str().map(str::to_string))
        .collect()
}

fn status_of(candidates: &Arc<Mutex<Vec<Candidate>>>, folder: &str) -> MatchStatus {
    candidates
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.folder_name == folder)
        .unwrap()
        .match_status
}

#[tokio::test]
async fn test_match_pass_resolves_each_pending_candidate() {
    let candidates = list(vec![
        pending("CLANNAD", "Clannad"),
        pending("AIR", "Air"),
        pending("Kanon", "Kanon"),
    ]);
    let providers = Arc::new(ProviderSet::new(vec![
        Arc::new(
            StubProvider::new(MetadataSource::Bangumi)
                .on_name("Clannad", vec![record("51", "CLANNAD")])
                .failing_for("Kanon"),
        ) as Arc<dyn MetadataProvider>,
        Arc::new(StubProvider::new(MetadataSource::Vndb).failing_for("Kanon"))
            as Arc<dyn MetadataProvider>,
    ]));
    let (channel, _events) = capture_channel();
    let progress = Arc::new(Mutex::new(None));

    let outcome = run_match_pass(
        Arc::clone(&candidates),
        providers,
        Arc::new(AtomicBool::new(false)),
        Arc::clone(&progress),
        &channel,
        &fast(),
    )
    .await;

    assert_eq!(outcome.processed, 3);
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.not_found, 1);
    assert_eq!(outcome.errors, 1);
    assert!(!outcome.cancelled);

    assert_eq!(status_of(&candidates, "CLANNAD"), MatchStatus::Matched);
    assert_eq!(status_of(&candidates, "AIR"), MatchStatus::NotFound);
    assert_eq!(status_of(&candidates, "Kanon"), MatchStatus::Error);

    let guard = progress.lock().unwrap();
    let final_progress = guard.as_ref().unwrap();
    assert_eq!(final_progress.current, 3);
    assert_eq!(final_progress.total, 3);
}

#[tokio::test]
async fn test_match_pass_skips_resolved_and_deselected() {
    let mut manual = pending("CLANNAD", "Clannad");
    manual.apply_manual_match(record("v1", "Clannad"), MetadataSource::Vndb);
    let mut unchecked = pending("AIR", "Air");
    unchecked.set_selected(false);

    let candidates = list(vec![manual, unchecked, pending("Kanon", "Kanon")]);
    let (stub, providers) = single_provider(
        StubProvider::new(MetadataSource::Bangumi).on_name("Kanon", vec![record("88", "Kanon")]),
    );
    let (channel, _events) = capture_channel();

    let outcome = run_match_pass(
        Arc::clone(&candidates),
        providers,
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(None)),
        &channel,
        &fast(),
    )
    .await;

    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.processed, 1);
    assert_eq!(stub.search_count(), 1);

    assert_eq!(status_of(&candidates, "CLANNAD"), MatchStatus::Manual);
    assert_eq!(status_of(&candidates, "AIR"), MatchStatus::Pending);
    assert_eq!(status_of(&candidates, "Kanon"), MatchStatus::Matched);
}

#[tokio::test]
async fn test_match_pass_is_idempotent_when_rerun() {
    let candidates = list(vec![
        pending("CLANNAD", "Clannad"),
        pending("Kanon", "Kanon"),
    ]);
    let (stub, providers) = single_provider(
        StubProvider::new(MetadataSource::Bangumi)
            .on_name("Clannad", vec![record("51", "CLANNAD")])
            .on_name("Kanon", vec![record("88", "Kanon")]),
    );

    let (channel, _events) = capture_channel();
    let first = run_match_pass(
        Arc::clone(&candidates),
        Arc::clone(&providers),
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(None)),
        &channel,
        &fast(),
    )
    .await;
    assert_eq!(first.matched, 2);
    assert_eq!(stub.search_count(), 2);

    let (channel, events) = capture_channel();
    let second = run_match_pass(
        Arc::clone(&candidates),
        providers,
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(None)),
        &channel,
        &fast(),
    )
    .await;

    // Nothing left to do: no further requests, statuses untouched.
    assert_eq!(second.total, 0);
    assert_eq!(second.processed, 0);
    assert_eq!(stub.search_count(), 2);
    assert_eq!(event_names(&events), vec!["started", "finished"]);
    assert_eq!(status_of(&candidates, "CLANNAD"), MatchStatus::Matched);
}

#[tokio::test]
async fn test_cancellation_stops_before_the_next_candidate() {
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let candidates = list(vec![
        pending("CLANNAD", "Clannad"),
        pending("AIR", "Air"),
        pending("Kanon", "Kanon"),
    ]);
    // The flag flips while the second lookup is served: the second
    // candidate still completes, the third is never touched.
    let (stub, providers) = single_provider(
        StubProvider::new(MetadataSource::Bangumi)
            .on_name("Clannad", vec![record("51", "CLANNAD")])
            .on_name("Air", vec![record("120", "AIR")])
            .cancel_when("Air", Arc::clone(&cancel_flag)),
    );
    let (channel, events) = capture_channel();

    let outcome = run_match_pass(
        Arc::clone(&candidates),
        providers,
        cancel_flag,
        Arc::new(Mutex::new(None)),
        &channel,
        &fast(),
    )
    .await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.matched, 2);
    assert_eq!(stub.search_count(), 2);

    assert_eq!(status_of(&candidates, "Kanon"), MatchStatus::Pending);

    let names = event_names(&events);
    assert_eq!(names.last().map(String::as_str), Some("cancelled"));
    assert!(!names.iter().any(|n| n == "finished"));

    let guard = events.lock().unwrap();
    let cancelled = &guard[guard.len() - 1];
    assert_eq!(cancelled["data"]["processed"], 2);
    assert_eq!(cancelled["data"]["total"], 3);
}

#[tokio::test]
async fn test_cancellation_skips_the_inter_request_delay() {
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let candidates = list(vec![
        pending("CLANNAD", "Clannad"),
        pending("AIR", "Air"),
    ]);
    let (_stub, providers) = single_provider(
        StubProvider::new(MetadataSource::Bangumi)
            .on_name("Clannad", vec![record("51", "CLANNAD")])
            .cancel_when("Clannad", Arc::clone(&cancel_flag)),
    );
    let (channel, _events) = capture_channel();
    let config = MatcherConfig {
        request_delay: Duration::from_secs(5),
    };

    let started = Instant::now();
    let outcome = run_match_pass(
        Arc::clone(&candidates),
        providers,
        cancel_flag,
        Arc::new(Mutex::new(None)),
        &channel,
        &config,
    )
    .await;

    // Cancelled before the delay: the pass must not wait out 5s first.
    assert!(outcome.cancelled);
    assert_eq!(outcome.processed, 1);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(status_of(&candidates, "AIR"), MatchStatus::Pending);
}

#[tokio::test]
async fn test_match_pass_event_sequence_and_payloads() {
    let candidates = list(vec![pending("CLANNAD", "Clannad")]);
    let (_stub, providers) = single_provider(
        StubProvider::new(MetadataSource::Bangumi).on_name("Clannad", vec![record("51", "CLANNAD")]),
    );
    let (channel, events) = capture_channel();

    run_match_pass(
        Arc::clone(&candidates),
        providers,
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(None)),
        &channel,
        &fast(),
    )
    .await;

    assert_eq!(
        event_names(&events),
        vec!["started", "progress", "matched", "finished"]
    );

    let guard = events.lock().unwrap();
    assert_eq!(guard[0]["data"]["total"], 1);

    assert_eq!(guard[1]["data"]["current"], 1);
    assert_eq!(guard[1]["data"]["currentName"], "CLANNAD");
    assert_eq!(guard[1]["data"]["percent"], 100);

    let expected_id = candidates.lock().unwrap()[0].id.clone();
    assert_eq!(guard[2]["data"]["candidateId"], expected_id.as_str());
    assert_eq!(guard[2]["data"]["status"], "matched");
    assert_eq!(guard[2]["data"]["title"], "CLANNAD");

    assert_eq!(guard[3]["data"]["processed"], 1);
    assert_eq!(guard[3]["data"]["matched"], 1);
    assert_eq!(guard[3]["data"]["notFound"], 0);
    assert_eq!(guard[3]["data"]["errors"], 0);
}

#[tokio::test]
async fn test_manual_override_during_the_delay_wins() {
    let candidates = list(vec![
        pending("CLANNAD", "Clannad"),
        pending("AIR", "Air"),
    ]);
    let (stub, providers) = single_provider(
        StubProvider::new(MetadataSource::Bangumi)
            .on_name("Clannad", vec![record("51", "CLANNAD")])
            .on_name("Air", vec![record("120", "AIR")]),
    );
    let (channel, _events) = capture_channel();
    let config = MatcherConfig {
        request_delay: Duration::from_millis(500),
    };

    let pass = {
        let candidates = Arc::clone(&candidates);
        tokio::spawn(async move {
            run_match_pass(
                candidates,
                providers,
                Arc::new(AtomicBool::new(false)),
                Arc::new(Mutex::new(None)),
                &channel,
                &config,
            )
            .await
        })
    };

    // While the pass sleeps between requests, resolve the second
    // candidate by hand.
    tokio::time::sleep(Duration::from_millis(100)).await;
    candidates.lock().unwrap()[1].apply_manual_match(record("v2", "AIR"), MetadataSource::Vndb);

    let outcome = pass.await.unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(stub.search_count(), 1);
    assert_eq!(status_of(&candidates, "AIR"), MatchStatus::Manual);
    let guard = candidates.lock().unwrap();
    assert_eq!(guard[1].match_source, Some(MetadataSource::Vndb));
}

#[tokio::test]
async fn test_empty_work_list_still_reports_start_and_finish() {
    let mut unchecked = pending("CLANNAD", "Clannad");
    unchecked.set_selected(false);
    let candidates = list(vec![unchecked]);
    let (stub, providers) = single_provider(StubProvider::new(MetadataSource::Bangumi));
    let (channel, events) = capture_channel();

    let outcome = run_match_pass(
        Arc::clone(&candidates),
        providers,
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(None)),
        &channel,
        &fast(),
    )
    .await;

    assert_eq!(outcome.total, 0);
    assert_eq!(stub.search_count(), 0);
    assert_eq!(event_names(&events), vec!["started", "finished"]);
}
