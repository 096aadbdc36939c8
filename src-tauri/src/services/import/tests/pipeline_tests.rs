//! End-to-end flow: scan a temp folder, match against stub providers,
//! commit, verify the library rows, then recommit to exercise the
//! duplicate guard.

use super::*;
use crate::database::library_repo;
use crate::services::metadata::models::MetadataSource;
use crate::services::metadata::provider::{MetadataProvider, ProviderSet};
use crate::services::metadata::stub::{record, StubProvider};
use crate::test_utils::init_test_db;
use crate::types::import::ImportEvent;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tauri::ipc::Channel;
use tempfile::TempDir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

fn silent_channel() -> Channel<ImportEvent> {
    Channel::new(|_| Ok(()))
}

#[tokio::test]
async fn test_scan_match_commit_round_trip() {
    let ctx = init_test_db().await;
    let tmp = TempDir::new().unwrap();

    // Two game folders plus one exe-less folder the scanner must skip.
    touch(&tmp.path().join("CLANNAD").join("clannad.exe"));
    touch(&tmp.path().join("[KEY] AIR v1.0").join("air.exe"));
    fs::create_dir_all(tmp.path().join("Saves")).unwrap();

    let candidates = scanner::scan_import_root(tmp.path(), 3).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].folder_name, "[KEY] AIR v1.0");
    assert_eq!(candidates[0].search_name, "AIR");
    assert_eq!(candidates[1].search_name, "CLANNAD");

    let list = Arc::new(Mutex::new(candidates));
    let providers = Arc::new(ProviderSet::new(vec![
        Arc::new(
            StubProvider::new(MetadataSource::Bangumi)
                .on_name("CLANNAD", vec![record("51", "CLANNAD")]),
        ) as Arc<dyn MetadataProvider>,
        Arc::new(StubProvider::new(MetadataSource::Vndb)) as Arc<dyn MetadataProvider>,
    ]));

    let outcome = matcher::run_match_pass(
        Arc::clone(&list),
        providers,
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(None)),
        &silent_channel(),
        &MatcherConfig {
            request_delay: Duration::ZERO,
        },
    )
    .await;
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.not_found, 1);
    assert!(!outcome.cancelled);

    let snapshot = list.lock().unwrap().clone();
    let result = commit::commit_import(&ctx.pool, &snapshot).await.unwrap();
    assert_eq!(result.success, 2);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.failed, 0);

    let games = library_repo::get_all_games(&ctx.pool).await.unwrap();
    assert_eq!(games.len(), 2);

    let clannad = games.iter().find(|g| g.folder_name == "CLANNAD").unwrap();
    assert_eq!(clannad.title, "CLANNAD");
    assert_eq!(clannad.match_status, "matched");
    assert_eq!(clannad.source.as_deref(), Some("BANGUMI"));
    assert_eq!(clannad.source_id.as_deref(), Some("51"));
    assert!(clannad
        .exe_path
        .as_deref()
        .unwrap()
        .ends_with("clannad.exe"));

    // Unresolved rows keep the raw folder name as their title.
    let air = games
        .iter()
        .find(|g| g.folder_name == "[KEY] AIR v1.0")
        .unwrap();
    assert_eq!(air.title, "[KEY] AIR v1.0");
    assert_eq!(air.match_status, "not_found");
    assert_eq!(air.source, None);

    // Rescanning the same root yields the same stable ids and paths,
    // so a second commit skips every row.
    let rescan = scanner::scan_import_root(tmp.path(), 3).unwrap();
    let again = commit::commit_import(&ctx.pool, &rescan).await.unwrap();
    assert_eq!(again.success, 0);
    assert_eq!(again.skipped, 2);
    assert_eq!(again.skipped_names, vec!["[KEY] AIR v1.0", "CLANNAD"]);
    assert_eq!(
        library_repo::count_games(&ctx.pool).await.unwrap(),
        2,
        "recommit must not add rows"
    );
}
