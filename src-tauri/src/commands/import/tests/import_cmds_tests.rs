use super::*;
use crate::types::import::MatchStatus;

fn session_with(folders: &[&str]) -> ImportSession {
    let session = ImportSession::new();
    let candidates = folders
        .iter()
        .map(|folder| {
            Candidate::new(
                format!("/import/{folder}"),
                folder.to_string(),
                vec![format!("/import/{folder}/game.exe")],
                Some(format!("/import/{folder}/game.exe")),
                folder.to_string(),
            )
        })
        .collect();
    session.replace_candidates(candidates);
    session
}

#[test]
fn test_with_candidate_applies_the_mutation_and_returns_the_clone() {
    let session = session_with(&["CLANNAD"]);
    let id = session.snapshot().candidates[0].id.clone();

    let updated = with_candidate(&session, &id, |candidate| {
        candidate.set_search_name("Clannad Side Stories".to_string());
        Ok(())
    })
    .unwrap();

    assert_eq!(updated.search_name, "Clannad Side Stories");
    assert_eq!(updated.match_status, MatchStatus::Pending);
    assert_eq!(
        session.snapshot().candidates[0].search_name,
        "Clannad Side Stories"
    );
}

#[test]
fn test_with_candidate_unknown_id_is_an_error() {
    let session = session_with(&["CLANNAD"]);
    let err = with_candidate(&session, "missing", |_| Ok(()));
    assert!(err.unwrap_err().contains("missing"));
}

#[test]
fn test_with_candidate_propagates_mutation_errors() {
    let session = session_with(&["CLANNAD"]);
    let id = session.snapshot().candidates[0].id.clone();

    let err = with_candidate(&session, &id, |candidate| {
        candidate.set_selected_exe("/elsewhere/other.exe".to_string())
    });

    assert!(err.is_err());
    // State untouched on error.
    assert_eq!(
        session.snapshot().candidates[0].selected_exe.as_deref(),
        Some("/import/CLANNAD/game.exe")
    );
}

#[test]
fn test_running_guard_releases_the_match_slot_on_drop() {
    let session = ImportSession::new();
    session.try_start_match().unwrap();

    {
        let _guard = RunningGuard::new(session.running_flag());
        assert!(session.is_matching());
    }

    assert!(!session.is_matching());
    assert!(session.try_start_match().is_ok());
}
