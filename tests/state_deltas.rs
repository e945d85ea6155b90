use std::time::{Duration, Instant};

use fpl_terminal::layout::Formation;
use fpl_terminal::state::{
    AppState, Delta, FetchPhase, StatusTone, apply_delta, placeholder_squad,
};

fn rendered_state() -> AppState {
    let mut state = AppState::new();
    let (squad, totals) = placeholder_squad();
    apply_delta(
        &mut state,
        Delta::SetSquad {
            formation: Formation::new(3, 4, 3),
            squad,
            totals,
        },
    );
    state
}

#[test]
fn set_squad_installs_roster_and_totals() {
    let state = rendered_state();
    assert_eq!(state.phase, FetchPhase::Rendered);
    assert_eq!(state.rendered_formation, Some(Formation::new(3, 4, 3)));
    assert_eq!(state.pitch_players().len(), 11);
    assert_eq!(state.bench_players().len(), 4);
    assert!(state.totals.is_some());
    assert!(state.squad_fetched_at.is_some());
}

#[test]
fn squad_error_leaves_roster_and_totals_untouched() {
    let mut state = rendered_state();
    let squad_before = state.squad.clone();
    let totals_before = state.totals;

    apply_delta(
        &mut state,
        Delta::SquadError("An error occurred while getting the team".to_string()),
    );

    assert_eq!(state.phase, FetchPhase::Errored);
    assert_eq!(state.squad, squad_before);
    assert_eq!(state.totals, totals_before);
    assert_eq!(
        state.error_popup.as_deref(),
        Some("An error occurred while getting the team")
    );
}

#[test]
fn set_squad_clamps_selection() {
    let mut state = rendered_state();
    state.selected = 40;

    let (squad, totals) = placeholder_squad();
    apply_delta(
        &mut state,
        Delta::SetSquad {
            formation: Formation::new(3, 4, 3),
            squad,
            totals,
        },
    );

    assert_eq!(state.selected, state.visible_count() - 1);
}

#[test]
fn update_failure_reenables_trigger_and_schedules_clear() {
    let mut state = AppState::new();
    state.begin_update();
    assert!(state.updating);

    apply_delta(
        &mut state,
        Delta::UpdateFinished {
            ok: false,
            message: "connection refused".to_string(),
        },
    );

    assert!(!state.updating);
    assert!(!state.resubmit_pending);
    let status = state.update_status.as_ref().expect("status should be set");
    assert_eq!(status.message, "Error updating data");
    assert_eq!(status.tone, StatusTone::Error);

    // Not yet expired right away, gone once the clear delay has passed.
    state.maybe_clear_status(Instant::now());
    assert!(state.update_status.is_some());
    state.maybe_clear_status(Instant::now() + Duration::from_secs(4));
    assert!(state.update_status.is_none());
}

#[test]
fn update_success_marks_resubmit() {
    let mut state = AppState::new();
    state.begin_update();

    apply_delta(
        &mut state,
        Delta::UpdateFinished {
            ok: true,
            message: "Data processing and model training complete!".to_string(),
        },
    );

    assert!(!state.updating);
    assert!(state.resubmit_pending);
    let status = state.update_status.as_ref().expect("status should be set");
    assert_eq!(status.message, "Data updated successfully!");
    assert_eq!(status.tone, StatusTone::Success);
}

#[test]
fn in_flight_status_never_expires() {
    let mut state = AppState::new();
    state.begin_update();

    state.maybe_clear_status(Instant::now() + Duration::from_secs(3600));
    let status = state.update_status.as_ref().expect("status should remain");
    assert_eq!(status.message, "Updating data...");
    assert_eq!(status.tone, StatusTone::Info);
}

#[test]
fn log_delta_lands_in_console() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::Log("[INFO] hello".to_string()));
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] hello"));
}
