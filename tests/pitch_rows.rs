use fpl_terminal::layout::Formation;
use fpl_terminal::state::{AppState, SquadView, placeholder_squad};

fn state_with_starters(count: usize) -> AppState {
    let mut state = AppState::new();
    let (squad, totals) = placeholder_squad();

    let mut starters = Vec::with_capacity(count);
    while starters.len() < count {
        let src = &squad.starters[starters.len() % squad.starters.len()];
        starters.push(src.clone());
    }

    state.squad = Some(SquadView {
        starters,
        substitutes: squad.substitutes,
    });
    state.totals = Some(totals);
    state
}

#[test]
fn oversized_team_caps_pitch_at_eleven() {
    let state = state_with_starters(14);
    assert_eq!(state.pitch_players().len(), 11);
    assert_eq!(state.visible_count(), 11 + state.bench_players().len());
}

#[test]
fn short_team_fills_fewer_slots_without_panicking() {
    let state = state_with_starters(5);
    assert_eq!(state.pitch_players().len(), 5);

    // The renderer zips players against formation slots; a short team just
    // stops early.
    let spots = Formation::new(4, 4, 2).positions();
    let drawn = state.pitch_players().iter().zip(spots.iter()).count();
    assert_eq!(drawn, 5);
}

#[test]
fn mismatched_formation_drops_surplus_players() {
    let state = state_with_starters(11);
    // A 3-4-1 row set only has 9 slots; the zip leaves two starters undrawn.
    let spots = Formation::new(3, 4, 1).positions();
    let drawn = state.pitch_players().iter().zip(spots.iter()).count();
    assert_eq!(drawn, 9);
}

#[test]
fn selection_wraps_across_pitch_and_bench() {
    let mut state = state_with_starters(11);
    let count = state.visible_count();
    assert_eq!(count, 15);

    state.selected = count - 1;
    state.select_next();
    assert_eq!(state.selected, 0);
    state.select_prev();
    assert_eq!(state.selected, count - 1);
}

#[test]
fn selected_player_indexes_bench_after_pitch() {
    let mut state = state_with_starters(11);
    state.selected = 11;
    let player = state.selected_player().expect("bench player should resolve");
    assert_eq!(player.name, state.bench_players()[0].name);
}

#[test]
fn empty_state_has_no_selection() {
    let mut state = AppState::new();
    assert_eq!(state.visible_count(), 0);
    assert!(state.selected_player().is_none());
    // Moving the selection with nothing rendered must be a no-op.
    state.select_next();
    state.select_prev();
    assert_eq!(state.selected, 0);
}
