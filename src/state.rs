use std::collections::VecDeque;
use std::env;
use std::time::{Duration, Instant, SystemTime};

use serde::Deserialize;

use crate::layout::Formation;

const MAX_LOGS: usize = 200;

/// Refresh status text lingers this long after the request settles.
pub const STATUS_CLEAR_SECS: u64 = 3;

/// The pitch never draws more than a starting eleven; anything past this in
/// the `team` array is ignored.
pub const PITCH_CAP: usize = 11;

pub const BUDGET_MIN: f64 = 80.0;
pub const BUDGET_MAX: f64 = 120.0;
pub const BUDGET_STEP: f64 = 0.5;
const BUDGET_DEFAULT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Position {
    #[serde(alias = "GK")]
    Goalkeeper,
    #[serde(alias = "DEF")]
    Defender,
    #[serde(alias = "MID")]
    Midfielder,
    #[serde(alias = "FWD")]
    Forward,
}

impl Position {
    pub fn short_label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    pub fn long_label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }
}

/// One player record as returned by the optimizer backend. The server emits
/// many more columns (rolling averages, team aggregates); serde drops what
/// the display never touches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Player {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Position")]
    pub position: Position,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Predicted_Points", default)]
    pub predicted_points: f64,
    #[serde(rename = "Total_Points", default)]
    pub total_points: i64,
    #[serde(rename = "Minutes", default)]
    pub minutes: u32,
    #[serde(rename = "Goals", default)]
    pub goals: u32,
    #[serde(rename = "Assists", default)]
    pub assists: u32,
    #[serde(rename = "Clean_Sheets", default)]
    pub clean_sheets: u32,
    #[serde(rename = "Form", default)]
    pub form: f64,
    #[serde(rename = "Points_Per_Game", default)]
    pub points_per_game: f64,
    #[serde(rename = "Selected_By_Percent", default)]
    pub selected_by_percent: f64,
    #[serde(rename = "Image_URL", default)]
    pub image_url: Option<String>,
    #[serde(rename = "Next_Opponent", default)]
    pub next_opponent: Option<String>,
    #[serde(rename = "Next_FDR", default)]
    pub next_fdr: Option<f64>,
}

impl Player {
    /// Icon label, matching the squad card convention of surname only.
    pub fn surname(&self) -> &str {
        self.name.split_whitespace().next_back().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquadView {
    pub starters: Vec<Player>,
    pub substitutes: Vec<Player>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquadTotals {
    pub total_cost: f64,
    pub predicted_points: f64,
    pub remaining_budget: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Submitting,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Success,
    Error,
}

/// Transient refresh status line. `clear_at` is unset while the request is
/// still in flight; the tick loop wipes the line once the deadline passes.
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    pub message: String,
    pub tone: StatusTone,
    pub clear_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub formation: Formation,
    pub budget: f64,
    pub phase: FetchPhase,
    pub squad: Option<SquadView>,
    pub totals: Option<SquadTotals>,
    /// Formation the current squad was requested with. The form value may
    /// have been cycled since; layout follows the submitted one.
    pub rendered_formation: Option<Formation>,
    pub squad_fetched_at: Option<SystemTime>,
    pub selected: usize,
    pub player_modal: bool,
    pub error_popup: Option<String>,
    pub updating: bool,
    pub update_status: Option<UpdateStatus>,
    pub resubmit_pending: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let formation = formation_env_or_default("FPL_FORMATION");
        let budget = budget_env_or_default("FPL_BUDGET");
        Self {
            formation,
            budget,
            phase: FetchPhase::Idle,
            squad: None,
            totals: None,
            rendered_formation: None,
            squad_fetched_at: None,
            selected: 0,
            player_modal: false,
            error_popup: None,
            updating: false,
            update_status: None,
            resubmit_pending: false,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Starters that actually get pitch slots.
    pub fn pitch_players(&self) -> &[Player] {
        match &self.squad {
            Some(squad) => {
                let cap = squad.starters.len().min(PITCH_CAP);
                &squad.starters[..cap]
            }
            None => &[],
        }
    }

    pub fn bench_players(&self) -> &[Player] {
        match &self.squad {
            Some(squad) => &squad.substitutes,
            None => &[],
        }
    }

    /// Selectable icons: pitch slots first, then the bench.
    pub fn visible_count(&self) -> usize {
        self.pitch_players().len() + self.bench_players().len()
    }

    pub fn selected_player(&self) -> Option<&Player> {
        let pitch = self.pitch_players();
        if self.selected < pitch.len() {
            return pitch.get(self.selected);
        }
        self.bench_players().get(self.selected - pitch.len())
    }

    pub fn select_next(&mut self) {
        let count = self.visible_count();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_prev(&mut self) {
        let count = self.visible_count();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    pub fn cycle_formation(&mut self) {
        self.formation = self.formation.next_preset();
    }

    pub fn cycle_formation_back(&mut self) {
        self.formation = self.formation.prev_preset();
    }

    pub fn adjust_budget(&mut self, steps: i32) {
        let next = self.budget + f64::from(steps) * BUDGET_STEP;
        self.budget = next.clamp(BUDGET_MIN, BUDGET_MAX);
    }

    /// Marks the refresh trigger busy and raises the in-flight status line.
    pub fn begin_update(&mut self) {
        self.updating = true;
        self.update_status = Some(UpdateStatus {
            message: "Updating data...".to_string(),
            tone: StatusTone::Info,
            clear_at: None,
        });
    }

    pub fn maybe_clear_status(&mut self, now: Instant) {
        let expired = self
            .update_status
            .as_ref()
            .and_then(|status| status.clear_at)
            .is_some_and(|clear_at| now >= clear_at);
        if expired {
            self.update_status = None;
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetSquad {
        formation: Formation,
        squad: SquadView,
        totals: SquadTotals,
    },
    SquadError(String),
    UpdateFinished {
        ok: bool,
        message: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchSquad { formation: Formation, budget: f64 },
    UpdateData,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetSquad {
            formation,
            squad,
            totals,
        } => {
            state.phase = FetchPhase::Rendered;
            state.rendered_formation = Some(formation);
            state.squad = Some(squad);
            state.totals = Some(totals);
            state.squad_fetched_at = Some(SystemTime::now());
            let count = state.visible_count();
            if count == 0 {
                state.selected = 0;
            } else if state.selected >= count {
                state.selected = count - 1;
            }
            state.push_log(format!("[INFO] Squad received ({formation})"));
        }
        Delta::SquadError(message) => {
            // Roster and totals stay as they were; only the phase and the
            // popup change.
            state.phase = FetchPhase::Errored;
            state.push_log(format!("[WARN] Squad fetch: {message}"));
            state.error_popup = Some(message);
        }
        Delta::UpdateFinished { ok, message } => {
            state.updating = false;
            let clear_at = Some(Instant::now() + Duration::from_secs(STATUS_CLEAR_SECS));
            if ok {
                state.update_status = Some(UpdateStatus {
                    message: "Data updated successfully!".to_string(),
                    tone: StatusTone::Success,
                    clear_at,
                });
                state.resubmit_pending = true;
                state.push_log(format!("[INFO] Update: {message}"));
            } else {
                state.update_status = Some(UpdateStatus {
                    message: "Error updating data".to_string(),
                    tone: StatusTone::Error,
                    clear_at,
                });
                state.push_log(format!("[WARN] Update: {message}"));
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn formation_env_or_default(key: &str) -> Formation {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<Formation>().ok())
        .unwrap_or_default()
}

fn budget_env_or_default(key: &str) -> f64 {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<f64>().ok())
        .unwrap_or(BUDGET_DEFAULT)
        .clamp(BUDGET_MIN, BUDGET_MAX)
}

/// Canned squad used when `FPL_SOURCE=demo`, so the UI can be driven without
/// the optimizer backend running.
pub fn placeholder_squad() -> (SquadView, SquadTotals) {
    let starters = vec![
        placeholder_player("Aron Stone", "Alpha United", Position::Goalkeeper, 4.5, 3.8),
        placeholder_player("Rafa Vega", "Alpha United", Position::Defender, 5.0, 4.2),
        placeholder_player("Marc Holt", "Omega City", Position::Defender, 5.5, 4.6),
        placeholder_player("Ivo Noor", "Delta Rovers", Position::Defender, 4.5, 3.9),
        placeholder_player("Jon Nox", "Omega City", Position::Midfielder, 8.0, 6.1),
        placeholder_player("Tomas Vale", "Alpha United", Position::Midfielder, 7.5, 5.7),
        placeholder_player("Cal Hale", "Delta Rovers", Position::Midfielder, 6.5, 5.0),
        placeholder_player("Viktor Ash", "Sigma Town", Position::Midfielder, 6.0, 4.8),
        placeholder_player("Kai Rook", "Omega City", Position::Forward, 11.0, 7.4),
        placeholder_player("Emil Pike", "Sigma Town", Position::Forward, 9.0, 6.3),
        placeholder_player("Sam Quinn", "Delta Rovers", Position::Forward, 7.0, 5.2),
    ];
    let substitutes = vec![
        placeholder_player("Luka Park", "Sigma Town", Position::Goalkeeper, 4.0, 3.1),
        placeholder_player("Dan Moss", "Alpha United", Position::Defender, 4.0, 3.3),
        placeholder_player("Noel Gray", "Omega City", Position::Midfielder, 5.0, 3.9),
        placeholder_player("Owen Reed", "Delta Rovers", Position::Forward, 5.5, 4.0),
    ];

    let total_cost: f64 = starters.iter().map(|p| p.price).sum();
    let predicted_points: f64 = starters.iter().map(|p| p.predicted_points).sum();
    let totals = SquadTotals {
        total_cost,
        predicted_points,
        remaining_budget: BUDGET_DEFAULT - total_cost,
    };

    (
        SquadView {
            starters,
            substitutes,
        },
        totals,
    )
}

fn placeholder_player(
    name: &str,
    team: &str,
    position: Position,
    price: f64,
    predicted: f64,
) -> Player {
    Player {
        name: name.to_string(),
        team: team.to_string(),
        position,
        price,
        predicted_points: predicted,
        total_points: (predicted * 12.0) as i64,
        minutes: 1800,
        goals: match position {
            Position::Forward => 9,
            Position::Midfielder => 4,
            _ => 0,
        },
        assists: 3,
        clean_sheets: match position {
            Position::Goalkeeper | Position::Defender => 7,
            _ => 1,
        },
        form: predicted * 0.8,
        points_per_game: predicted * 0.7,
        selected_by_percent: price * 2.5,
        image_url: None,
        next_opponent: Some("Theta Wanderers".to_string()),
        next_fdr: Some(3.0),
    }
}
