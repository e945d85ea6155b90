//! Background request dispatch. The UI thread sends `ProviderCommand`s; each
//! request runs on its own short-lived worker so submissions may overlap and
//! the last response to resolve wins, matching the form's original behavior.

use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::layout::Formation;
use crate::squad_fetch;
use crate::state::{Delta, ProviderCommand, SquadTotals, placeholder_squad};

pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let source = env::var("FPL_SOURCE")
            .unwrap_or_else(|_| "server".to_string())
            .to_lowercase();
        let demo = source == "demo";

        while let Ok(cmd) = cmd_rx.recv() {
            let tx = tx.clone();
            match cmd {
                ProviderCommand::FetchSquad { formation, budget } => {
                    thread::spawn(move || {
                        let delta = if demo {
                            demo_squad(formation, budget)
                        } else {
                            server_squad(formation, budget)
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::UpdateData => {
                    thread::spawn(move || {
                        let delta = if demo { demo_update() } else { server_update() };
                        let _ = tx.send(delta);
                    });
                }
            }
        }
    });
}

fn server_squad(formation: Formation, budget: f64) -> Delta {
    match squad_fetch::fetch_squad(formation, budget) {
        Ok(resp) => match squad_fetch::build_squad_view(resp) {
            Ok((squad, totals)) => Delta::SetSquad {
                formation,
                squad,
                totals,
            },
            Err(message) => Delta::SquadError(message),
        },
        Err(err) => Delta::SquadError(format!(
            "An error occurred while getting the team: {err:#}"
        )),
    }
}

fn server_update() -> Delta {
    match squad_fetch::fetch_update() {
        Ok(resp) if resp.is_success() => Delta::UpdateFinished {
            ok: true,
            message: resp.message.unwrap_or_else(|| "done".to_string()),
        },
        Ok(resp) => Delta::UpdateFinished {
            ok: false,
            message: resp.message.unwrap_or(resp.status),
        },
        Err(err) => Delta::UpdateFinished {
            ok: false,
            message: format!("{err:#}"),
        },
    }
}

fn demo_squad(formation: Formation, budget: f64) -> Delta {
    let mut rng = rand::thread_rng();
    let (mut squad, _) = placeholder_squad();
    for player in squad
        .starters
        .iter_mut()
        .chain(squad.substitutes.iter_mut())
    {
        player.predicted_points =
            (player.predicted_points + rng.gen_range(-0.8..0.8)).max(0.5);
    }

    let total_cost: f64 = squad.starters.iter().map(|p| p.price).sum();
    let predicted_points: f64 = squad.starters.iter().map(|p| p.predicted_points).sum();
    let totals = SquadTotals {
        total_cost,
        predicted_points,
        remaining_budget: budget - total_cost,
    };

    thread::sleep(Duration::from_millis(350));
    Delta::SetSquad {
        formation,
        squad,
        totals,
    }
}

fn demo_update() -> Delta {
    thread::sleep(Duration::from_millis(700));
    Delta::UpdateFinished {
        ok: true,
        message: "Data processing and model training complete!".to_string(),
    }
}
