//! Wire layer for the optimizer backend: the `/get_team` squad request and
//! the `/update_data` refresh trigger. Parsing is split from the HTTP calls
//! so fixtures can drive it in tests.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::http_client::{endpoint, http_client};
use crate::layout::Formation;
use crate::state::{Player, SquadTotals, SquadView};

#[derive(Debug, Clone, Deserialize)]
pub struct SquadResponse {
    #[serde(default)]
    pub team: Vec<Player>,
    #[serde(default)]
    pub substitutes: Vec<Player>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub predicted_points: Option<f64>,
    #[serde(default)]
    pub remaining_budget: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    // The backend reports some failures as {"status": "error", "message"}
    // with a 500 instead of an `error` field.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl UpdateResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

pub fn fetch_squad(formation: Formation, budget: f64) -> Result<SquadResponse> {
    let client = http_client()?;
    let url = endpoint("/get_team");
    let resp = client
        .post(&url)
        .form(&[
            ("formation", formation.to_string()),
            ("budget", format!("{budget:.1}")),
        ])
        .send()
        .context("get_team request failed")?;

    let status = resp.status();
    let body = resp.text().context("failed reading get_team body")?;
    match parse_squad_response(&body) {
        Ok(parsed) => Ok(parsed),
        // Error statuses come with a JSON body when the backend produced
        // them itself; anything unparseable gets reported with the status.
        Err(err) if !status.is_success() => Err(anyhow!("http {status}: {err}")),
        Err(err) => Err(err),
    }
}

pub fn fetch_update() -> Result<UpdateResponse> {
    let client = http_client()?;
    let url = endpoint("/update_data");
    let resp = client
        .post(&url)
        .send()
        .context("update_data request failed")?;

    let status = resp.status();
    let body = resp.text().context("failed reading update_data body")?;
    match parse_update_response(&body) {
        Ok(parsed) => Ok(parsed),
        Err(err) if !status.is_success() => Err(anyhow!("http {status}: {err}")),
        Err(err) => Err(err),
    }
}

pub fn parse_squad_response(raw: &str) -> Result<SquadResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty get_team response"));
    }
    serde_json::from_str(trimmed).context("invalid get_team json")
}

pub fn parse_update_response(raw: &str) -> Result<UpdateResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty update_data response"));
    }
    serde_json::from_str(trimmed).context("invalid update_data json")
}

/// Server-reported failure, folding both error shapes into one string.
pub fn response_error(resp: &SquadResponse) -> Option<String> {
    if let Some(error) = &resp.error {
        return Some(error.clone());
    }
    if resp.status.as_deref() == Some("error") {
        return Some(
            resp.message
                .clone()
                .unwrap_or_else(|| "server reported an error".to_string()),
        );
    }
    None
}

/// Shapes a parsed response into display state. `Err` carries the message to
/// surface in the error popup; the caller leaves the prior squad untouched.
pub fn build_squad_view(resp: SquadResponse) -> std::result::Result<(SquadView, SquadTotals), String> {
    if let Some(message) = response_error(&resp) {
        return Err(message);
    }
    if resp.team.is_empty() {
        return Err("No team data available for rendering.".to_string());
    }

    let totals = SquadTotals {
        total_cost: resp.total_cost.unwrap_or_default(),
        predicted_points: resp.predicted_points.unwrap_or_default(),
        remaining_budget: resp.remaining_budget.unwrap_or_default(),
    };
    Ok((
        SquadView {
            starters: resp.team,
            substitutes: resp.substitutes,
        },
        totals,
    ))
}
