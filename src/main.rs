use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Local};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use fpl_terminal::layout::{PITCH_HEIGHT, PITCH_WIDTH, PitchSpot};
use fpl_terminal::provider::spawn_provider;
use fpl_terminal::state::{
    AppState, Delta, FetchPhase, Player, Position, ProviderCommand, StatusTone, apply_delta,
};

const ICON_WIDTH: u16 = 12;
const ICON_HEIGHT: u16 = 2;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        // The error popup works like the form's blocking alert: nothing else
        // reacts until it is dismissed.
        if self.state.error_popup.is_some() {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b')
            ) {
                self.state.error_popup = None;
            }
            return;
        }

        if self.state.player_modal {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('d')
            ) {
                self.state.player_modal = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('g') | KeyCode::Char('s') => self.submit_squad(true),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_update(),
            KeyCode::Char('f') => self.state.cycle_formation(),
            KeyCode::Char('F') => self.state.cycle_formation_back(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.state.adjust_budget(1),
            KeyCode::Char('-') | KeyCode::Char('_') => self.state.adjust_budget(-1),
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Right => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char('d') => {
                if self.state.selected_player().is_some() {
                    self.state.player_modal = true;
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn submit_squad(&mut self, announce: bool) {
        let formation = self.state.formation;
        let budget = self.state.budget;
        self.state.phase = FetchPhase::Submitting;
        if self
            .cmd_tx
            .send(ProviderCommand::FetchSquad { formation, budget })
            .is_err()
        {
            self.state.phase = FetchPhase::Errored;
            self.state.push_log("[WARN] Squad request failed to dispatch");
        } else if announce {
            self.state
                .push_log(format!("[INFO] Squad requested ({formation}, £{budget:.1}m)"));
        }
    }

    fn request_update(&mut self) {
        if self.state.updating {
            self.state.push_log("[INFO] Update already running");
            return;
        }
        self.state.begin_update();
        if self.cmd_tx.send(ProviderCommand::UpdateData).is_err() {
            apply_delta(
                &mut self.state,
                Delta::UpdateFinished {
                    ok: false,
                    message: "update request failed to dispatch".to_string(),
                },
            );
        } else {
            self.state.push_log("[INFO] Update requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        // A successful data refresh re-submits the form with the current
        // field values, exactly like the synthetic submit event it replaces.
        if app.state.resubmit_pending {
            app.state.resubmit_pending = false;
            app.submit_squad(false);
        }

        app.state.maybe_clear_status(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_body(frame, chunks[1], &app.state);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.player_modal {
        render_player_modal(frame, frame.size(), &app.state);
    }
    if let Some(message) = &app.state.error_popup {
        render_error_popup(frame, frame.size(), message);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!(
        "  __   FPL TERMINAL | {} | £{:.1}m | {}",
        state.formation,
        state.budget,
        phase_label(state.phase)
    );
    let line2 = " |__|".to_string();
    let line3 = "  ||".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.error_popup.is_some() {
        return "Enter/Esc Dismiss".to_string();
    }
    if state.player_modal {
        return "b/Esc/Enter Close".to_string();
    }
    "g Get team | f/F Formation | +/- Budget | r Update data | j/k/arrows Move | Enter/d Player | ? Help | q Quit"
        .to_string()
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(32)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(5)])
        .split(columns[0]);

    render_pitch(frame, left[0], state);
    render_bench(frame, left[1], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(columns[1]);

    render_summary(frame, right[0], state);
    render_form(frame, right[1], state);
    render_refresh(frame, right[2], state);
    render_console(frame, right[3], state);
}

fn render_pitch(frame: &mut Frame, area: Rect, state: &AppState) {
    let formation = state.rendered_formation.unwrap_or(state.formation);
    let title = match state.rendered_formation {
        Some(f) => format!("Pitch ({f})"),
        None => "Pitch".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let pitch_players = state.pitch_players();
    if pitch_players.is_empty() {
        let text = match state.phase {
            FetchPhase::Submitting => "Fetching squad...",
            _ => "No squad yet. Press g to fetch one.",
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    // Short teams just fill fewer slots; surplus players never get one.
    let spots = formation.positions();
    for (idx, (player, spot)) in pitch_players.iter().zip(spots.iter()).enumerate() {
        let selected = idx == state.selected;
        render_player_icon(frame, inner, player, *spot, selected);
    }
}

fn render_player_icon(
    frame: &mut Frame,
    inner: Rect,
    player: &Player,
    spot: PitchSpot,
    selected: bool,
) {
    let icon_area = spot_rect(inner, spot);
    if icon_area.width == 0 || icon_area.height == 0 {
        return;
    }

    let mut name_style = Style::default()
        .fg(position_color(player.position))
        .add_modifier(Modifier::BOLD);
    let mut stat_style = Style::default().fg(Color::Gray);
    if selected {
        name_style = name_style.bg(Color::DarkGray);
        stat_style = stat_style.bg(Color::DarkGray);
    }

    let name = fit(player.surname(), icon_area.width);
    let stats = fit(
        &format!("£{:.1}m {:.0}p", player.price, player.predicted_points),
        icon_area.width,
    );
    let text = Text::from(vec![
        Line::styled(name, name_style),
        Line::styled(stats, stat_style),
    ]);
    frame.render_widget(Paragraph::new(text), icon_area);
}

fn spot_rect(inner: Rect, spot: PitchSpot) -> Rect {
    let usable_w = inner.width.saturating_sub(ICON_WIDTH);
    let usable_h = inner.height.saturating_sub(ICON_HEIGHT);
    let x = inner.x + ((spot.left / PITCH_WIDTH) * usable_w as f32).round() as u16;
    let y = inner.y + ((spot.top / PITCH_HEIGHT) * usable_h as f32).round() as u16;
    Rect {
        x,
        y,
        width: ICON_WIDTH.min(inner.width),
        height: ICON_HEIGHT.min(inner.height),
    }
}

fn render_bench(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Bench").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let subs = state.bench_players();
    if subs.is_empty() {
        let empty = Paragraph::new("No substitutes").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let constraints: Vec<Constraint> = subs
        .iter()
        .map(|_| Constraint::Ratio(1, subs.len() as u32))
        .collect();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    let pitch_count = state.pitch_players().len();
    for (idx, (player, col)) in subs.iter().zip(cols.iter()).enumerate() {
        let selected = state.selected == pitch_count + idx;
        let mut name_style = Style::default()
            .fg(position_color(player.position))
            .add_modifier(Modifier::BOLD);
        let mut stat_style = Style::default().fg(Color::Gray);
        if selected {
            name_style = name_style.bg(Color::DarkGray);
            stat_style = stat_style.bg(Color::DarkGray);
        }
        let text = Text::from(vec![
            Line::styled(fit(player.surname(), col.width), name_style),
            Line::styled(
                fit(
                    &format!(
                        "{} £{:.1}m {:.0}p",
                        player.position.short_label(),
                        player.price,
                        player.predicted_points
                    ),
                    col.width,
                ),
                stat_style,
            ),
        ]);
        frame.render_widget(Paragraph::new(text), *col);
    }
}

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match &state.totals {
        Some(totals) => format!(
            "Total cost: £{:.1}m\nPredicted pts: {:.1}\nBudget left: £{:.1}m\nFetched: {}",
            totals.total_cost,
            totals.predicted_points,
            totals.remaining_budget,
            format_fetched_at(state.squad_fetched_at)
        ),
        None => "Total cost: -\nPredicted pts: -\nBudget left: -\nFetched: -".to_string(),
    };
    let summary = Paragraph::new(text).block(Block::default().title("Summary").borders(Borders::ALL));
    frame.render_widget(summary, area);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = format!(
        "Formation: {}\nBudget: £{:.1}m\nPhase: {}",
        state.formation,
        state.budget,
        phase_label(state.phase)
    );
    let form = Paragraph::new(text).block(Block::default().title("Form").borders(Borders::ALL));
    frame.render_widget(form, area);
}

fn render_refresh(frame: &mut Frame, area: Rect, state: &AppState) {
    let (message, style) = match &state.update_status {
        Some(status) => (status.message.clone(), tone_style(status.tone)),
        None => (String::new(), Style::default()),
    };
    let trigger = if state.updating {
        "r Update data (busy)"
    } else {
        "r Update data"
    };
    let text = Text::from(vec![
        Line::raw(trigger),
        Line::styled(message, style),
    ]);
    let refresh =
        Paragraph::new(text).block(Block::default().title("Data").borders(Borders::ALL));
    frame.render_widget(refresh, area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Console").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.logs.is_empty() {
        let empty = Paragraph::new("No activity yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let take = inner.height as usize;
    let text = state
        .logs
        .iter()
        .rev()
        .take(take)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n");
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_player_modal(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(player) = state.selected_player() else {
        return;
    };

    let popup_area = centered_rect(56, 72, area);
    frame.render_widget(Clear, popup_area);

    let photo = match &player.image_url {
        Some(url) if !url.is_empty() => url.clone(),
        _ => "No image available".to_string(),
    };
    let next_opponent = player
        .next_opponent
        .clone()
        .unwrap_or_else(|| "N/A".to_string());
    let next_fdr = player
        .next_fdr
        .map(format_fdr)
        .unwrap_or_else(|| "N/A".to_string());

    let text = [
        format!("{} ({})", player.name, player.team),
        format!("Position: {}", player.position.long_label()),
        String::new(),
        format!("Price: £{:.1}m", player.price),
        format!("Predicted points: {:.1}", player.predicted_points),
        format!("Total points: {}", player.total_points),
        format!("Minutes: {}", player.minutes),
        format!("Goals: {}", player.goals),
        format!("Assists: {}", player.assists),
        format!("Clean sheets: {}", player.clean_sheets),
        format!("Form: {:.1}", player.form),
        format!("Points per game: {:.1}", player.points_per_game),
        format!("Selected by: {:.1}%", player.selected_by_percent),
        format!("Next opponent: {next_opponent}"),
        format!("Next FDR: {next_fdr}"),
        String::new(),
        format!("Photo: {photo}"),
    ]
    .join("\n");

    let modal = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Player Stats").borders(Borders::ALL));
    frame.render_widget(modal, popup_area);
}

fn render_error_popup(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let text = format!("{message}\n\nPress Enter to dismiss");
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FPL Terminal - Help",
        "",
        "Form:",
        "  g / s        Get team for the current form",
        "  f / F        Cycle formation",
        "  + / -        Adjust budget",
        "  r            Update server data",
        "",
        "Squad:",
        "  j/k or ↑/↓   Move between players",
        "  Enter / d    Player stats",
        "  b / Esc      Close popup",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn fit(text: &str, width: u16) -> String {
    text.chars().take(width as usize).collect()
}

fn phase_label(phase: FetchPhase) -> &'static str {
    match phase {
        FetchPhase::Idle => "IDLE",
        FetchPhase::Submitting => "SUBMITTING",
        FetchPhase::Rendered => "RENDERED",
        FetchPhase::Errored => "ERRORED",
    }
}

fn tone_style(tone: StatusTone) -> Style {
    match tone {
        StatusTone::Info => Style::default().fg(Color::Gray),
        StatusTone::Success => Style::default().fg(Color::Green),
        StatusTone::Error => Style::default().fg(Color::Red),
    }
}

fn position_color(position: Position) -> Color {
    match position {
        Position::Goalkeeper => Color::Yellow,
        Position::Defender => Color::Cyan,
        Position::Midfielder => Color::Green,
        Position::Forward => Color::Red,
    }
}

fn format_fdr(fdr: f64) -> String {
    if fdr.fract() == 0.0 {
        format!("{fdr:.0}")
    } else {
        format!("{fdr:.1}")
    }
}

fn format_fetched_at(at: Option<SystemTime>) -> String {
    match at {
        Some(time) => {
            let local: DateTime<Local> = time.into();
            local.format("%H:%M:%S").to_string()
        }
        None => "-".to_string(),
    }
}
