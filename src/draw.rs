use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::commentary::capitalize;
use crate::state::app_state::TrackingMode;
use crate::state::network::LoadingState;
use crate::state::transcript::Role;
use crate::ui::layout::LayoutAreas;
use mlb_api::{Base, GameState, GameStatus, GameSummary};

static TABS: &[&str; 2] = &["Schedule", "Game"];

static HELP_TEXT: &str = "\
Schedule:  h/l or ←/→ day   j/k move   t game type   r reload   Enter follow game

Game:      space play/pause   s stop   m personality   i/Enter ask a question
           j/k scroll   c clear chat   Esc back to schedule

Anywhere:  1 schedule   2 game   \" logs   f full screen   ? help   q quit";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Schedule => draw_schedule(f, layout.main, app),
            MenuItem::Game => draw_game(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Schedule => 0,
        MenuItem::Game => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Schedule tab
// ---------------------------------------------------------------------------

fn draw_schedule(f: &mut Frame, area: Rect, app: &App) {
    let schedule = &app.state.schedule;
    let title = format!(
        " {} | {} ",
        schedule.date.format("%a %b %-d, %Y"),
        schedule.game_type.label()
    );
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("Keys: h/l=day  j/k=move  t=type  Enter=follow  ?=help  q=quit")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if schedule.games.is_empty() {
        let msg = if !schedule.loaded {
            "Loading schedule..."
        } else {
            "No games scheduled. Try another day (h/l) or game type (t)."
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }

    let visible = content.height as usize;
    let start = schedule.selected.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = schedule
        .games
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, game)| {
            let selected = i == schedule.selected;
            let tracked = app.state.tracking.is_tracking(game.id);
            let marker = match (selected, tracked) {
                (true, _) => "> ",
                (false, true) => "* ",
                _ => "  ",
            };
            let style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(status_color(game.status))
            };
            Line::from(Span::styled(format!("{marker}{}", schedule_row(game)), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), content);
}

fn schedule_row(game: &GameSummary) -> String {
    let time = game
        .start_time
        .map(|t| t.with_timezone(&chrono::Local).format("%-I:%M %p").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    let record = |r: &Option<String>| r.as_ref().map(|r| format!(" ({r})")).unwrap_or_default();
    let score = match game.status {
        GameStatus::Preview => String::new(),
        _ => format!("  {}-{}", game.away_team.score, game.home_team.score),
    };
    format!(
        "{time:>8}  {}{} @ {}{}{score}  [{}]",
        game.away_team.name,
        record(&game.away_team.record),
        game.home_team.name,
        record(&game.home_team.record),
        game.detailed_state,
    )
}

fn status_color(status: GameStatus) -> Color {
    match status {
        GameStatus::Preview => Color::White,
        GameStatus::Live => Color::Green,
        GameStatus::Final => Color::DarkGray,
    }
}

// ---------------------------------------------------------------------------
// Game tab
// ---------------------------------------------------------------------------

fn draw_game(f: &mut Frame, area: Rect, app: &App) {
    let [board_area, chat_area] = if area.width >= 90 {
        Layout::horizontal([Constraint::Length(40), Constraint::Fill(1)]).areas(area)
    } else {
        Layout::vertical([Constraint::Length(14), Constraint::Fill(1)]).areas(area)
    };
    draw_scoreboard(f, board_area, app);
    draw_transcript(f, chat_area, app);
}

fn draw_scoreboard(f: &mut Frame, area: Rect, app: &App) {
    let tracking = &app.state.tracking;
    let title = tracking
        .info
        .as_ref()
        .map(|i| format!(" {} @ {} ", i.away_team, i.home_team))
        .or_else(|| tracking.matchup.as_ref().map(|m| format!(" {m} ")))
        .unwrap_or_else(|| " Game ".to_string());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::raw(tracking_status(app)),
    ])];
    if let Some(err) = app.state.last_error.as_deref() {
        lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
    }

    let Some(state) = tracking.game_state.as_ref() else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "No plays yet.",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(Paragraph::new(lines), inner);
        return;
    };

    lines.push(Line::from(""));
    lines.extend(state_lines(state));
    if let Some(play) = state.play_description() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            play.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
    if let Some(summary) = &tracking.final_summary {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Final after {} plays", summary.total_plays),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for play in &summary.final_plays {
            lines.push(Line::from(format!("- {play}")));
        }
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn tracking_status(app: &App) -> String {
    let tracking = &app.state.tracking;
    let playing = if tracking.is_playing { "playing" } else { "paused" };
    match tracking.mode {
        TrackingMode::Idle => "no game selected".to_string(),
        TrackingMode::Opening => "loading...".to_string(),
        TrackingMode::Replay { total_plays, played } => {
            format!("replay {played}/{total_plays} ({playing})")
        }
        TrackingMode::Live { status } => format!("{} ({playing})", status.label()),
        TrackingMode::Finished => "final".to_string(),
    }
}

fn state_lines(state: &GameState) -> Vec<Line<'static>> {
    let base = |b: Base| if state.is_occupied(b) { "◆" } else { "◇" };
    let mut lines = vec![
        Line::from(format!(
            "{} {}   Away {} - Home {}",
            capitalize(state.inning_half.label()),
            state.inning,
            state.score.away,
            state.score.home
        )),
        Line::from(format!(
            "Count {}-{}   Outs {}",
            state.count.balls, state.count.strikes, state.count.outs
        )),
        Line::from(""),
        Line::from(format!("      {}", base(Base::Second))),
        Line::from(format!("   {}     {}", base(Base::Third), base(Base::First))),
        Line::from(""),
    ];

    if let Some(batter) = &state.batter {
        lines.push(Line::from(format!("AB: {} ({})", batter.name, batter.average)));
    }
    if let Some(pitcher) = &state.pitcher {
        lines.push(Line::from(format!(
            "P:  {} ({} P, {} K)",
            pitcher.name, pitcher.pitch_count, pitcher.strikeouts
        )));
    }
    if let Some(pitch) = &state.last_pitch {
        lines.push(Line::from(format!(
            "Last: {} {:.1} mph, {}",
            pitch.pitch_type,
            pitch.speed_mph,
            pitch.result.label()
        )));
    }
    lines
}

fn draw_transcript(f: &mut Frame, area: Rect, app: &App) {
    let transcript = &app.state.transcript;
    let block =
        default_border(Color::White).title(format!(" Buddy ({}) ", app.state.mode.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height < 4 {
        return;
    }

    let [messages_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(inner);

    let mut lines = Vec::new();
    for msg in transcript.messages() {
        let style = match msg.role {
            Role::System => Style::default().fg(Color::DarkGray),
            Role::User => Style::default().fg(Color::Cyan),
            Role::Assistant => Style::default().fg(Color::White),
        };
        let prefix = format!("[{}] {}: ", msg.timestamp.format("%H:%M"), msg.role.label());
        lines.push(Line::from(vec![
            Span::styled(prefix, style.add_modifier(Modifier::DIM)),
            Span::styled(msg.text.clone(), style),
        ]));
    }

    let visible = messages_area.height as usize;
    let total = lines.len();
    let offset = transcript.scroll_offset as usize;
    let end = total.saturating_sub(offset);
    let start = end.saturating_sub(visible);
    let window = if start < end { lines[start..end].to_vec() } else { Vec::new() };
    f.render_widget(Paragraph::new(window).wrap(Wrap { trim: false }), messages_area);

    let mode = if transcript.composing { "typing" } else { "idle" };
    let input = if transcript.composing {
        format!("> {}_", transcript.input)
    } else {
        "Press Enter/i to ask. Esc cancel. space play/pause. m mode. s stop.".to_string()
    };
    let input_style = if transcript.composing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_block = default_border(Color::DarkGray).title(format!(" {mode} "));
    let input_inner = input_block.inner(input_area);
    f.render_widget(input_block, input_area);
    f.render_widget(Paragraph::new(input).style(input_style), input_inner);
}

// ---------------------------------------------------------------------------
// Shared chrome
// ---------------------------------------------------------------------------

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Left),
        inner,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading {
        return;
    }
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::White));
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
