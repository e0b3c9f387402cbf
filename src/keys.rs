use crate::app::{App, MenuItem};
use crate::state::messages::{NetworkRequest, TrackerCommand};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    tracker_commands: &mpsc::Sender<TrackerCommand>,
) {
    let mut guard = app.lock().await;
    let mut reload_schedule = false;
    let mut tracker_command = None;

    // While composing, every printable key goes to the input line.
    if guard.state.transcript.composing {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Enter, _) => guard.submit_input(),
            (KeyCode::Esc, _) => guard.state.transcript.cancel_input(),
            (KeyCode::Backspace, _) => {
                guard.state.transcript.input.pop();
            }
            (Char(c), _) => guard.state.transcript.input.push(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Schedule),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Game),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Schedule navigation
        (MenuItem::Schedule, Char('l') | KeyCode::Right, _) => {
            guard.state.schedule.next_day();
            reload_schedule = true;
        }
        (MenuItem::Schedule, Char('h') | KeyCode::Left, _) => {
            guard.state.schedule.prev_day();
            reload_schedule = true;
        }
        (MenuItem::Schedule, Char('t'), _) => {
            guard.state.schedule.cycle_game_type();
            reload_schedule = true;
        }
        (MenuItem::Schedule, Char('r'), _) => reload_schedule = true,
        (MenuItem::Schedule, Char('j') | KeyCode::Down, _) => {
            guard.state.schedule.navigate_down();
        }
        (MenuItem::Schedule, Char('k') | KeyCode::Up, _) => {
            guard.state.schedule.navigate_up();
        }
        (MenuItem::Schedule, KeyCode::Enter, _) => tracker_command = guard.select_game(),

        // Game view
        (MenuItem::Game, Char(' '), _) => tracker_command = guard.toggle_play(),
        (MenuItem::Game, Char('s'), _) => tracker_command = guard.stop_tracking(),
        (MenuItem::Game, Char('m'), _) => guard.cycle_mode(),
        (MenuItem::Game, Char('c'), _) => guard.clear_transcript(),
        (MenuItem::Game, Char('i') | KeyCode::Enter, _) => {
            guard.state.transcript.composing = true;
        }
        (MenuItem::Game, Char('k') | KeyCode::Up, _) => guard.state.transcript.scroll_up(),
        (MenuItem::Game, Char('j') | KeyCode::Down, _) => guard.state.transcript.scroll_down(),
        (MenuItem::Game, KeyCode::Esc, _) => guard.update_tab(MenuItem::Schedule),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    let schedule_query = reload_schedule.then(|| NetworkRequest::LoadSchedule {
        date: guard.state.schedule.date,
        game_type: guard.state.schedule.game_type,
    });
    drop(guard);

    if let Some(request) = schedule_query {
        let _ = network_requests.send(request).await;
    }
    if let Some(command) = tracker_command {
        let _ = tracker_commands.send(command).await;
    }
}
