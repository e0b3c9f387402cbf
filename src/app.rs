use crate::commentary::{self, PersonalityMode};
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, TrackingMode, TrackingState};
use crate::state::messages::{TrackerCommand, TrackerEvent};
use chrono::NaiveDate;
use log::debug;
use mlb_api::GameSummary;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Schedule,
    Game,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(settings.mode),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network and tracker handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_schedule_loaded(&mut self, date: NaiveDate, games: Vec<GameSummary>) {
        self.state.last_error = None;
        self.state.schedule.load(date, games);
    }

    pub fn on_tracker_event(&mut self, event: TrackerEvent) {
        if let Some(game_pk) = event.game_pk()
            && !self.state.tracking.is_tracking(game_pk)
        {
            debug!("ignoring tracker event for game {game_pk}");
            return;
        }

        let mode = self.state.mode;
        let tracking = &mut self.state.tracking;
        let transcript = &mut self.state.transcript;

        match event {
            TrackerEvent::ReplayLoaded { total_plays, info, .. } => {
                tracking.mode = TrackingMode::Replay { total_plays, played: 0 };
                tracking.game_state = None;
                transcript.push_assistant(commentary::welcome(&info, mode));
                transcript.push_system(format!(
                    "Replay ready: {total_plays} plays. Press space to play."
                ));
                tracking.info = Some(info);
            }
            TrackerEvent::LiveStarted { status, state, .. } => {
                tracking.mode = TrackingMode::Live { status };
                tracking.game_state = Some(state);
                transcript.push_system(format!(
                    "Game is {}. Press space to follow along.",
                    status.label().to_lowercase()
                ));
            }
            TrackerEvent::State { state, .. } => {
                if let TrackingMode::Replay { played, .. } = &mut tracking.mode {
                    *played += 1;
                }
                transcript.push_assistant(commentary::generate(Some(&state), mode));
                tracking.game_state = Some(state);
            }
            TrackerEvent::Final { state, summary, .. } => {
                if let Some(state) = state {
                    tracking.game_state = Some(state);
                }
                tracking.mode = TrackingMode::Finished;
                tracking.is_playing = false;
                transcript.push_assistant(commentary::final_call(&summary, mode));
                tracking.final_summary = Some(summary);
            }
            TrackerEvent::ReplayFinished { .. } => {
                tracking.is_playing = false;
                transcript.push_system("Replay complete.");
            }
            TrackerEvent::Status { message, .. } => {
                transcript.push_system(message.clone());
                self.state.last_error = Some(message);
            }
            TrackerEvent::Stopped => transcript.push_system("Tracking stopped."),
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if self.state.active_tab == MenuItem::Game {
            self.state.transcript.scroll_offset = 0;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Game selection and playback
    // -----------------------------------------------------------------------

    /// Start following the highlighted schedule row. Returns the command for
    /// the tracker and switches to the Game tab.
    pub fn select_game(&mut self) -> Option<TrackerCommand> {
        let game = self.state.schedule.selected_game()?;
        let tracking = TrackingState::open(game);
        let game_pk = game.id;

        if let Some(matchup) = &tracking.matchup {
            self.state.transcript.push_system(format!("Loading {matchup}..."));
        }
        self.state.tracking = tracking;
        self.state.last_error = None;
        self.update_tab(MenuItem::Game);
        Some(TrackerCommand::Select { game_pk })
    }

    pub fn toggle_play(&mut self) -> Option<TrackerCommand> {
        let tracking = &mut self.state.tracking;
        if !tracking.can_play() {
            self.state
                .transcript
                .push_system("Nothing to play yet. Pick a game from the schedule.");
            return None;
        }
        tracking.is_playing = !tracking.is_playing;
        Some(if tracking.is_playing {
            TrackerCommand::Play
        } else {
            TrackerCommand::Pause
        })
    }

    /// Forget the tracked game right away so late events for it are ignored.
    pub fn stop_tracking(&mut self) -> Option<TrackerCommand> {
        self.state.tracking.game_pk?;
        self.state.tracking = TrackingState::default();
        Some(TrackerCommand::Stop)
    }

    pub fn cycle_mode(&mut self) {
        self.set_mode(self.state.mode.next());
    }

    pub fn set_mode(&mut self, mode: PersonalityMode) {
        self.state.mode = mode;
        self.state
            .transcript
            .push_system(format!("Switched to {} mode: {}", mode.label(), mode.description()));
    }

    pub fn clear_transcript(&mut self) {
        self.state.transcript.clear();
        if let Some(matchup) = &self.state.tracking.matchup {
            self.state.transcript.push_system(format!("Following {matchup}."));
        }
    }

    /// A question from the user is answered from the current state.
    pub fn submit_input(&mut self) {
        if self.state.transcript.submit_input().is_none() {
            return;
        }
        let reply = commentary::generate(self.state.tracking.game_state.as_ref(), self.state.mode);
        self.state.transcript.push_assistant(reply);
    }
}
