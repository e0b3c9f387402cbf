use crate::state::network::LoadingState;
use chrono::NaiveDate;
use crossterm::event::KeyEvent;
use mlb_api::{FinalSummary, GameInfo, GameState, GameStatus, GameSummary, GameType};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadSchedule { date: NaiveDate, game_type: GameType },
    /// Re-run the last schedule query so statuses and scores stay current.
    RefreshSchedule,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    ScheduleLoaded { date: NaiveDate, games: Vec<GameSummary> },
}

#[derive(Debug, Clone)]
pub enum TrackerCommand {
    Select { game_pk: u64 },
    Play,
    Pause,
    Stop,
}

#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A finished game was loaded and is ready to step through.
    ReplayLoaded { game_pk: u64, total_plays: usize, info: GameInfo },
    /// A scheduled or in-progress game was opened for live polling.
    LiveStarted { game_pk: u64, status: GameStatus, state: GameState },
    State { game_pk: u64, state: GameState },
    /// End of game. `state` is present when the final snapshot came from a live poll.
    Final { game_pk: u64, state: Option<GameState>, summary: FinalSummary },
    ReplayFinished { game_pk: u64 },
    Status { game_pk: Option<u64>, message: String },
    Stopped,
}

impl TrackerEvent {
    pub fn game_pk(&self) -> Option<u64> {
        match self {
            TrackerEvent::ReplayLoaded { game_pk, .. }
            | TrackerEvent::LiveStarted { game_pk, .. }
            | TrackerEvent::State { game_pk, .. }
            | TrackerEvent::Final { game_pk, .. }
            | TrackerEvent::ReplayFinished { game_pk } => Some(*game_pk),
            TrackerEvent::Status { game_pk, .. } => *game_pk,
            TrackerEvent::Stopped => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
