use crate::app::MenuItem;
use crate::commentary::PersonalityMode;
use crate::state::transcript::Transcript;
use chrono::{Days, Local, NaiveDate};
use mlb_api::{FinalSummary, GameInfo, GameState, GameStatus, GameSummary, GameType};

// ---------------------------------------------------------------------------
// Schedule / game picker state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ScheduleState {
    pub date: NaiveDate,
    pub game_type: GameType,
    pub games: Vec<GameSummary>,
    pub selected: usize,
    /// False until the first response for `date` arrives.
    pub loaded: bool,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}

impl ScheduleState {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            game_type: GameType::default(),
            games: Vec::new(),
            selected: 0,
            loaded: false,
        }
    }

    /// Store a day's games. Responses for a date the user already moved away
    /// from are ignored.
    pub fn load(&mut self, date: NaiveDate, games: Vec<GameSummary>) {
        if date != self.date {
            return;
        }
        let previous = self.selected_game().map(|g| g.id);
        self.games = games;
        self.loaded = true;
        self.selected = previous
            .and_then(|id| self.games.iter().position(|g| g.id == id))
            .unwrap_or(0);
    }

    pub fn next_day(&mut self) {
        if let Some(date) = self.date.checked_add_days(Days::new(1)) {
            self.set_date(date);
        }
    }

    pub fn prev_day(&mut self) {
        if let Some(date) = self.date.checked_sub_days(Days::new(1)) {
            self.set_date(date);
        }
    }

    pub fn cycle_game_type(&mut self) {
        self.game_type = self.game_type.next();
        self.clear();
    }

    pub fn navigate_down(&mut self) {
        let max = self.games.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_game(&self) -> Option<&GameSummary> {
        self.games.get(self.selected)
    }

    fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.clear();
    }

    fn clear(&mut self) {
        self.games.clear();
        self.selected = 0;
        self.loaded = false;
    }
}

// ---------------------------------------------------------------------------
// Tracking state (the game being followed)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackingMode {
    #[default]
    Idle,
    /// Opening request sent, nothing back yet.
    Opening,
    Replay { total_plays: usize, played: usize },
    Live { status: GameStatus },
    Finished,
}

#[derive(Debug, Default)]
pub struct TrackingState {
    pub game_pk: Option<u64>,
    /// "Away @ Home" from the schedule row, shown until the feed answers.
    pub matchup: Option<String>,
    pub info: Option<GameInfo>,
    pub mode: TrackingMode,
    pub is_playing: bool,
    pub game_state: Option<GameState>,
    pub final_summary: Option<FinalSummary>,
}

impl TrackingState {
    pub fn open(game: &GameSummary) -> Self {
        Self {
            game_pk: Some(game.id),
            matchup: Some(format!("{} @ {}", game.away_team.name, game.home_team.name)),
            mode: TrackingMode::Opening,
            ..Self::default()
        }
    }

    pub fn is_tracking(&self, game_pk: u64) -> bool {
        self.game_pk == Some(game_pk)
    }

    /// Whether `Play` has anything to drive.
    pub fn can_play(&self) -> bool {
        matches!(self.mode, TrackingMode::Replay { .. } | TrackingMode::Live { .. })
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub schedule: ScheduleState,
    pub tracking: TrackingState,
    pub transcript: Transcript,
    pub mode: PersonalityMode,
}

impl AppState {
    pub fn new(mode: PersonalityMode) -> Self {
        Self { mode, ..Self::default() }
    }
}
