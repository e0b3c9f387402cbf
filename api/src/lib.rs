pub mod client;
pub mod normalize;
pub mod replay;
pub mod statsapi;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the Stats API wire format
// ---------------------------------------------------------------------------

/// Coarse game status as reported by the schedule and live feed endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Preview,
    Live,
    Final,
}

impl GameStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Preview => "Preview",
            GameStatus::Live => "Live",
            GameStatus::Final => "Final",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == GameStatus::Final
    }
}

/// Schedule filter. Only the three types the game picker offers are modelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    #[default]
    Regular,
    Postseason,
    Spring,
}

impl GameType {
    pub fn code(&self) -> &'static str {
        match self {
            GameType::Regular => "R",
            GameType::Postseason => "P",
            GameType::Spring => "S",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameType::Regular => "Regular Season",
            GameType::Postseason => "Postseason",
            GameType::Spring => "Spring Training",
        }
    }

    pub fn next(self) -> Self {
        match self {
            GameType::Regular => GameType::Postseason,
            GameType::Postseason => GameType::Spring,
            GameType::Spring => GameType::Regular,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamLine {
    pub name: String,
    pub score: u16,
    pub record: Option<String>, // "W-L"
}

/// One row of a day's schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSummary {
    pub id: u64,
    pub status: GameStatus,
    pub detailed_state: String,
    pub home_team: TeamLine,
    pub away_team: TeamLine,
    pub start_time: Option<DateTime<Utc>>,
    pub venue: String,
    pub game_type: String,
    pub description: String,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InningHalf {
    #[default]
    Top,
    Bottom,
}

impl InningHalf {
    /// Upstream sends "Top"/"Bottom" on the linescore and "top"/"bottom" on plays.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("bottom") => InningHalf::Bottom,
            _ => InningHalf::Top,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InningHalf::Top => "top",
            InningHalf::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
    pub outs: u8,
}

impl Count {
    pub const MAX_BALLS: u8 = 3;
    pub const MAX_STRIKES: u8 = 2;
    pub const MAX_OUTS: u8 = 2;

    /// Build a count from raw upstream numbers. Out-of-range values are pinned
    /// to the nearest legal value; missing values are zero.
    pub fn clamped(balls: Option<i32>, strikes: Option<i32>, outs: Option<i32>) -> Self {
        let pin = |v: Option<i32>, max: u8| v.unwrap_or(0).clamp(0, i32::from(max)) as u8;
        Self {
            balls: pin(balls, Self::MAX_BALLS),
            strikes: pin(strikes, Self::MAX_STRIKES),
            outs: pin(outs, Self::MAX_OUTS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    pub fn code(&self) -> &'static str {
        match self {
            Base::First => "1B",
            Base::Second => "2B",
            Base::Third => "3B",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Base::ALL.into_iter().find(|b| b.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Base::First => "first",
            Base::Second => "second",
            Base::Third => "third",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}

impl Score {
    pub fn clamped(home: Option<i32>, away: Option<i32>) -> Self {
        let pin = |v: Option<i32>| v.unwrap_or(0).clamp(0, i32::from(u16::MAX)) as u16;
        Self { home: pin(home), away: pin(away) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batter {
    pub name: String,
    pub average: String, // ".287"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pitcher {
    pub name: String,
    pub pitch_count: u32,
    pub strikeouts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchResult {
    Ball,
    Strike,
    Foul,
    InPlay,
    Unknown,
}

impl PitchResult {
    pub fn label(&self) -> &'static str {
        match self {
            PitchResult::Ball => "ball",
            PitchResult::Strike => "strike",
            PitchResult::Foul => "foul",
            PitchResult::InPlay => "in play",
            PitchResult::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastPitch {
    pub pitch_type: String,
    pub speed_mph: f64,
    pub result: PitchResult,
    pub description: String,
}

/// Canonical snapshot of a game at one tick, regardless of whether it came from
/// the live feed or from a recorded play.
#[derive(Debug, Clone)]
pub struct GameState {
    pub inning: u8,
    pub inning_half: InningHalf,
    pub count: Count,
    pub base_runners: BTreeSet<Base>,
    pub score: Score,
    pub batter: Option<Batter>,
    pub pitcher: Option<Pitcher>,
    pub last_pitch: Option<LastPitch>,
    /// Upstream record this state was built from. Display only; never compared.
    pub raw_play: Option<Arc<statsapi::Play>>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            inning: 1,
            inning_half: InningHalf::Top,
            count: Count::default(),
            base_runners: BTreeSet::new(),
            score: Score::default(),
            batter: None,
            pitcher: None,
            last_pitch: None,
            raw_play: None,
        }
    }
}

// Two independently fetched snapshots with the same normalized content are the
// same state, even though their raw records are different allocations.
impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.inning == other.inning
            && self.inning_half == other.inning_half
            && self.count == other.count
            && self.base_runners == other.base_runners
            && self.score == other.score
            && self.batter == other.batter
            && self.pitcher == other.pitcher
            && self.last_pitch == other.last_pitch
    }
}

impl GameState {
    pub fn is_occupied(&self, base: Base) -> bool {
        self.base_runners.contains(&base)
    }

    /// Description of the play the state came from, when upstream recorded one.
    pub fn play_description(&self) -> Option<&str> {
        self.raw_play
            .as_ref()
            .and_then(|p| p.result.as_ref())
            .and_then(|r| r.description.as_deref())
            .filter(|d| !d.trim().is_empty())
    }
}

/// Matchup metadata captured when a finished game is loaded for replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub home_team: String,
    pub away_team: String,
    pub venue: String,
}

/// Box-score style wrap-up of a finished game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalSummary {
    pub home_team: String,
    pub away_team: String,
    pub score: Score,
    pub total_plays: usize,
    pub final_plays: Vec<String>,
}
