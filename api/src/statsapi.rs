/// MLB Stats API raw wire types, the serde shapes for deserializing upstream responses.
/// Everything is optional: the feed omits sections freely depending on game state.
/// These map to the clean domain types in client.rs and normalize.rs.
use serde::Deserialize;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusWire {
    pub abstract_game_state: Option<String>, // "Preview" | "Live" | "Final"
    pub detailed_state: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct NamedRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Schedule  (api/v1/schedule)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleResponse {
    pub dates: Option<Vec<ScheduleDate>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleDate {
    pub date: Option<String>,
    pub games: Option<Vec<ScheduleGame>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGame {
    pub game_pk: Option<u64>,
    pub game_type: Option<String>,
    pub game_date: Option<String>, // ISO 8601
    pub status: Option<StatusWire>,
    pub teams: Option<ScheduleTeams>,
    pub venue: Option<NamedRef>,
    pub description: Option<String>,
    pub is_featured_game: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleTeams {
    pub home: Option<ScheduleTeam>,
    pub away: Option<ScheduleTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTeam {
    pub team: Option<NamedRef>,
    pub score: Option<i32>,
    pub league_record: Option<LeagueRecord>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LeagueRecord {
    pub wins: Option<u32>,
    pub losses: Option<u32>,
}

// ---------------------------------------------------------------------------
// Live feed  (api/v1.1/game/{pk}/feed/live)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub game_pk: Option<u64>,
    pub game_data: Option<GameData>,
    pub live_data: Option<LiveData>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GameData {
    pub status: Option<StatusWire>,
    pub teams: Option<GameTeams>,
    pub venue: Option<NamedRef>,
    /// Keyed "ID{personId}".
    pub players: Option<HashMap<String, Player>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GameTeams {
    pub home: Option<NamedRef>,
    pub away: Option<NamedRef>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Option<u64>,
    pub full_name: Option<String>,
    pub stats: Option<PlayerStats>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlayerStats {
    pub batting: Option<BattingStats>,
    pub pitching: Option<PitchingStats>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct BattingStats {
    pub avg: Option<Average>,
}

/// Batting average arrives as ".287" on season stats and as a bare number on
/// some hydrations.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Average {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PitchingStats {
    pub strike_outs: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LiveData {
    pub plays: Option<Plays>,
    pub linescore: Option<Linescore>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Plays {
    pub all_plays: Option<Vec<Play>>,
    pub current_play: Option<Play>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Linescore {
    pub current_inning: Option<i32>,
    pub inning_half: Option<String>, // "Top" | "Bottom"
    pub balls: Option<i32>,
    pub strikes: Option<i32>,
    pub outs: Option<i32>,
    pub teams: Option<LinescoreTeams>,
    pub offense: Option<Offense>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinescoreTeams {
    pub home: Option<LinescoreTeam>,
    pub away: Option<LinescoreTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinescoreTeam {
    pub runs: Option<i32>,
}

/// Runner on each base, present only while the base is occupied.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Offense {
    pub first: Option<PersonRef>,
    pub second: Option<PersonRef>,
    pub third: Option<PersonRef>,
}

// ---------------------------------------------------------------------------
// Play records (shared by currentPlay and allPlays)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub result: Option<PlayResult>,
    pub about: Option<About>,
    pub count: Option<PlayCount>,
    pub matchup: Option<Matchup>,
    pub runners: Option<Vec<Runner>>,
    pub play_events: Option<Vec<PlayEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub event: Option<String>,
    pub description: Option<String>,
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub at_bat_index: Option<u32>,
    pub half_inning: Option<String>, // "top" | "bottom"
    pub inning: Option<i32>,
    pub is_complete: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlayCount {
    pub balls: Option<i32>,
    pub strikes: Option<i32>,
    pub outs: Option<i32>,
    pub pitches: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Matchup {
    pub batter: Option<PersonRef>,
    pub pitcher: Option<PersonRef>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: Option<u64>,
    pub full_name: Option<String>,
    pub season_stats: Option<PlayerStats>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Runner {
    pub movement: Option<Movement>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub start: Option<String>,
    pub end: Option<String>, // "1B" | "2B" | "3B" | "score" | null
    pub is_out: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    pub details: Option<EventDetails>,
    pub pitch_data: Option<PitchData>,
    pub is_pitch: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub pitch_type: Option<PitchType>,
    pub is_in_play: Option<bool>,
    pub is_strike: Option<bool>,
    pub is_ball: Option<bool>,
    pub is_foul: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PitchType {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PitchData {
    pub start_speed: Option<f64>,
}
