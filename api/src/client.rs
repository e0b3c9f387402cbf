use crate::normalize::{LiveFeed, parse_status};
use crate::replay::ReplaySession;
use crate::statsapi::{FeedResponse, ScheduleGame, ScheduleResponse, ScheduleTeam};
use crate::{FinalSummary, GameSummary, GameType, TeamLine};
use chrono::{Datelike, NaiveDate, Utc};
use log::{debug, warn};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type FeedResult<T> = Result<T, FeedError>;

pub const STATSAPI_BASE: &str = "https://statsapi.mlb.com";
const SPORT_ID_MLB: u32 = 1;

/// MLB Stats API client. Read-only: schedule by date and live feed by game.
#[derive(Debug, Clone)]
pub struct MlbApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for MlbApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("ballbuddy/0.1 (terminal baseball companion)")
                .build()
                .unwrap_or_default(),
            base_url: STATSAPI_BASE.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum FeedError {
    Network(reqwest::Error, String),
    Timeout(String),
    Api(reqwest::Error, String),
    Malformed(String),
}

/// Coarse split used by callers: retry on the next tick, or report the feed as broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    Network,
    Malformed,
}

impl FeedError {
    pub fn kind(&self) -> FeedErrorKind {
        match self {
            FeedError::Network(..) | FeedError::Timeout(_) | FeedError::Api(..) => {
                FeedErrorKind::Network
            }
            FeedError::Malformed(_) => FeedErrorKind::Malformed,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == FeedErrorKind::Network
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            FeedError::Timeout(url) => write!(f, "Timed out waiting for {url}"),
            FeedError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            FeedError::Malformed(msg) => write!(f, "Malformed feed: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

/// Why a finished game could not be loaded for replay.
#[derive(Debug)]
pub enum LoadError {
    IncompleteData(String),
    Feed(FeedError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::IncompleteData(msg) => write!(f, "Incomplete game data: {msg}"),
            LoadError::Feed(e) => write!(f, "Could not load game: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<FeedError> for LoadError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Malformed(msg) => LoadError::IncompleteData(msg),
            other => LoadError::Feed(other),
        }
    }
}

impl MlbApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another host (tests, proxies). Trailing slashes are dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Games scheduled on `date`. Failures are logged and produce an empty list.
    pub async fn fetch_schedule(
        &self,
        date: NaiveDate,
        season: i32,
        game_type: GameType,
    ) -> Vec<GameSummary> {
        let url = format!(
            "{}/api/v1/schedule?sportId={SPORT_ID_MLB}&date={}&season={season}&gameType={}&hydrate=team",
            self.base_url,
            date.format("%m/%d/%Y"),
            game_type.code(),
        );
        match self.get::<ScheduleResponse>(&url).await {
            Ok(raw) => map_schedule_first_date(raw),
            Err(e) => {
                warn!("schedule unavailable: {e}");
                Vec::new()
            }
        }
    }

    /// Every game in a calendar month, across all dates. Soft-fails like `fetch_schedule`.
    pub async fn fetch_month_schedule(
        &self,
        year: i32,
        month: u32,
        game_type: GameType,
    ) -> Vec<GameSummary> {
        let url = format!(
            "{base}/api/v1/schedule?sportId={SPORT_ID_MLB}&season={year}&gameType={code}&startDate={year}-{month:02}-01&endDate={year}-{month:02}-31&hydrate=team,venue",
            base = self.base_url,
            code = game_type.code(),
        );
        match self.get::<ScheduleResponse>(&url).await {
            Ok(raw) => raw
                .dates
                .unwrap_or_default()
                .into_iter()
                .flat_map(|d| d.games.unwrap_or_default())
                .map(|g| map_schedule_game(&g))
                .collect(),
            Err(e) => {
                warn!("month schedule unavailable: {e}");
                Vec::new()
            }
        }
    }

    /// Full live feed for one game, validated.
    pub async fn fetch_game_feed(&self, game_pk: u64) -> FeedResult<LiveFeed> {
        let url = format!("{}/api/v1.1/game/{game_pk}/feed/live", self.base_url);
        let raw: FeedResponse = self.get(&url).await?;
        LiveFeed::validate(game_pk, raw)
    }

    /// One-shot wrap-up for a game that has ended.
    pub async fn fetch_final_summary(&self, game_pk: u64) -> FeedResult<FinalSummary> {
        Ok(self.fetch_game_feed(game_pk).await?.final_summary())
    }

    /// Fetch a finished game once and capture its play log for replay.
    pub async fn load_replay(&self, game_pk: u64) -> Result<ReplaySession, LoadError> {
        let feed = self.fetch_game_feed(game_pk).await?;
        let session = ReplaySession::from_feed(feed)?;
        debug!("game {game_pk} loaded for replay: {} plays", session.total_plays());
        Ok(session)
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> FeedResult<T> {
        // The request timeout covers most stalls; the outer guard covers a body
        // that trickles in forever.
        match tokio::time::timeout(self.timeout, self.send::<T>(url)).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout(url.to_owned())),
        }
    }

    async fn send<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> FeedResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, url))?;

        match response.error_for_status() {
            Ok(res) => res.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    FeedError::Timeout(url.to_owned())
                } else {
                    FeedError::Malformed(format!("{url}: {e}"))
                }
            }),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(FeedError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

fn transport_error(e: reqwest::Error, url: &str) -> FeedError {
    if e.is_timeout() {
        FeedError::Timeout(url.to_owned())
    } else {
        FeedError::Network(e, url.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Mapping: Stats API schedule → clean domain types
// ---------------------------------------------------------------------------

/// Upstream returns one date bucket per requested day; only the first is used.
fn map_schedule_first_date(raw: ScheduleResponse) -> Vec<GameSummary> {
    raw.dates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|d| d.games)
        .unwrap_or_default()
        .iter()
        .map(map_schedule_game)
        .collect()
}

fn map_schedule_game(game: &ScheduleGame) -> GameSummary {
    let status = game.status.as_ref();
    let teams = game.teams.as_ref();

    let start_time = game
        .game_date
        .as_deref()
        .and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc));

    GameSummary {
        id: game.game_pk.unwrap_or_default(),
        status: parse_status(status.and_then(|s| s.abstract_game_state.as_deref())),
        detailed_state: status
            .and_then(|s| s.detailed_state.clone())
            .unwrap_or_default(),
        home_team: map_team(teams.and_then(|t| t.home.as_ref())),
        away_team: map_team(teams.and_then(|t| t.away.as_ref())),
        start_time,
        venue: game
            .venue
            .as_ref()
            .and_then(|v| v.name.clone())
            .unwrap_or_default(),
        game_type: game.game_type.clone().unwrap_or_default(),
        description: game.description.clone().unwrap_or_default(),
        is_featured: game.is_featured_game.unwrap_or(false),
    }
}

fn map_team(team: Option<&ScheduleTeam>) -> TeamLine {
    let Some(team) = team else {
        return TeamLine {
            name: "TBD".into(),
            ..TeamLine::default()
        };
    };
    TeamLine {
        name: team
            .team
            .as_ref()
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| "TBD".into()),
        score: team.score.unwrap_or(0).clamp(0, i32::from(u16::MAX)) as u16,
        record: team
            .league_record
            .as_ref()
            .and_then(|r| Some(format!("{}-{}", r.wins?, r.losses?))),
    }
}

/// Season a date belongs to. MLB seasons are calendar years.
pub fn season_for(date: NaiveDate) -> i32 {
    date.year()
}
