//! Mapping from Stats API documents to the canonical [`GameState`].
//!
//! Both the live feed and recorded plays go through here. Optional upstream
//! fields are resolved one at a time, each with its own default, so a missing
//! batter never costs us the score.

use crate::client::{FeedError, FeedResult};
use crate::statsapi::{
    Average, EventDetails, FeedResponse, GameData, Linescore, Offense, PersonRef, Play,
    PlayEvent, Player, Plays,
};
use crate::{
    Base, Batter, Count, FinalSummary, GameInfo, GameState, GameStatus, InningHalf, LastPitch,
    PitchResult, Pitcher, Score,
};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const UNKNOWN_BATTER: &str = "Unknown Batter";
pub const UNKNOWN_PITCHER: &str = "Unknown Pitcher";
pub const UNKNOWN_PITCH: &str = "Unknown";
pub const UNKNOWN_AVERAGE: &str = ".000";

const FINAL_PLAYS_KEPT: usize = 5;

/// A live feed document whose required sections have been checked.
#[derive(Debug, Clone)]
pub struct LiveFeed {
    pub game_pk: u64,
    pub game_data: GameData,
    pub linescore: Linescore,
    pub plays: Plays,
}

impl LiveFeed {
    /// Parse-and-validate step. `gameData`, `liveData` and the linescore are
    /// required; everything else may be missing.
    pub fn validate(game_pk: u64, raw: FeedResponse) -> FeedResult<Self> {
        let game_data = raw
            .game_data
            .ok_or_else(|| FeedError::Malformed(format!("game {game_pk}: missing gameData")))?;
        let live_data = raw
            .live_data
            .ok_or_else(|| FeedError::Malformed(format!("game {game_pk}: missing liveData")))?;
        let linescore = live_data.linescore.ok_or_else(|| {
            FeedError::Malformed(format!("game {game_pk}: missing liveData.linescore"))
        })?;

        Ok(Self {
            game_pk: raw.game_pk.unwrap_or(game_pk),
            game_data,
            linescore,
            plays: live_data.plays.unwrap_or_default(),
        })
    }

    pub fn status(&self) -> GameStatus {
        parse_status(
            self.game_data
                .status
                .as_ref()
                .and_then(|s| s.abstract_game_state.as_deref()),
        )
    }

    /// Team and venue names; `None` when any of them is absent.
    pub fn game_info(&self) -> Option<GameInfo> {
        let teams = self.game_data.teams.as_ref()?;
        Some(GameInfo {
            home_team: teams.home.as_ref()?.name.clone()?,
            away_team: teams.away.as_ref()?.name.clone()?,
            venue: self.game_data.venue.as_ref()?.name.clone()?,
        })
    }

    pub fn all_plays(&self) -> Option<&[Play]> {
        self.plays.all_plays.as_deref()
    }

    pub fn final_summary(&self) -> FinalSummary {
        let teams = self.game_data.teams.as_ref();
        let home_team = teams
            .and_then(|t| t.home.as_ref())
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| "Home".to_owned());
        let away_team = teams
            .and_then(|t| t.away.as_ref())
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| "Away".to_owned());

        let plays = self.all_plays().unwrap_or_default();
        let final_plays = plays
            .iter()
            .skip(plays.len().saturating_sub(FINAL_PLAYS_KEPT))
            .filter_map(|p| p.result.as_ref().and_then(|r| r.description.clone()))
            .collect();

        FinalSummary {
            home_team,
            away_team,
            score: linescore_score(&self.linescore),
            total_plays: plays.len(),
            final_plays,
        }
    }
}

pub fn parse_status(raw: Option<&str>) -> GameStatus {
    match raw {
        Some("Live") => GameStatus::Live,
        Some("Final") => GameStatus::Final,
        _ => GameStatus::Preview,
    }
}

// ---------------------------------------------------------------------------
// Live feed
// ---------------------------------------------------------------------------

pub fn normalize_live(feed: &LiveFeed) -> GameState {
    let linescore = &feed.linescore;
    let current = feed.plays.current_play.as_ref();
    let play_count = current.and_then(|p| p.count.as_ref());

    // The current play's count is fresher than the linescore between pitches.
    let balls = play_count.and_then(|c| c.balls).or(linescore.balls);
    let strikes = play_count.and_then(|c| c.strikes).or(linescore.strikes);

    GameState {
        inning: clamp_inning(linescore.current_inning),
        inning_half: InningHalf::parse(linescore.inning_half.as_deref()),
        count: Count::clamped(balls, strikes, linescore.outs),
        base_runners: live_runners(linescore.offense.as_ref()),
        score: linescore_score(linescore),
        batter: current.and_then(|p| live_batter(&feed.game_data, p)),
        pitcher: current.and_then(|p| live_pitcher(&feed.game_data, p)),
        last_pitch: current.and_then(last_pitch),
        raw_play: current.cloned().map(Arc::new),
    }
}

fn linescore_score(linescore: &Linescore) -> Score {
    let teams = linescore.teams.as_ref();
    Score::clamped(
        teams.and_then(|t| t.home.as_ref()).and_then(|t| t.runs),
        teams.and_then(|t| t.away.as_ref()).and_then(|t| t.runs),
    )
}

fn live_runners(offense: Option<&Offense>) -> BTreeSet<Base> {
    let mut runners = BTreeSet::new();
    let Some(offense) = offense else {
        return runners;
    };
    for (base, runner) in [
        (Base::First, &offense.first),
        (Base::Second, &offense.second),
        (Base::Third, &offense.third),
    ] {
        if runner.is_some() {
            runners.insert(base);
        }
    }
    runners
}

fn lookup_player<'a>(game_data: &'a GameData, person: &PersonRef) -> Option<&'a Player> {
    let id = person.id?;
    game_data.players.as_ref()?.get(&format!("ID{id}"))
}

fn live_batter(game_data: &GameData, play: &Play) -> Option<Batter> {
    let person = play.matchup.as_ref()?.batter.as_ref()?;
    let player = lookup_player(game_data, person);

    let name = player
        .and_then(|p| p.full_name.clone())
        .or_else(|| person.full_name.clone())
        .unwrap_or_else(|| UNKNOWN_BATTER.to_owned());
    let average = player
        .and_then(|p| p.stats.as_ref())
        .or(person.season_stats.as_ref())
        .and_then(|s| s.batting.as_ref())
        .and_then(|b| b.avg.as_ref())
        .and_then(format_average)
        .unwrap_or_else(|| UNKNOWN_AVERAGE.to_owned());

    Some(Batter { name, average })
}

fn live_pitcher(game_data: &GameData, play: &Play) -> Option<Pitcher> {
    let person = play.matchup.as_ref()?.pitcher.as_ref()?;
    let player = lookup_player(game_data, person);

    let name = player
        .and_then(|p| p.full_name.clone())
        .or_else(|| person.full_name.clone())
        .unwrap_or_else(|| UNKNOWN_PITCHER.to_owned());
    let strikeouts = player
        .and_then(|p| p.stats.as_ref())
        .or(person.season_stats.as_ref())
        .and_then(|s| s.pitching.as_ref())
        .and_then(|p| p.strike_outs);

    Some(Pitcher {
        name,
        pitch_count: non_negative(play.count.as_ref().and_then(|c| c.pitches)),
        strikeouts: non_negative(strikeouts),
    })
}

// ---------------------------------------------------------------------------
// Recorded plays
// ---------------------------------------------------------------------------

/// Normalize one recorded play. Base occupancy comes only from this play's
/// runner movements; nothing carries over from earlier plays.
pub fn normalize_historical_play(play: impl Into<Arc<Play>>) -> GameState {
    let play = play.into();
    let about = play.about.as_ref();
    let count = play.count.as_ref();
    let result = play.result.as_ref();

    GameState {
        inning: clamp_inning(about.and_then(|a| a.inning)),
        inning_half: InningHalf::parse(about.and_then(|a| a.half_inning.as_deref())),
        count: Count::clamped(
            count.and_then(|c| c.balls),
            count.and_then(|c| c.strikes),
            count.and_then(|c| c.outs),
        ),
        base_runners: play_runners(&play),
        score: Score::clamped(
            result.and_then(|r| r.home_score),
            result.and_then(|r| r.away_score),
        ),
        batter: play_batter(&play),
        pitcher: play_pitcher(&play),
        last_pitch: last_pitch(&play),
        raw_play: Some(play),
    }
}

fn play_runners(play: &Play) -> BTreeSet<Base> {
    play.runners
        .iter()
        .flatten()
        .filter_map(|r| r.movement.as_ref()?.end.as_deref())
        .filter_map(Base::from_code)
        .collect()
}

fn play_batter(play: &Play) -> Option<Batter> {
    let person = play.matchup.as_ref()?.batter.as_ref()?;
    Some(Batter {
        name: person
            .full_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_BATTER.to_owned()),
        average: person
            .season_stats
            .as_ref()
            .and_then(|s| s.batting.as_ref())
            .and_then(|b| b.avg.as_ref())
            .and_then(format_average)
            .unwrap_or_else(|| UNKNOWN_AVERAGE.to_owned()),
    })
}

fn play_pitcher(play: &Play) -> Option<Pitcher> {
    let person = play.matchup.as_ref()?.pitcher.as_ref()?;
    Some(Pitcher {
        name: person
            .full_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_PITCHER.to_owned()),
        pitch_count: non_negative(play.count.as_ref().and_then(|c| c.pitches)),
        strikeouts: non_negative(
            person
                .season_stats
                .as_ref()
                .and_then(|s| s.pitching.as_ref())
                .and_then(|p| p.strike_outs),
        ),
    })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// The last pitch thrown in a play. Falls back to the last event when upstream
/// does not flag pitches.
fn last_pitch(play: &Play) -> Option<LastPitch> {
    let events = play.play_events.as_deref()?;
    let event: &PlayEvent = events
        .iter()
        .rev()
        .find(|e| e.is_pitch == Some(true))
        .or_else(|| events.last())?;
    let details = event.details.as_ref();

    let speed_mph = event
        .pitch_data
        .as_ref()
        .and_then(|p| p.start_speed)
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(0.0);

    Some(LastPitch {
        pitch_type: details
            .and_then(|d| d.pitch_type.as_ref())
            .and_then(|t| t.description.clone())
            .unwrap_or_else(|| UNKNOWN_PITCH.to_owned()),
        speed_mph,
        result: classify_pitch(details),
        description: details
            .and_then(|d| d.description.clone())
            .unwrap_or_default(),
    })
}

/// Order matters: a ball put in play is also flagged as a strike upstream.
pub fn classify_pitch(details: Option<&EventDetails>) -> PitchResult {
    let Some(d) = details else {
        return PitchResult::Unknown;
    };
    let flag = |v: Option<bool>| v.unwrap_or(false);

    if flag(d.is_in_play) {
        PitchResult::InPlay
    } else if flag(d.is_ball) {
        PitchResult::Ball
    } else if flag(d.is_strike) {
        if flag(d.is_foul) {
            PitchResult::Foul
        } else {
            PitchResult::Strike
        }
    } else {
        PitchResult::Unknown
    }
}

/// ".287" style. Values outside 0..=1 are pinned.
pub fn format_average(avg: &Average) -> Option<String> {
    let value = match avg {
        Average::Number(n) => *n,
        Average::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    if !value.is_finite() {
        return None;
    }
    let formatted = format!("{:.3}", value.clamp(0.0, 1.0));
    Some(match formatted.strip_prefix('0') {
        Some(rest) => rest.to_owned(),
        None => formatted,
    })
}

fn clamp_inning(raw: Option<i32>) -> u8 {
    raw.unwrap_or(1).clamp(1, i32::from(u8::MAX)) as u8
}

fn non_negative(raw: Option<i64>) -> u32 {
    raw.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}
