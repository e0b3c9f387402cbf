use crate::client::LoadError;
use crate::normalize::{LiveFeed, normalize_historical_play};
use crate::statsapi::Play;
use crate::{GameInfo, GameState};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    Loaded,
    Advancing,
    Exhausted,
}

/// A finished game's play log with a forward-only cursor.
///
/// Plays are kept in upstream array order, which is chronological. There is
/// no seek and no rewind: every `step` hands out the next play exactly once.
#[derive(Debug, Clone)]
pub struct ReplaySession {
    game_pk: u64,
    info: GameInfo,
    plays: Vec<Arc<Play>>,
    cursor: usize,
}

impl ReplaySession {
    /// Capture the play list and matchup metadata from a full feed document.
    pub fn from_feed(feed: LiveFeed) -> Result<Self, LoadError> {
        let info = feed.game_info().ok_or_else(|| {
            LoadError::IncompleteData(format!("game {}: team or venue metadata missing", feed.game_pk))
        })?;
        let game_pk = feed.game_pk;
        let plays = feed.plays.all_plays.ok_or_else(|| {
            LoadError::IncompleteData(format!("game {game_pk}: play list missing"))
        })?;

        Ok(Self {
            game_pk,
            info,
            plays: plays.into_iter().map(Arc::new).collect(),
            cursor: 0,
        })
    }

    pub fn game_pk(&self) -> u64 {
        self.game_pk
    }

    pub fn info(&self) -> &GameInfo {
        &self.info
    }

    pub fn total_plays(&self) -> usize {
        self.plays.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.plays.len() - self.cursor
    }

    pub fn phase(&self) -> ReplayPhase {
        if self.cursor >= self.plays.len() {
            ReplayPhase::Exhausted
        } else if self.cursor == 0 {
            ReplayPhase::Loaded
        } else {
            ReplayPhase::Advancing
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase() == ReplayPhase::Exhausted
    }

    /// Normalize the next play and advance. `None` means the replay is over;
    /// it keeps returning `None` from then on.
    pub fn step(&mut self) -> Option<GameState> {
        let play = self.plays.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(normalize_historical_play(play))
    }
}
