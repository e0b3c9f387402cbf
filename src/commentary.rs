//! Turns a normalized game state into one line of play-by-play chatter.
//!
//! Everything here is pure and deterministic: the same state and mode always
//! produce the same text. The mode picks the voice; the facts (score, inning,
//! count, runners, matchup, last pitch) are the same in every voice.

use mlb_api::{Base, FinalSummary, GameInfo, GameState, InningHalf, LastPitch, PitchResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonalityMode {
    #[default]
    Casual,
    Stats,
    History,
}

impl PersonalityMode {
    pub const ALL: [PersonalityMode; 3] = [
        PersonalityMode::Casual,
        PersonalityMode::Stats,
        PersonalityMode::History,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PersonalityMode::Casual => "casual",
            PersonalityMode::Stats => "stats",
            PersonalityMode::History => "history",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonalityMode::Casual => "Casual Fan",
            PersonalityMode::Stats => "Stats Nerd",
            PersonalityMode::History => "History Buff",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PersonalityMode::Casual => "Easy-going, fun explanations",
            PersonalityMode::Stats => "Deep dive into numbers",
            PersonalityMode::History => "Historical context and stories",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|m| m.id().eq_ignore_ascii_case(id))
    }

    pub fn next(self) -> Self {
        match self {
            PersonalityMode::Casual => PersonalityMode::Stats,
            PersonalityMode::Stats => PersonalityMode::History,
            PersonalityMode::History => PersonalityMode::Casual,
        }
    }
}

/// One utterance for the current state. `None` means the game has not started
/// (or nothing has been loaded yet).
pub fn generate(state: Option<&GameState>, mode: PersonalityMode) -> String {
    let Some(state) = state else {
        return pregame(mode).to_string();
    };
    let facts = Facts::from_state(state);

    match mode {
        PersonalityMode::Casual => {
            let mut sentences = vec![format!("We're in the {}, {}.", facts.inning, facts.score)];
            sentences.extend(facts.matchup_casual());
            sentences.push(format!("The count is {}, {}.", facts.count, facts.outs));
            sentences.push(format!("{}.", capitalize(&facts.runners)));
            if let Some(pitch) = &facts.pitch {
                sentences.push(format!("That last one: {pitch}."));
            }
            sentences.join(" ")
        }
        PersonalityMode::Stats => {
            let mut parts = vec![
                facts.inning.clone(),
                facts.score.clone(),
                format!("count {}, {}", facts.count, facts.outs),
                facts.runners.clone(),
            ];
            if let Some((name, avg)) = &facts.batter {
                parts.push(format!("{name} hitting {avg}"));
            }
            if let Some((name, line)) = &facts.pitcher {
                parts.push(format!("{name} {line}"));
            }
            if let Some(pitch) = &facts.pitch {
                parts.push(format!("last pitch {pitch}"));
            }
            parts.join(" | ")
        }
        PersonalityMode::History => {
            let mut sentences = vec![format!("The {} finds us {}.", facts.inning, facts.score)];
            sentences.extend(facts.matchup_history());
            sentences.push(format!(
                "With {} and {}, {}.",
                facts.runners,
                facts.outs,
                history_aside(state)
            ));
            sentences.push(format!("The count stands {}.", facts.count));
            if let Some(pitch) = &facts.pitch {
                sentences.push(format!("Last pitch: {pitch}."));
            }
            sentences.join(" ")
        }
    }
}

/// Greeting when a finished game is loaded for replay.
pub fn welcome(info: &GameInfo, mode: PersonalityMode) -> String {
    let greeting = format!(
        "Welcome to {} vs {} at {}!",
        info.away_team, info.home_team, info.venue
    );
    match mode {
        PersonalityMode::Casual => format!("{greeting} Grab a snack, we're replaying this one."),
        PersonalityMode::Stats => format!("{greeting} Every plate appearance, in order."),
        PersonalityMode::History => {
            format!("{greeting} Let's revisit this one as it happened.")
        }
    }
}

/// Closing line once a game is over.
pub fn final_call(summary: &FinalSummary, mode: PersonalityMode) -> String {
    let score = format!(
        "{} {}, {} {}",
        summary.away_team, summary.score.away, summary.home_team, summary.score.home
    );
    match mode {
        PersonalityMode::Casual => format!("That's the ballgame! Final: {score}."),
        PersonalityMode::Stats => format!(
            "Final: {score} | {} plays recorded",
            summary.total_plays
        ),
        PersonalityMode::History => {
            format!("And that one goes into the books. Final: {score}.")
        }
    }
}

fn pregame(mode: PersonalityMode) -> &'static str {
    match mode {
        PersonalityMode::Casual => "Waiting for first pitch. Pick a game and hit play!",
        PersonalityMode::Stats => "No data yet. Numbers start flowing at first pitch.",
        PersonalityMode::History => {
            "Before every game there is a quiet moment. This is it. Pick a game to begin."
        }
    }
}

/// The shared facts every voice reports.
struct Facts {
    inning: String,
    score: String,
    count: String,
    outs: String,
    runners: String,
    /// Name and batting average.
    batter: Option<(String, String)>,
    /// Name and "N pitches, K K".
    pitcher: Option<(String, String)>,
    pitch: Option<String>,
}

impl Facts {
    fn from_state(state: &GameState) -> Self {
        Self {
            inning: inning_phrase(state.inning_half, state.inning),
            score: score_phrase(state),
            count: format!("{}-{}", state.count.balls, state.count.strikes),
            outs: outs_phrase(state.count.outs),
            runners: runners_phrase(state),
            batter: state.batter.as_ref().map(|b| (b.name.clone(), b.average.clone())),
            pitcher: state.pitcher.as_ref().map(|p| {
                (p.name.clone(), format!("{} pitches, {} K", p.pitch_count, p.strikeouts))
            }),
            pitch: state.last_pitch.as_ref().map(pitch_phrase),
        }
    }

    fn matchup_casual(&self) -> Option<String> {
        match (&self.batter, &self.pitcher) {
            (Some((b, avg)), Some((p, line))) => {
                Some(format!("{b} ({avg}) steps in against {p} ({line})."))
            }
            (Some((b, avg)), None) => Some(format!("{b} ({avg}) is at the plate.")),
            (None, Some((p, line))) => Some(format!("{p} ({line}) is on the mound.")),
            (None, None) => None,
        }
    }

    fn matchup_history(&self) -> Option<String> {
        match (&self.batter, &self.pitcher) {
            (Some((b, avg)), Some((p, line))) => Some(format!(
                "{b}, hitting {avg}, digs in against {p}, {line} on the day."
            )),
            (Some((b, avg)), None) => Some(format!("{b}, hitting {avg}, digs in.")),
            (None, Some((p, line))) => Some(format!("{p} toes the rubber, {line} on the day.")),
            (None, None) => None,
        }
    }
}

fn inning_phrase(half: InningHalf, inning: u8) -> String {
    format!("{} of the {}", half.label(), ordinal(inning))
}

fn score_phrase(state: &GameState) -> String {
    let (home, away) = (state.score.home, state.score.away);
    match home.cmp(&away) {
        std::cmp::Ordering::Equal => format!("tied {away}-{home}"),
        std::cmp::Ordering::Greater => format!("home team up {home}-{away}"),
        std::cmp::Ordering::Less => format!("visitors up {away}-{home}"),
    }
}

fn outs_phrase(outs: u8) -> String {
    match outs {
        0 => "nobody out".to_string(),
        1 => "1 out".to_string(),
        n => format!("{n} outs"),
    }
}

fn runners_phrase(state: &GameState) -> String {
    let on: Vec<&str> = Base::ALL
        .iter()
        .filter(|b| state.is_occupied(**b))
        .map(|b| b.label())
        .collect();
    match on.as_slice() {
        [] => "bases empty".to_string(),
        [one] => format!("a runner on {one}"),
        [a, b] => format!("runners on {a} and {b}"),
        _ => "bases loaded".to_string(),
    }
}

fn pitch_phrase(pitch: &LastPitch) -> String {
    let result = match pitch.result {
        PitchResult::Unknown => String::new(),
        other => format!(", {}", other.label()),
    };
    if pitch.speed_mph > 0.0 {
        format!("{} at {:.1} mph{result}", pitch.pitch_type, pitch.speed_mph)
    } else {
        format!("{}{result}", pitch.pitch_type)
    }
}

fn history_aside(state: &GameState) -> &'static str {
    let late = state.inning >= 7;
    let close = state.score.home.abs_diff(state.score.away) <= 1;
    match (late, close) {
        (true, true) => "this is the stuff October memories are made of",
        (true, false) => "the late innings have a way of rewriting stories",
        (false, true) => "every run in a tight one echoes through the box score",
        (false, false) => "plenty of baseball left to write this chapter",
    }
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlb_api::{Batter, Count, Pitcher, Score};
    use std::collections::BTreeSet;

    fn sample_state() -> GameState {
        GameState {
            inning: 7,
            inning_half: InningHalf::Bottom,
            count: Count { balls: 2, strikes: 1, outs: 1 },
            base_runners: BTreeSet::from([Base::First, Base::Third]),
            score: Score { home: 3, away: 4 },
            batter: Some(Batter { name: "Mookie Betts".into(), average: ".289".into() }),
            pitcher: Some(Pitcher { name: "Logan Webb".into(), pitch_count: 92, strikeouts: 6 }),
            last_pitch: Some(LastPitch {
                pitch_type: "Sinker".into(),
                speed_mph: 92.7,
                result: PitchResult::Ball,
                description: "Ball".into(),
            }),
            raw_play: None,
        }
    }

    #[test]
    fn pregame_state_never_panics() {
        for mode in PersonalityMode::ALL {
            assert!(!generate(None, mode).is_empty());
        }
    }

    #[test]
    fn every_mode_reports_the_same_facts() {
        let state = sample_state();
        for mode in PersonalityMode::ALL {
            let line = generate(Some(&state), mode);
            assert!(line.contains("bottom of the 7th"), "{mode:?}: {line}");
            assert!(line.contains("4-3"), "{mode:?}: {line}");
            assert!(line.contains("2-1"), "{mode:?}: {line}");
            assert!(line.contains("1 out"), "{mode:?}: {line}");
            assert!(line.contains("first and third"), "{mode:?}: {line}");
            assert!(line.contains("Mookie Betts"), "{mode:?}: {line}");
            assert!(line.contains("Logan Webb"), "{mode:?}: {line}");
            assert!(line.contains(".289"), "{mode:?}: {line}");
            assert!(line.contains("92 pitches, 6 K"), "{mode:?}: {line}");
            assert!(line.contains("Sinker at 92.7 mph, ball"), "{mode:?}: {line}");
        }
    }

    #[test]
    fn modes_change_the_voice() {
        let state = sample_state();
        let casual = generate(Some(&state), PersonalityMode::Casual);
        let stats = generate(Some(&state), PersonalityMode::Stats);
        let history = generate(Some(&state), PersonalityMode::History);
        assert_ne!(casual, stats);
        assert_ne!(stats, history);
        assert!(stats.contains(".289"));
        assert!(stats.contains("92 pitches, 6 K"));
    }

    #[test]
    fn output_is_deterministic() {
        let state = sample_state();
        for mode in PersonalityMode::ALL {
            assert_eq!(generate(Some(&state), mode), generate(Some(&state), mode));
        }
    }

    #[test]
    fn sparse_state_still_reads() {
        let line = generate(Some(&GameState::default()), PersonalityMode::Casual);
        assert_eq!(
            line,
            "We're in the top of the 1st, tied 0-0. The count is 0-0, nobody out. Bases empty."
        );
        for mode in PersonalityMode::ALL {
            let line = generate(Some(&GameState::default()), mode);
            assert!(!line.contains("  "), "{mode:?}: {line}");
        }
    }

    #[test]
    fn runner_phrases_cover_every_shape() {
        let mut state = GameState::default();
        assert_eq!(runners_phrase(&state), "bases empty");
        state.base_runners.insert(Base::Second);
        assert_eq!(runners_phrase(&state), "a runner on second");
        state.base_runners.insert(Base::First);
        state.base_runners.insert(Base::Third);
        assert_eq!(runners_phrase(&state), "bases loaded");
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(21), "21st");
    }

    #[test]
    fn welcome_and_final_lines_name_both_teams() {
        let info = GameInfo {
            home_team: "Chicago Cubs".into(),
            away_team: "St. Louis Cardinals".into(),
            venue: "Wrigley Field".into(),
        };
        assert!(
            welcome(&info, PersonalityMode::Casual)
                .starts_with("Welcome to St. Louis Cardinals vs Chicago Cubs at Wrigley Field!")
        );

        let summary = FinalSummary {
            home_team: "Chicago Cubs".into(),
            away_team: "St. Louis Cardinals".into(),
            score: Score { home: 5, away: 2 },
            total_plays: 74,
            final_plays: vec![],
        };
        for mode in PersonalityMode::ALL {
            let line = final_call(&summary, mode);
            assert!(line.contains("St. Louis Cardinals 2, Chicago Cubs 5"), "{line}");
        }
    }

    #[test]
    fn mode_ids_round_trip_and_cycle() {
        for mode in PersonalityMode::ALL {
            assert_eq!(PersonalityMode::from_id(mode.id()), Some(mode));
        }
        assert_eq!(PersonalityMode::from_id("STATS"), Some(PersonalityMode::Stats));
        assert_eq!(PersonalityMode::from_id("grumpy"), None);
        assert_eq!(PersonalityMode::History.next(), PersonalityMode::Casual);
    }
}
