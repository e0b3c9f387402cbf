use crate::state::messages::{TrackerCommand, TrackerEvent};
use log::{debug, info, warn};
use mlb_api::client::{FeedResult, LoadError, MlbApi};
use mlb_api::normalize::{LiveFeed, normalize_live};
use mlb_api::replay::ReplaySession;
use mlb_api::{FinalSummary, GameState};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, interval};

pub const REPLAY_STEP: Duration = Duration::from_secs(10);
pub const LIVE_POLL: Duration = Duration::from_secs(20);

/// How often the tracker ticks for each kind of session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub replay: Duration,
    pub live: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self { replay: REPLAY_STEP, live: LIVE_POLL }
    }
}

// ---------------------------------------------------------------------------
// Change detection
// ---------------------------------------------------------------------------

/// Remembers the last state handed to the UI for a live game.
#[derive(Debug)]
pub struct PollingSession {
    game_pk: u64,
    last_observed: Option<GameState>,
}

impl PollingSession {
    pub fn new(game_pk: u64) -> Self {
        Self { game_pk, last_observed: None }
    }

    pub fn game_pk(&self) -> u64 {
        self.game_pk
    }

    /// Returns the state when it differs from the last one observed, `None`
    /// when nothing changed.
    pub fn observe(&mut self, state: GameState) -> Option<GameState> {
        if self.last_observed.as_ref() == Some(&state) {
            return None;
        }
        self.last_observed = Some(state.clone());
        Some(state)
    }

    pub fn last_observed(&self) -> Option<&GameState> {
        self.last_observed.as_ref()
    }
}

#[derive(Debug)]
enum Session {
    Replay(ReplaySession),
    Polling(PollingSession),
}

impl Session {
    fn game_pk(&self) -> u64 {
        match self {
            Session::Replay(replay) => replay.game_pk(),
            Session::Polling(polling) => polling.game_pk(),
        }
    }

    fn period(&self, cadence: &Cadence) -> Duration {
        match self {
            Session::Replay(_) => cadence.replay,
            Session::Polling(_) => cadence.live,
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// The single repeating timer plus the reentrancy guard for fetches.
///
/// `generation` identifies the current tracking run. It moves forward on every
/// cancel, so a fetch that completes after a stop or a game switch can be
/// recognised as stale and dropped.
#[derive(Debug, Default)]
pub struct Scheduler {
    ticker: Option<Interval>,
    in_flight: bool,
    generation: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arm the timer. The first tick fires immediately.
    pub fn start(&mut self, period: Duration) {
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
    }

    /// Clear the timer only. A fetch already in flight may still report back.
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Clear the timer and invalidate anything in flight.
    pub fn cancel(&mut self) {
        self.stop();
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves on the next tick; never resolves while stopped.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Claim the fetch slot. `None` when a fetch is already running.
    pub fn try_begin_fetch(&mut self) -> Option<u64> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(self.generation)
    }

    /// Release the fetch slot. Returns false when the result belongs to a
    /// cancelled run and must be ignored.
    pub fn finish_fetch(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        true
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum FetchJob {
    Open,
    Poll,
    Summary,
}

#[derive(Debug)]
enum FetchOutcome {
    Opened { generation: u64, game_pk: u64, result: FeedResult<LiveFeed> },
    Polled { generation: u64, game_pk: u64, result: FeedResult<LiveFeed> },
    Summary { generation: u64, game_pk: u64, result: FeedResult<FinalSummary> },
}

impl FetchOutcome {
    fn generation(&self) -> u64 {
        match self {
            FetchOutcome::Opened { generation, .. }
            | FetchOutcome::Polled { generation, .. }
            | FetchOutcome::Summary { generation, .. } => *generation,
        }
    }
}

/// Owns the selected game, the timer and the fetches. Driven by
/// `TrackerCommand`s from the UI, reports back with `TrackerEvent`s.
pub struct TrackerWorker {
    api: MlbApi,
    cadence: Cadence,
    commands: mpsc::Receiver<TrackerCommand>,
    events: mpsc::Sender<TrackerEvent>,
    session: Option<Session>,
    scheduler: Scheduler,
    done_tx: mpsc::Sender<FetchOutcome>,
    done_rx: mpsc::Receiver<FetchOutcome>,
    fetch_task: Option<JoinHandle<()>>,
}

impl TrackerWorker {
    pub fn new(
        api: MlbApi,
        cadence: Cadence,
        commands: mpsc::Receiver<TrackerCommand>,
        events: mpsc::Sender<TrackerEvent>,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::channel(8);
        Self {
            api,
            cadence,
            commands,
            events,
            session: None,
            scheduler: Scheduler::new(),
            done_tx,
            done_rx,
            fetch_task: None,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle_command(command).await;
                }
                Some(outcome) = self.done_rx.recv() => {
                    self.handle_outcome(outcome).await;
                }
                _ = self.scheduler.tick() => {
                    self.on_tick().await;
                }
            }
        }
        self.reset();
        debug!("tracker worker shut down");
    }

    async fn handle_command(&mut self, command: TrackerCommand) {
        match command {
            TrackerCommand::Select { game_pk } => {
                self.reset();
                info!("opening game {game_pk}");
                self.spawn_fetch(game_pk, FetchJob::Open);
            }
            TrackerCommand::Play => {
                let Some(session) = &self.session else {
                    self.emit(TrackerEvent::Status {
                        game_pk: None,
                        message: "Select a game first.".to_string(),
                    })
                    .await;
                    return;
                };
                if !self.scheduler.is_running() {
                    let period = session.period(&self.cadence);
                    debug!("tracking game {} every {period:?}", session.game_pk());
                    self.scheduler.start(period);
                }
            }
            TrackerCommand::Pause => {
                self.scheduler.cancel();
                self.abort_fetch();
            }
            TrackerCommand::Stop => {
                self.reset();
                self.emit(TrackerEvent::Stopped).await;
            }
        }
    }

    async fn on_tick(&mut self) {
        match self.session.as_mut() {
            Some(Session::Replay(replay)) => {
                let game_pk = replay.game_pk();
                if let Some(state) = replay.step() {
                    self.emit(TrackerEvent::State { game_pk, state }).await;
                    return;
                }
                info!("replay of game {game_pk} finished");
                self.scheduler.stop();
                self.session = None;
                self.emit(TrackerEvent::ReplayFinished { game_pk }).await;
                self.spawn_fetch(game_pk, FetchJob::Summary);
            }
            Some(Session::Polling(polling)) => {
                let game_pk = polling.game_pk();
                self.spawn_fetch(game_pk, FetchJob::Poll);
            }
            None => self.scheduler.stop(),
        }
    }

    fn spawn_fetch(&mut self, game_pk: u64, job: FetchJob) {
        let Some(generation) = self.scheduler.try_begin_fetch() else {
            debug!("skipping {job:?} for game {game_pk}: previous fetch still in flight");
            return;
        };

        let api = self.api.clone();
        let done = self.done_tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let outcome = match job {
                FetchJob::Open => FetchOutcome::Opened {
                    generation,
                    game_pk,
                    result: api.fetch_game_feed(game_pk).await,
                },
                FetchJob::Poll => FetchOutcome::Polled {
                    generation,
                    game_pk,
                    result: api.fetch_game_feed(game_pk).await,
                },
                FetchJob::Summary => FetchOutcome::Summary {
                    generation,
                    game_pk,
                    result: api.fetch_final_summary(game_pk).await,
                },
            };
            let _ = done.send(outcome).await;
        }));
    }

    async fn handle_outcome(&mut self, outcome: FetchOutcome) {
        if !self.scheduler.finish_fetch(outcome.generation()) {
            debug!(
                "dropping stale fetch result from generation {} (now {})",
                outcome.generation(),
                self.scheduler.generation()
            );
            return;
        }
        self.fetch_task = None;

        match outcome {
            FetchOutcome::Opened { game_pk, result, .. } => self.open_session(game_pk, result).await,
            FetchOutcome::Polled { game_pk, result, .. } => self.apply_live(game_pk, result).await,
            FetchOutcome::Summary { game_pk, result, .. } => match result {
                Ok(summary) => {
                    self.emit(TrackerEvent::Final { game_pk, state: None, summary }).await;
                }
                Err(err) => {
                    warn!("final summary for game {game_pk} failed: {err}");
                    self.emit_status(game_pk, format!("Could not load final summary: {err}"))
                        .await;
                }
            },
        }
    }

    /// A finished game becomes a replay; anything else is polled live.
    async fn open_session(&mut self, game_pk: u64, result: FeedResult<LiveFeed>) {
        let feed = match result {
            Ok(feed) => feed,
            Err(err) => {
                let err = LoadError::from(err);
                warn!("opening game {game_pk} failed: {err}");
                self.emit_status(game_pk, err.to_string()).await;
                return;
            }
        };

        let status = feed.status();
        if status.is_terminal() {
            match ReplaySession::from_feed(feed) {
                Ok(replay) => {
                    let total_plays = replay.total_plays();
                    let info = replay.info().clone();
                    info!("game {game_pk} loaded for replay, {total_plays} plays");
                    self.session = Some(Session::Replay(replay));
                    self.emit(TrackerEvent::ReplayLoaded { game_pk, total_plays, info })
                        .await;
                }
                Err(err) => {
                    warn!("replay for game {game_pk} unavailable: {err}");
                    self.emit_status(game_pk, err.to_string()).await;
                }
            }
            return;
        }

        let mut polling = PollingSession::new(game_pk);
        let state = normalize_live(&feed);
        polling.observe(state.clone());
        self.session = Some(Session::Polling(polling));
        info!("game {game_pk} opened for live tracking ({})", status.label());
        self.emit(TrackerEvent::LiveStarted { game_pk, status, state }).await;
    }

    async fn apply_live(&mut self, game_pk: u64, result: FeedResult<LiveFeed>) {
        let feed = match result {
            Ok(feed) => feed,
            Err(err) => {
                if err.is_transient() {
                    warn!("live update for game {game_pk} failed, retrying next tick: {err}");
                } else {
                    warn!("live feed for game {game_pk} unreadable: {err}");
                }
                self.emit_status(game_pk, format!("Live update failed: {err}")).await;
                return;
            }
        };

        let Some(Session::Polling(polling)) = self.session.as_mut() else {
            return;
        };
        if polling.game_pk() != game_pk {
            return;
        }

        let state = normalize_live(&feed);
        if feed.status().is_terminal() {
            info!("game {game_pk} is final, polling stopped");
            self.scheduler.stop();
            self.session = None;
            let summary = feed.final_summary();
            self.emit(TrackerEvent::Final { game_pk, state: Some(state), summary }).await;
            return;
        }

        if let Some(state) = polling.observe(state) {
            self.emit(TrackerEvent::State { game_pk, state }).await;
        }
    }

    fn abort_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }

    fn reset(&mut self) {
        self.scheduler.cancel();
        self.abort_fetch();
        self.session = None;
    }

    async fn emit_status(&self, game_pk: u64, message: String) {
        self.emit(TrackerEvent::Status { game_pk: Some(game_pk), message }).await;
    }

    async fn emit(&self, event: TrackerEvent) {
        let _ = self.events.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlb_api::{Count, GameStatus};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FEED_PATH: &str = "/api/v1.1/game/745000/feed/live";

    fn fast_cadence() -> Cadence {
        Cadence {
            replay: Duration::from_millis(20),
            live: Duration::from_millis(20),
        }
    }

    fn spawn_tracker(
        server: &mockito::Server,
    ) -> (mpsc::Sender<TrackerCommand>, mpsc::Receiver<TrackerEvent>) {
        spawn_tracker_at(server.url(), fast_cadence(), Duration::from_secs(2))
    }

    fn spawn_tracker_at(
        base_url: String,
        cadence: Cadence,
        timeout: Duration,
    ) -> (mpsc::Sender<TrackerCommand>, mpsc::Receiver<TrackerEvent>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);
        let api = MlbApi::new().with_base_url(base_url).with_timeout(timeout);
        tokio::spawn(TrackerWorker::new(api, cadence, command_rx, event_tx).run());
        (command_tx, event_rx)
    }

    /// Bare HTTP server for timing-sensitive cases. The first request (the
    /// open) is answered at once; every later one waits `delay` first, or is
    /// never answered when `delay` is `None`.
    struct SlowFeedServer {
        url: String,
        requests: Arc<AtomicUsize>,
    }

    impl SlowFeedServer {
        async fn start(open_body: String, poll_body: String, delay: Option<Duration>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(AtomicUsize::new(0));
            let seen = requests.clone();

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let n = seen.fetch_add(1, Ordering::SeqCst);
                    let body = if n == 0 { open_body.clone() } else { poll_body.clone() };
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        if n > 0 {
                            match delay {
                                Some(delay) => tokio::time::sleep(delay).await,
                                None => std::future::pending::<()>().await,
                            }
                        }
                        let response = format!(
                            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                             content-length: {}\r\nconnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                    });
                }
            });

            Self { url, requests }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        async fn wait_for_requests(&self, n: usize) {
            tokio::time::timeout(Duration::from_secs(5), async {
                while self.requests() < n {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .expect("server never saw the expected requests");
        }
    }

    async fn next_event(events: &mut mpsc::Receiver<TrackerEvent>) -> TrackerEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for a tracker event")
            .expect("tracker channel closed")
    }

    async fn assert_quiet(events: &mut mpsc::Receiver<TrackerEvent>) {
        assert_quiet_for(events, Duration::from_millis(200)).await;
    }

    async fn assert_quiet_for(events: &mut mpsc::Receiver<TrackerEvent>, window: Duration) {
        let extra = tokio::time::timeout(window, events.recv()).await;
        assert!(extra.is_err(), "unexpected event: {extra:?}");
    }

    fn final_feed_body() -> String {
        json!({
            "gamePk": 745000,
            "gameData": {
                "status": { "abstractGameState": "Final", "detailedState": "Final" },
                "teams": {
                    "home": { "name": "Los Angeles Dodgers" },
                    "away": { "name": "San Diego Padres" }
                },
                "venue": { "name": "Dodger Stadium" }
            },
            "liveData": {
                "linescore": { "teams": { "home": { "runs": 2 }, "away": { "runs": 1 } } },
                "plays": {
                    "allPlays": [
                        {
                            "result": { "description": "Tatis strikes out.", "awayScore": 0, "homeScore": 0 },
                            "about": { "inning": 1, "halfInning": "top" },
                            "count": { "balls": 1, "strikes": 3, "outs": 1 }
                        },
                        {
                            "result": { "description": "Machado homers.", "awayScore": 1, "homeScore": 0 },
                            "about": { "inning": 1, "halfInning": "top" },
                            "count": { "balls": 2, "strikes": 1, "outs": 1 }
                        },
                        {
                            "result": { "description": "Betts doubles, two runs score.", "awayScore": 1, "homeScore": 2 },
                            "about": { "inning": 1, "halfInning": "bottom" },
                            "count": { "balls": 0, "strikes": 0, "outs": 0 }
                        }
                    ]
                }
            }
        })
        .to_string()
    }

    fn live_feed_body(abstract_state: &str, outs: i32) -> String {
        json!({
            "gamePk": 745000,
            "gameData": {
                "status": { "abstractGameState": abstract_state },
                "teams": {
                    "home": { "name": "Los Angeles Dodgers" },
                    "away": { "name": "San Diego Padres" }
                },
                "venue": { "name": "Dodger Stadium" }
            },
            "liveData": {
                "linescore": {
                    "currentInning": 4,
                    "inningHalf": "Top",
                    "outs": outs,
                    "teams": { "home": { "runs": 3 }, "away": { "runs": 2 } }
                },
                "plays": {
                    "allPlays": [],
                    "currentPlay": {
                        "count": { "balls": 1, "strikes": 2, "outs": outs },
                        "matchup": {
                            "batter": { "id": 1, "fullName": "Fernando Tatis Jr." },
                            "pitcher": { "id": 2, "fullName": "Tyler Glasnow" }
                        }
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn observe_suppresses_identical_states() {
        let mut polling = PollingSession::new(1);
        let state = GameState {
            count: Count { balls: 0, strikes: 0, outs: 1 },
            ..GameState::default()
        };

        assert!(polling.observe(state.clone()).is_some());
        assert!(polling.observe(state.clone()).is_none());
        assert!(polling.observe(state.clone()).is_none());

        let next = GameState {
            count: Count { balls: 0, strikes: 0, outs: 2 },
            ..state
        };
        assert_eq!(polling.observe(next.clone()), Some(next.clone()));
        assert_eq!(polling.last_observed(), Some(&next));
    }

    #[test]
    fn fetch_guard_blocks_reentry_until_finished() {
        let mut scheduler = Scheduler::new();
        let generation = scheduler.try_begin_fetch().unwrap();
        assert!(scheduler.in_flight());
        assert!(scheduler.try_begin_fetch().is_none());

        assert!(scheduler.finish_fetch(generation));
        assert!(!scheduler.in_flight());
        assert!(scheduler.try_begin_fetch().is_some());
    }

    #[test]
    fn cancel_invalidates_fetches_in_flight() {
        let mut scheduler = Scheduler::new();
        let stale = scheduler.try_begin_fetch().unwrap();
        scheduler.cancel();

        assert!(!scheduler.in_flight());
        assert!(!scheduler.finish_fetch(stale));
        let fresh = scheduler.try_begin_fetch().unwrap();
        assert_ne!(stale, fresh);
        assert!(scheduler.finish_fetch(fresh));
    }

    #[tokio::test]
    async fn scheduler_ticks_only_while_running() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.is_running());
        let idle = tokio::time::timeout(Duration::from_millis(50), scheduler.tick()).await;
        assert!(idle.is_err());

        scheduler.start(Duration::from_millis(10));
        assert!(scheduler.is_running());
        tokio::time::timeout(Duration::from_secs(1), scheduler.tick())
            .await
            .expect("first tick is immediate");

        scheduler.stop();
        let stopped = tokio::time::timeout(Duration::from_millis(50), scheduler.tick()).await;
        assert!(stopped.is_err());
    }

    #[tokio::test]
    async fn replay_steps_every_play_then_stops() {
        let mut server = mockito::Server::new_async().await;
        // One fetch to load, one for the closing summary.
        let mock = server
            .mock("GET", FEED_PATH)
            .with_header("content-type", "application/json")
            .with_body(final_feed_body())
            .expect(2)
            .create_async()
            .await;
        let (commands, mut events) = spawn_tracker(&server);

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::ReplayLoaded { total_plays, info, .. } => {
                assert_eq!(total_plays, 3);
                assert_eq!(info.venue, "Dodger Stadium");
            }
            other => panic!("expected ReplayLoaded, got {other:?}"),
        }

        commands.send(TrackerCommand::Play).await.unwrap();
        let mut states = Vec::new();
        for _ in 0..3 {
            match next_event(&mut events).await {
                TrackerEvent::State { state, .. } => states.push(state),
                other => panic!("expected State, got {other:?}"),
            }
        }
        assert_ne!(states[0], states[1]);
        assert_ne!(states[1], states[2]);
        assert_eq!(states[1].play_description(), Some("Machado homers."));
        assert_eq!((states[2].score.away, states[2].score.home), (1, 2));

        assert!(matches!(
            next_event(&mut events).await,
            TrackerEvent::ReplayFinished { game_pk: 745000 }
        ));
        match next_event(&mut events).await {
            TrackerEvent::Final { state, summary, .. } => {
                assert!(state.is_none());
                assert_eq!(summary.total_plays, 3);
                assert_eq!(summary.home_team, "Los Angeles Dodgers");
            }
            other => panic!("expected Final, got {other:?}"),
        }

        assert_quiet(&mut events).await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn live_game_that_turns_final_emits_one_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let live = server
            .mock("GET", FEED_PATH)
            .with_body(live_feed_body("Live", 1))
            .expect(1)
            .create_async()
            .await;
        let (commands, mut events) = spawn_tracker(&server);

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::LiveStarted { status, state, .. } => {
                assert_eq!(status, GameStatus::Live);
                assert_eq!(state.count.outs, 1);
                assert_eq!(state.inning, 4);
            }
            other => panic!("expected LiveStarted, got {other:?}"),
        }
        live.assert_async().await;
        live.remove_async().await;

        let fin = server
            .mock("GET", FEED_PATH)
            .with_body(live_feed_body("Final", 2))
            .expect(1)
            .create_async()
            .await;

        commands.send(TrackerCommand::Play).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::Final { state: Some(state), summary, .. } => {
                assert_eq!(state.count.outs, 2);
                assert_eq!((summary.score.home, summary.score.away), (3, 2));
            }
            other => panic!("expected Final snapshot, got {other:?}"),
        }

        assert_quiet(&mut events).await;
        fin.assert_async().await;
    }

    #[tokio::test]
    async fn unchanged_polls_stay_silent_until_something_moves() {
        let mut server = mockito::Server::new_async().await;
        let same = server
            .mock("GET", FEED_PATH)
            .with_body(live_feed_body("Live", 1))
            .expect_at_least(3)
            .create_async()
            .await;
        let (commands, mut events) = spawn_tracker(&server);

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        assert!(matches!(next_event(&mut events).await, TrackerEvent::LiveStarted { .. }));

        commands.send(TrackerCommand::Play).await.unwrap();
        assert_quiet(&mut events).await;
        same.assert_async().await;
        same.remove_async().await;

        let _moved = server
            .mock("GET", FEED_PATH)
            .with_body(live_feed_body("Live", 2))
            .create_async()
            .await;
        // A poll racing the mock swap may hit no route and report a status.
        loop {
            match next_event(&mut events).await {
                TrackerEvent::State { state, .. } => {
                    assert_eq!(state.count.outs, 2);
                    break;
                }
                TrackerEvent::Status { .. } => continue,
                other => panic!("expected State, got {other:?}"),
            }
        }

        commands.send(TrackerCommand::Stop).await.unwrap();
        // Anything queued before the stop drains first.
        loop {
            match next_event(&mut events).await {
                TrackerEvent::Stopped => break,
                TrackerEvent::State { .. } | TrackerEvent::Status { .. } => continue,
                other => panic!("unexpected event before Stopped: {other:?}"),
            }
        }
        assert_quiet(&mut events).await;
    }

    #[tokio::test]
    async fn failed_open_reports_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", FEED_PATH)
            .with_status(500)
            .create_async()
            .await;
        let (commands, mut events) = spawn_tracker(&server);

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::Status { game_pk, message } => {
                assert_eq!(game_pk, Some(745000));
                assert!(!message.is_empty());
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn play_without_a_game_is_a_status() {
        let server = mockito::Server::new_async().await;
        let (commands, mut events) = spawn_tracker(&server);

        commands.send(TrackerCommand::Play).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            TrackerEvent::Status { game_pk: None, .. }
        ));
        assert_quiet(&mut events).await;
    }

    #[tokio::test]
    async fn paused_replay_resumes_from_the_same_play() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", FEED_PATH)
            .with_body(final_feed_body())
            .create_async()
            .await;
        let cadence = Cadence {
            replay: Duration::from_millis(300),
            live: Duration::from_millis(300),
        };
        let (commands, mut events) =
            spawn_tracker_at(server.url(), cadence, Duration::from_secs(2));

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        assert!(matches!(next_event(&mut events).await, TrackerEvent::ReplayLoaded { .. }));

        commands.send(TrackerCommand::Play).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::State { state, .. } => {
                assert_eq!(state.play_description(), Some("Tatis strikes out."));
            }
            other => panic!("expected first play, got {other:?}"),
        }

        commands.send(TrackerCommand::Pause).await.unwrap();
        assert_quiet_for(&mut events, Duration::from_millis(500)).await;

        commands.send(TrackerCommand::Play).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::State { state, .. } => {
                assert_eq!(state.play_description(), Some("Machado homers."));
            }
            other => panic!("expected second play, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pause_drops_a_poll_in_flight_and_play_resumes() {
        let server = SlowFeedServer::start(
            live_feed_body("Live", 1),
            live_feed_body("Live", 2),
            Some(Duration::from_millis(300)),
        )
        .await;
        let (commands, mut events) =
            spawn_tracker_at(server.url.clone(), fast_cadence(), Duration::from_secs(2));

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        assert!(matches!(next_event(&mut events).await, TrackerEvent::LiveStarted { .. }));

        commands.send(TrackerCommand::Play).await.unwrap();
        server.wait_for_requests(2).await;
        commands.send(TrackerCommand::Pause).await.unwrap();

        // The slow answer would have carried a change (outs 1 -> 2).
        assert_quiet_for(&mut events, Duration::from_millis(600)).await;
        assert_eq!(server.requests(), 2);

        commands.send(TrackerCommand::Play).await.unwrap();
        match next_event(&mut events).await {
            TrackerEvent::State { state, .. } => assert_eq!(state.count.outs, 2),
            other => panic!("expected State after resuming, got {other:?}"),
        }
        commands.send(TrackerCommand::Stop).await.unwrap();
    }

    #[tokio::test]
    async fn slow_poll_is_never_overlapped() {
        let server = SlowFeedServer::start(
            live_feed_body("Live", 1),
            live_feed_body("Live", 1),
            Some(Duration::from_millis(800)),
        )
        .await;
        let (commands, mut events) =
            spawn_tracker_at(server.url.clone(), fast_cadence(), Duration::from_secs(2));

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        assert!(matches!(next_event(&mut events).await, TrackerEvent::LiveStarted { .. }));

        commands.send(TrackerCommand::Play).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        // The open plus exactly one poll, despite ~25 ticks elapsing.
        assert_eq!(server.requests(), 2);
        commands.send(TrackerCommand::Stop).await.unwrap();
    }

    #[tokio::test]
    async fn hanging_poll_times_out_and_ticking_continues() {
        let server = SlowFeedServer::start(
            live_feed_body("Live", 1),
            live_feed_body("Live", 1),
            None,
        )
        .await;
        let (commands, mut events) =
            spawn_tracker_at(server.url.clone(), fast_cadence(), Duration::from_millis(100));

        commands.send(TrackerCommand::Select { game_pk: 745000 }).await.unwrap();
        assert!(matches!(next_event(&mut events).await, TrackerEvent::LiveStarted { .. }));

        commands.send(TrackerCommand::Play).await.unwrap();
        for _ in 0..2 {
            match next_event(&mut events).await {
                TrackerEvent::Status { game_pk, message } => {
                    assert_eq!(game_pk, Some(745000));
                    assert!(message.starts_with("Live update failed"), "{message}");
                }
                other => panic!("expected Status, got {other:?}"),
            }
        }
        // A new poll went out after each timeout.
        assert!(server.requests() >= 3);
        commands.send(TrackerCommand::Stop).await.unwrap();
    }
}
