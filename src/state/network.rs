use crate::state::messages::{NetworkRequest, NetworkResponse};
use chrono::NaiveDate;
use log::{debug, error};
use mlb_api::GameType;
use mlb_api::client::{MlbApi, season_for};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Serves schedule lookups for the game picker.
pub struct NetworkWorker {
    client: MlbApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
    last_query: Option<(NaiveDate, GameType)>,
}

impl NetworkWorker {
    pub fn new(
        client: MlbApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
            last_query: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let query = match request {
                NetworkRequest::LoadSchedule { date, game_type } => Some((date, game_type)),
                NetworkRequest::RefreshSchedule => self.last_query,
            };
            let Some((date, game_type)) = query else {
                debug!("schedule refresh skipped: nothing loaded yet");
                continue;
            };
            self.last_query = Some((date, game_type));

            self.start_loading_animation().await;
            let response = self.handle_load_schedule(date, game_type).await;
            debug!("network request complete");
            self.stop_loading_animation().await;

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_schedule(&self, date: NaiveDate, game_type: GameType) -> NetworkResponse {
        debug!("loading {} schedule for {date}", game_type.label());
        let games = self
            .client
            .fetch_schedule(date, season_for(date), game_type)
            .await;
        NetworkResponse::ScheduleLoaded { date, games }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state: LoadingState::default() })
            .await;
    }
}
