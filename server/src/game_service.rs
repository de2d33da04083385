use std::sync::Arc;

use common::games::tictactoe::{BotSettings, choose_move};
use common::proto::{ChatMessage, ClientMessage, ServerMessage, client_message, server_message};
use common::{ConnectionId, log, log_warn};
use tokio::sync::{Mutex, mpsc};

use crate::games::SessionBroadcaster;
use crate::games::tictactoe::{Effects, Session, Timer};

/// Owns the shared session. Every inbound event and every fired timer takes the
/// session lock, steps the state machine and delivers its effects before releasing.
#[derive(Clone)]
pub struct GameService<B: SessionBroadcaster> {
    session: Arc<Mutex<Session>>,
    broadcaster: B,
    bot_settings: Arc<BotSettings>,
    timers: mpsc::UnboundedSender<Timer>,
}

impl<B: SessionBroadcaster> GameService<B> {
    pub fn start(session: Session, broadcaster: B, bot_settings: BotSettings) -> Self {
        let (timers, fired) = mpsc::unbounded_channel();
        let service = Self {
            session: Arc::new(Mutex::new(session)),
            broadcaster,
            bot_settings: Arc::new(bot_settings),
            timers,
        };

        tokio::spawn(service.clone().run_timers(fired));
        service
    }

    pub async fn connect(&self, client_id: &ConnectionId) {
        let mut session = self.session.lock().await;
        let effects = session.connect(client_id);
        self.deliver(effects).await;
    }

    pub async fn disconnect(&self, client_id: &ConnectionId) {
        let mut session = self.session.lock().await;
        let effects = session.disconnect(client_id);
        self.deliver(effects).await;
    }

    pub async fn handle_message(&self, client_id: &ConnectionId, message: ClientMessage) {
        let Some(message) = message.message else {
            log!("Empty message from {}", client_id);
            return;
        };

        let mut session = self.session.lock().await;
        let effects = match message {
            client_message::Message::MakeMove(request) => {
                session.handle_move(client_id, request.cell as usize)
            }
            client_message::Message::Check(_) => session.check(),
            client_message::Message::Reset(_) => {
                log!("Game reset requested by {}", client_id);
                session.reset()
            }
            client_message::Message::Chat(request) => session.handle_chat(client_id, &request.text),
        };
        self.deliver(effects).await;
    }

    pub async fn announce_shutdown(&self) {
        let _session = self.session.lock().await;
        self.broadcaster
            .broadcast_to_all(ServerMessage {
                message: Some(server_message::Message::Chat(ChatMessage {
                    speaker_label: String::new(),
                    text: "Server is shutting down".to_string(),
                })),
            })
            .await;
    }

    async fn deliver(&self, effects: Effects) {
        for timer in &effects.timers {
            self.schedule(*timer);
        }
        self.broadcaster.deliver(effects.outbound).await;
    }

    fn schedule(&self, timer: Timer) {
        let timers = self.timers.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timer.delay()).await;
            if timers.send(timer).is_err() {
                log!("Timer {:?} fired after the service stopped", timer);
            }
        });
    }

    async fn run_timers(self, mut fired: mpsc::UnboundedReceiver<Timer>) {
        while let Some(timer) = fired.recv().await {
            match timer {
                Timer::AutoMove { generation, .. } => self.run_auto_move(generation).await,
                Timer::Restart { generation, .. } => self.run_restart(generation).await,
            }
        }
    }

    async fn run_auto_move(&self, generation: u64) {
        let request = self.session.lock().await.auto_move_request(generation);
        let Some(request) = request else {
            log!("Automated move for generation {} is no longer due", generation);
            return;
        };

        let bot_settings = Arc::clone(&self.bot_settings);
        let search = tokio::task::spawn_blocking(move || {
            choose_move(&request.board, request.mover, &bot_settings, &mut rand::rng())
        })
        .await;
        let cell = match search {
            Ok(cell) => cell,
            Err(e) => {
                log_warn!("Automated move search failed: {}", e);
                return;
            }
        };

        let mut session = self.session.lock().await;
        let effects = session.apply_auto_move(&request, cell);
        self.deliver(effects).await;
    }

    async fn run_restart(&self, generation: u64) {
        let mut session = self.session.lock().await;
        let effects = session.restart_round(generation);
        self.deliver(effects).await;
    }
}
