use std::collections::HashMap;
use std::sync::Arc;

use common::proto::ServerMessage;
use common::{ConnectionId, log, log_warn};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};

use crate::games::SessionBroadcaster;

pub type ClientSender = mpsc::Sender<ServerMessage>;

#[derive(Clone)]
pub struct Broadcaster {
    clients: Arc<Mutex<HashMap<ConnectionId, ClientSender>>>,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers the connection unless the id is already taken.
    pub async fn register(&self, client_id: ConnectionId, sender: ClientSender) -> bool {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(&client_id) {
            return false;
        }
        clients.insert(client_id, sender);
        true
    }

    pub async fn unregister(&self, client_id: &ConnectionId) {
        self.clients.lock().await.remove(client_id);
    }

    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

/// Queues without waiting. A client whose queue is full or closed is dropped, so
/// one stalled reader can never hold up the session.
fn offer(client_id: &ConnectionId, sender: &ClientSender, message: ServerMessage) -> bool {
    match sender.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            log_warn!("Client {} is not keeping up, dropping it", client_id);
            false
        }
        Err(TrySendError::Closed(_)) => {
            log!("Client {} channel closed, dropping it", client_id);
            false
        }
    }
}

impl SessionBroadcaster for Broadcaster {
    async fn send_to_client(&self, client_id: &ConnectionId, message: ServerMessage) {
        let mut clients = self.clients.lock().await;
        let dropped = clients
            .get(client_id)
            .is_some_and(|sender| !offer(client_id, sender, message));
        if dropped {
            clients.remove(client_id);
        }
    }

    async fn broadcast_to_all(&self, message: ServerMessage) {
        let mut clients = self.clients.lock().await;
        clients.retain(|client_id, sender| offer(client_id, sender, message.clone()));
    }
}
