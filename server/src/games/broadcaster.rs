use std::future::Future;

use common::ConnectionId;
use common::proto::ServerMessage;

use super::tictactoe::Outbound;

pub trait SessionBroadcaster: Send + Sync + Clone + 'static {
    fn send_to_client(
        &self,
        client_id: &ConnectionId,
        message: ServerMessage,
    ) -> impl Future<Output = ()> + Send;

    fn broadcast_to_all(&self, message: ServerMessage) -> impl Future<Output = ()> + Send;

    /// Sends in order; a later message never overtakes an earlier one.
    fn deliver(&self, outbound: Vec<Outbound>) -> impl Future<Output = ()> + Send {
        async move {
            for item in outbound {
                match item {
                    Outbound::ToClient(client_id, message) => {
                        self.send_to_client(&client_id, message).await
                    }
                    Outbound::ToAll(message) => self.broadcast_to_all(message).await,
                }
            }
        }
    }
}
