use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use prost::Message as ProstMessage;
use tokio::sync::mpsc;

use common::id_generator::generate_connection_id;
use common::proto::{ClientMessage, ServerMessage};
use common::{ConnectionId, log};

use crate::broadcaster::Broadcaster;
use crate::game_service::GameService;
use crate::web_server::WebServerState;

const OUTBOUND_QUEUE_SIZE: usize = 128;
const MAX_ID_ATTEMPTS: usize = 8;

pub async fn handle_websocket(socket: WebSocket, state: WebServerState) {
    let (mut ws_sender, ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_SIZE);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let mut buf = Vec::new();
            if msg.encode(&mut buf).is_ok()
                && ws_sender.send(Message::Binary(buf.into())).await.is_err()
            {
                break;
            }
        }
    });

    let Some(client_id) = register_connection(&state.broadcaster, tx).await else {
        log!("Could not allocate a unique connection id, dropping socket");
        send_task.abort();
        return;
    };
    log!(
        "WebSocket client connected: {} ({} online)",
        client_id,
        state.broadcaster.client_count().await
    );

    let game_service = state.game_service;
    game_service.connect(&client_id).await;

    tokio::select! {
        _ = &mut send_task => {
            log!("[ws:{}] Outbound queue closed, dropping connection", client_id);
        }
        _ = receive_messages(&game_service, &client_id, ws_receiver) => {}
    }

    log!("WebSocket connection ended for client: {}", client_id);
    game_service.disconnect(&client_id).await;
    state.broadcaster.unregister(&client_id).await;

    send_task.abort();
}

async fn receive_messages(
    game_service: &GameService<Broadcaster>,
    client_id: &ConnectionId,
    mut ws_receiver: SplitStream<WebSocket>,
) {
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(msg) => {
                let data = match msg {
                    Message::Binary(data) => data,
                    Message::Close(_) => break,
                    Message::Text(_) => {
                        log!("[ws:{}] Ignoring text frame", client_id);
                        continue;
                    }
                    _ => continue,
                };

                let client_message = match ClientMessage::decode(data) {
                    Ok(m) => m,
                    Err(e) => {
                        log!("[ws:{}] Failed to decode ClientMessage: {}", client_id, e);
                        continue;
                    }
                };

                game_service.handle_message(client_id, client_message).await;
            }
            Err(e) => {
                log!("[ws:{}] WebSocket error: {}", client_id, e);
                break;
            }
        }
    }
}

async fn register_connection(
    broadcaster: &Broadcaster,
    tx: mpsc::Sender<ServerMessage>,
) -> Option<ConnectionId> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let client_id = generate_connection_id();
        if broadcaster.register(client_id.clone(), tx.clone()).await {
            return Some(client_id);
        }
    }
    None
}
