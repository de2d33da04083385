use std::time::Duration;

use common::ConnectionId;
use common::proto::{ServerMessage, server_message};

#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    ToClient(ConnectionId, ServerMessage),
    ToAll(ServerMessage),
}

/// Deferred follow-ups. Each carries the generation it was armed in and is
/// dropped on arrival if the session has moved on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    AutoMove { generation: u64, delay: Duration },
    Restart { generation: u64, delay: Duration },
}

impl Timer {
    pub fn delay(&self) -> Duration {
        match self {
            Timer::AutoMove { delay, .. } | Timer::Restart { delay, .. } => *delay,
        }
    }
}

/// Everything a session step wants done, in delivery order.
#[derive(Debug, Default, PartialEq)]
pub struct Effects {
    pub outbound: Vec<Outbound>,
    pub timers: Vec<Timer>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_client(&mut self, client_id: &ConnectionId, message: server_message::Message) {
        self.outbound.push(Outbound::ToClient(
            client_id.clone(),
            ServerMessage {
                message: Some(message),
            },
        ));
    }

    pub fn to_all(&mut self, message: server_message::Message) {
        self.outbound.push(Outbound::ToAll(ServerMessage {
            message: Some(message),
        }));
    }

    pub fn schedule(&mut self, timer: Timer) {
        self.timers.push(timer);
    }
}

#[cfg(test)]
impl Effects {
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.timers.is_empty()
    }

    pub fn broadcasts(&self) -> impl Iterator<Item = &server_message::Message> {
        self.outbound.iter().filter_map(|outbound| match outbound {
            Outbound::ToAll(message) => message.message.as_ref(),
            Outbound::ToClient(..) => None,
        })
    }

    pub fn sent_to<'a>(
        &'a self,
        client_id: &'a ConnectionId,
    ) -> impl Iterator<Item = &'a server_message::Message> + 'a {
        self.outbound.iter().filter_map(move |outbound| match outbound {
            Outbound::ToClient(id, message) if id == client_id => message.message.as_ref(),
            _ => None,
        })
    }
}
