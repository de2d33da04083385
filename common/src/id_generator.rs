use rand::Rng;
use rand::distr::Alphanumeric;

use crate::ConnectionId;

pub const CONNECTION_ID_LENGTH: usize = 20;

pub fn generate_connection_id() -> ConnectionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CONNECTION_ID_LENGTH)
        .map(char::from)
        .collect();
    ConnectionId::new(id)
}
