mod chat_command;
mod declined;
mod effects;
mod registry;
mod session;
mod standings;

pub use effects::{Effects, Outbound, Timer};
pub use session::{Session, SessionSettings};
