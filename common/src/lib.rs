pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/tictactoe.rs"));
}

pub mod config;
pub mod games;
pub mod id_generator;
pub mod identifiers;
pub mod logger;

pub use identifiers::*;
