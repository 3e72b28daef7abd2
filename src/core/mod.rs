//! Core game model: clock, player state, session, saving and configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod save;
pub mod session;
pub mod state;
