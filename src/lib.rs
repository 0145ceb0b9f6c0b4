// Public API for integration tests and potential library usage

pub mod app;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod game;
pub mod protocol;
pub mod roles;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;
