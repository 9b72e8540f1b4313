pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;
pub mod state;

pub use server::{router, serve};
pub use state::AppState;

#[cfg(test)]
pub mod testing;
