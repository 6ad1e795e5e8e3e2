pub mod app;
pub mod config;
pub mod database;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
