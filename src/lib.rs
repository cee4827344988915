pub mod api;
pub mod auth;
pub mod capture;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod services;
pub mod sheets;
pub mod state;
