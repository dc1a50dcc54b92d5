pub mod access;
pub mod app;
pub mod auth;
pub mod collections;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod types;
