pub mod app;
pub mod auth;
pub mod categories;
pub mod config;
pub mod error;
pub mod response;
pub mod state;
pub mod store;
pub mod tasks;
pub mod validation;
