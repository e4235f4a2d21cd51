pub mod catalog;
pub mod config;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod models;
pub mod placeholder;
pub mod routes;
pub mod wizard;
