//! menu-service: restaurant menu catalog with AI-assisted completion.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod validation;

pub use startup::{build_router, AppState, Application};
