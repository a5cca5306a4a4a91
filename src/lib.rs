//! Dashboard Tour — guided walkthrough engine for the dashboard.

pub mod config;
pub mod error;
pub mod headless;
pub mod store;
pub mod tour;
