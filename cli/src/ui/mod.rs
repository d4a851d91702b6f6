//! UI Module
//!
//! This module exports the UI components for the splitbill CLI:
//!
//! - `app`: Screen state, key handling and the event loop
//! - `views`: Rendering functions for the sidebar, forms and status bar

mod app;
mod views;

pub use app::{run_app, App};
