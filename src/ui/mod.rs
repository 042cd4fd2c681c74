//! Terminal User Interface module.
//!
//! This module provides the TUI for the headline reader, including:
//! - Main event loop (`run`)
//! - Input handling for the main screen and its overlays
//! - Rendering for the categories and headlines panels
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Layout, header and overlay rendering
//! - `helpers` - Task spawning and shared utilities
//! - `articles` - Headlines panel with page controls
//! - `categories` - Category panel
//! - `help` - Keybinding help overlay
//! - `status` - Status bar widget

mod articles;
mod categories;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use helpers::TaskContext;
pub use loop_runner::{run, Action};
