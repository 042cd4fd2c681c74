//! NewsDeck: a terminal headline reader for RSS and Atom feeds.
//!
//! Categories point at one feed URL or several comma-joined ones whose
//! entries are merged into a single timeline. Feed lists are edited in a
//! working copy and saved explicitly; everything persists to one JSON file.

pub mod app;
pub mod cache;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod pagination;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
pub mod weather;
