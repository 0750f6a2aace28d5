// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module:
//! - compiles each task's `watch` globs;
//! - wires up a cross-platform filesystem watcher (`notify`);
//! - coalesces bursts of events and drops changes that did not alter file
//!   content (blake3 hashes) or that happened inside the output root.
//!
//! It only turns filesystem changes into task-level triggers; what happens
//! next is the engine's business.

pub mod cache;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event_handler::ChangeFilter;
pub use patterns::{build_profiles, TaskWatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};
