//! Actor system for watch mode.
//!
//! ```text
//! WatchActor --> Orchestrator --> ReloadActor
//! (notify)     (build/zip/sweep)  (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - message types for inter-actor communication
//! - `watch` - filesystem watcher with debouncing and unit registry
//! - `orchestrator` - rebuilds, zip scheduling, orphan sweep
//! - `reload` - WebSocket broadcast
//! - `coordinator` - wires up and runs actors

pub mod coordinator;
pub mod messages;
pub mod orchestrator;
pub mod reload;
pub mod watch;

pub use coordinator::Coordinator;
