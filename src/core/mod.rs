//! Core types - pure abstractions shared across the codebase.

mod category;
mod state;

pub use category::{SourceCategory, has_private_component, is_private_name};
pub use state::{
    is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler,
};
