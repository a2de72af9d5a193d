//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - CLI one-shot commands (cleanup, config generation)

pub mod cli;
pub mod server;

pub use cli::{run_cleanup, run_config_gen};
pub use server::run_server;
