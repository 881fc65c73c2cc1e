//! Process-wide state shared by the dev server, watcher and shutdown handler.

mod state;

pub use state::{
    RebuildGuard, is_rebuilding, is_shutdown, register_server, setup_shutdown_handler,
};
