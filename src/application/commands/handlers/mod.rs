//! Command Handlers

mod observe_handlers;

pub use observe_handlers::ObserveTextHandler;
