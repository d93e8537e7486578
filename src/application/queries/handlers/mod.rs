//! Query Handlers

mod delivery_handlers;
mod resolve_handlers;

pub use delivery_handlers::{
    DeliverAudioHandler, DeliveryConfig, DeliveryStats, DeliveryStatsSnapshot,
};
pub use resolve_handlers::ResolveAudioHandler;
