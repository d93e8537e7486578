//! Background Workers

mod sweeper;

pub use sweeper::{IdentifierSweeper, SweeperConfig, SweeperHandle};
