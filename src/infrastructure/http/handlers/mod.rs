//! HTTP Handlers

mod audio;
mod observe;
mod ping;
mod stats;

pub use audio::*;
pub use observe::*;
pub use ping::*;
pub use stats::*;
