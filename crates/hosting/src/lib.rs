//! Process-wide hosting for hexkeep simulations.
//!
//! One [`Engine`] owns every live game, the shared template catalog, and
//! the injected random source. A single cooperative scheduler task drives
//! all games sequentially within a tick; request dispatch enters through
//! the [`handlers`] endpoints with parsed [`request`] models.
//!
//! The transport layer is out of scope: callers hand subscribe a
//! `Subscriber` sink and surface handler errors with their status codes.
mod content;
mod engine;
pub mod handlers;
mod request;

pub use content::*;
pub use engine::*;
pub use request::*;
