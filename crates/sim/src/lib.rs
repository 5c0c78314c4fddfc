//! Authoritative simulation core for hexkeep games.
//!
//! Each game is an independent simulation advanced by the global scheduler;
//! clients observe it through broadcast events and act on it through the
//! per-entity command surface.
//!
//! ## State
//!
//! - [`Game`] — entities, occupancy index, resource pools, revealed area,
//!   subscriber set, and the per-game event outbox
//! - [`Entity`] — a live unit, resource node, or structure with its ordered
//!   behavior list
//! - [`Templates`] — catalog prototypes deep-copied into live entities
//!
//! ## Logic
//!
//! - [`Behavior`] — cooldown-gated unit of logic; the [`Kind`] sum carries
//!   the concrete variants
//! - [`Vision`] — cumulative revealed-area set with boundary extraction
//!
//! ## Synchronization
//!
//! - [`Event`] — the wire shapes broadcast to subscribers
//! - [`Subscriber`] — opaque sink owned by the transport layer
mod behavior;
mod entity;
mod event;
mod game;
mod resource;
mod subscriber;
mod vision;

pub use behavior::*;
pub use entity::*;
pub use event::*;
pub use game::*;
pub use resource::*;
pub use subscriber::*;
pub use vision::*;
