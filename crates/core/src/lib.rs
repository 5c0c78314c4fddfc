//! Core type aliases, identity, errors, and constants for hexkeep.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the hexkeep workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Real-valued resource balances, costs, and hit points.
pub type Quantity = f64;
/// Wall-clock durations, tick deltas, and cooldowns.
pub type Seconds = f64;

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Number of raw bytes behind an [`ID`]; displays as 24 hex characters.
const ID_BYTES: usize = 12;

/// Owner of a game, as identified by the external dispatcher.
/// The engine never resolves owners; the marker only types their ids.
pub struct Owner;

/// Generic ID wrapper providing compile-time type safety over an opaque
/// 12-byte identifier, displayed as 24 lowercase hex characters.
pub struct ID<T> {
    inner: [u8; ID_BYTES],
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> [u8; ID_BYTES] {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying bytes.
    /// Useful for converting between marker types.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<[u8; ID_BYTES]> for ID<T> {
    fn from(inner: [u8; ID_BYTES]) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    /// Allocate a fresh id from the process-global random source.
    fn default() -> Self {
        use rand::RngCore;
        let mut inner = [0u8; ID_BYTES];
        rand::rng().fill_bytes(&mut inner);
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.to_string()).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in &self.inner {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        if s.len() != ID_BYTES * 2 {
            return Err(Error::client(format!("malformed id '{}'", s)));
        }
        let mut inner = [0u8; ID_BYTES];
        for (i, byte) in inner.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|_| Error::client(format!("malformed id '{}'", s)))?;
        }
        Ok(Self::from(inner))
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// ERROR TAXONOMY
// ============================================================================
/// Failure kinds shared by every crate in the workspace.
///
/// The kinds mirror how failures are surfaced: caller faults go back to the
/// originating caller, config faults skip the offending catalog entry,
/// invariant violations abandon the current activation, and transport
/// failures silently drop the subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Recoverable caller fault: bad position, occupied cell, insufficient
    /// resources, unknown game.
    Client(String),
    /// Caller lacks authority over the addressed game.
    Auth(String),
    /// Template catalog rejected an entry (unused or missing keys).
    Config(String),
    /// The engine caught a state corruption; programmer error.
    Invariant(String),
    /// A subscriber send failed.
    Transport(String),
}

impl Error {
    pub fn client(reason: impl Into<String>) -> Self {
        Self::Client(reason.into())
    }
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth(reason.into())
    }
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::Invariant(reason.into())
    }
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }
    /// HTTP-ish status for the dispatcher surfacing this error to a caller.
    pub fn status(&self) -> u16 {
        match self {
            Self::Client(_) => 400,
            Self::Auth(_) => 401,
            Self::Config(_) => 422,
            Self::Invariant(_) => 500,
            Self::Transport(_) => 502,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(reason) => write!(f, "{}", reason),
            Self::Auth(reason) => write!(f, "unauthorized: {}", reason),
            Self::Config(reason) => write!(f, "config: {}", reason),
            Self::Invariant(reason) => write!(f, "invariant violated: {}", reason),
            Self::Transport(reason) => write!(f, "transport: {}", reason),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// TICK SCHEDULING
// ============================================================================
/// Target interval between global scheduler iterations, in seconds.
/// The loop never sleeps less than 10ms; 1/30s clears that floor.
pub const TICK_SECONDS: Seconds = 1.0 / 30.0;
/// Continuous subscriber-empty idle time after which a game is destroyed.
pub const IDLE_TIMEOUT: Seconds = 30.0;
/// Lower bound of the per-entity update stagger reload.
pub const UPDATE_STAGGER_MIN: Seconds = 5.0;
/// Upper bound of the per-entity update stagger reload.
pub const UPDATE_STAGGER_MAX: Seconds = 6.0;

// ============================================================================
// BEHAVIOR ACTIVATION
// ============================================================================
/// Half-width of the multiplicative jitter applied to cooldown reloads.
pub const COOLDOWN_JITTER: f64 = 0.05;
/// Scale applied to the jittered reload when an activation fails,
/// so failed behaviors retry sooner.
pub const RETRY_SCALE: f64 = 0.33;

// ============================================================================
// PATHING
// ============================================================================
/// Node expansion bound for the weighted A* planner.
pub const PATH_EXPANSION_LIMIT: usize = 20;
/// Movers keep only the leading 1/Nth of a planned path before replanning.
pub const PATH_PREFIX_DIVISOR: usize = 5;
/// Weight on the heuristic term of the A* f-score. Values above 1 accept
/// sub-optimal paths in exchange for a wider, shallower search.
pub const HEURISTIC_WEIGHT: i32 = 2;
/// Cells examined when looking for a free spawn position near an origin.
/// Covers the full hexagon of radius 10.
pub const SPAWN_SEARCH_LIMIT: usize = 331;

// ============================================================================
// BOARD LAYOUT
// ============================================================================
/// Pixel size of one hex cell, pointy-top layout.
pub const GRID_SIZE: f64 = 100.0;
/// Default revealed radius around a player entity without a Vision override.
pub const VISION_DEFAULT: i32 = 2;
/// Template name of the construction scaffold spawned by build commands.
pub const CONSTRUCTION_TEMPLATE: &str = "Under Construction";

// ============================================================================
// ECONOMY
// ============================================================================
/// Fraction of each listed cost refunded by cancel commands.
pub const CANCEL_REFUND: f64 = 0.5;
/// Starting balance of each basic resource pool in a fresh game.
pub const STARTING_STOCK: Quantity = 300.0;

// ============================================================================
// WORLD GENERATION
// ============================================================================
/// Player workers spawned adjacent to the fortress at game creation.
pub const STARTING_WORKERS: usize = 3;
/// Resource nodes scattered per resource template at game creation.
pub const SCATTER_PER_TEMPLATE: usize = 6;
/// Inner radius of the resource scatter annulus around the fortress.
pub const SCATTER_MIN_RADIUS: i32 = 3;
/// Outer radius of the resource scatter annulus around the fortress.
pub const SCATTER_MAX_RADIUS: i32 = 10;
/// Ring distance from the fortress at which the enemy portal appears.
pub const PORTAL_DISTANCE: i32 = 12;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn id_displays_as_24_hex() {
        let id = ID::<Marker>::default();
        let s = id.to_string();
        assert_eq!(s.len(), 24);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
    #[test]
    fn id_roundtrips_through_display() {
        let id = ID::<Marker>::default();
        let parsed: ID<Marker> = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
    #[test]
    fn id_rejects_malformed_strings() {
        assert!("zz".parse::<ID<Marker>>().is_err());
        assert!("abc123".parse::<ID<Marker>>().is_err());
        assert!(
            "gggggggggggggggggggggggg"
                .parse::<ID<Marker>>()
                .is_err()
        );
    }
    #[test]
    fn ids_are_distinct() {
        assert_ne!(ID::<Marker>::default(), ID::<Marker>::default());
    }
    #[test]
    fn error_statuses() {
        assert_eq!(Error::client("x").status(), 400);
        assert_eq!(Error::auth("x").status(), 401);
        assert_eq!(Error::config("x").status(), 422);
        assert_eq!(Error::invariant("x").status(), 500);
        assert_eq!(Error::transport("x").status(), 502);
    }
}
