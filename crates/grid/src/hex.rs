use hxk_core::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

/// Axial hex coordinate on the pointy-top grid.
///
/// The third cube axis is derived (`s = -q - r`), so equality and hashing
/// consider only `(q, r)`. All arithmetic is total over the integer plane.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub q: i32,
    pub r: i32,
}

/// The six unit axial offsets in fixed clockwise order starting north.
pub const DIRECTIONS: [Position; 6] = [
    Position { q: 0, r: -1 },
    Position { q: 1, r: -1 },
    Position { q: 1, r: 0 },
    Position { q: 0, r: 1 },
    Position { q: -1, r: 1 },
    Position { q: -1, r: 0 },
];

impl Position {
    pub const ORIGIN: Position = Position { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
    /// Derived cube axis.
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }
    /// Construct from exactly two of the three named cube axes.
    pub fn from_axes(q: Option<i32>, r: Option<i32>, s: Option<i32>) -> Result<Self> {
        match (q, r, s) {
            (Some(q), Some(r), None) => Ok(Self::new(q, r)),
            (Some(q), None, Some(s)) => Ok(Self::new(q, -q - s)),
            (None, Some(r), Some(s)) => Ok(Self::new(-r - s, r)),
            _ => Err(Error::client("exactly two of q, r, s must be supplied")),
        }
    }
    pub const fn scale(self, k: i32) -> Self {
        Self::new(self.q * k, self.r * k)
    }
    /// The six adjacent cells, clockwise starting north.
    pub fn neighbors(&self) -> [Position; 6] {
        DIRECTIONS.map(|d| *self + d)
    }
    /// Hex (cube) distance.
    pub fn distance(&self, other: Position) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }
    /// Cube-space linear interpolation, `t` in `[0, 1]`.
    fn lerp(&self, other: Position, t: f64) -> (f64, f64, f64) {
        let q = self.q as f64 + (other.q - self.q) as f64 * t;
        let r = self.r as f64 + (other.r - self.r) as f64 * t;
        let s = self.s() as f64 + (other.s() - self.s()) as f64 * t;
        (q, r, s)
    }
    /// Round fractional cube coordinates to the nearest cell, re-deriving
    /// the axis with the largest rounding error from the other two.
    pub fn round(q: f64, r: f64, s: f64) -> Self {
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();
        let dq = (rq - q).abs();
        let dr = (rr - r).abs();
        let ds = (rs - s).abs();
        if dq > dr && dq > ds {
            rq = -rr - rs;
        } else if dr > ds {
            rr = -rq - rs;
        }
        Self::new(rq as i32, rr as i32)
    }
    /// Every cell on the segment between the endpoints inclusive;
    /// `distance + 1` cells, each adjacent to the previous.
    pub fn line_to(&self, other: Position) -> Vec<Position> {
        let span = self.distance(other);
        if span == 0 {
            return vec![*self];
        }
        (0..=span)
            .map(|i| {
                let (q, r, s) = self.lerp(other, i as f64 / span as f64);
                Self::round(q, r, s)
            })
            .collect()
    }
    /// Pixel center of this cell, pointy-top layout.
    pub fn to_pixels(&self) -> (f64, f64) {
        let sqrt3 = 3f64.sqrt();
        let x = GRID_SIZE * (sqrt3 * self.q as f64 + sqrt3 / 2.0 * self.r as f64);
        let y = GRID_SIZE * (1.5 * self.r as f64);
        (x, y)
    }
    /// The cell containing a pixel coordinate.
    pub fn from_pixels(x: f64, y: f64) -> Self {
        let sqrt3 = 3f64.sqrt();
        let q = (sqrt3 / 3.0 * x - y / 3.0) / GRID_SIZE;
        let r = (2.0 / 3.0 * y) / GRID_SIZE;
        Self::round(q, r, -q - r)
    }
    /// All cells at exactly `radius` from this one; `6 * radius` cells,
    /// or just this cell at radius zero.
    pub fn ring(&self, radius: i32) -> Vec<Position> {
        if radius <= 0 {
            return vec![*self];
        }
        let mut cells = Vec::with_capacity(6 * radius as usize);
        let mut cursor = *self + DIRECTIONS[4].scale(radius);
        for direction in DIRECTIONS {
            for _ in 0..radius {
                cells.push(cursor);
                cursor = cursor + direction;
            }
        }
        cells
    }
    /// All cells within `radius` inclusive.
    pub fn hexagon(&self, radius: i32) -> Vec<Position> {
        (0..=radius).flat_map(|n| self.ring(n)).collect()
    }
    /// Lazy infinite sequence expanding outward ring by ring, shuffled
    /// within each ring to break ties. Bound it with `take` at the call
    /// site.
    pub fn flood(&self, rng: SmallRng) -> Flood {
        Flood {
            center: *self,
            rng,
            radius: 0,
            ring: Vec::new(),
            cursor: 0,
        }
    }
}

/// Number of cells in a full hexagon of the given radius.
pub const fn hexagon_area(radius: i32) -> usize {
    (1 + 3 * radius * (radius + 1)) as usize
}

impl std::ops::Add for Position {
    type Output = Position;
    fn add(self, other: Position) -> Position {
        Position::new(self.q + other.q, self.r + other.r)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl std::str::FromStr for Position {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| Error::client(format!("malformed position '{}'", s)))?;
        let q = q
            .trim()
            .parse()
            .map_err(|_| Error::client(format!("malformed position '{}'", s)))?;
        let r = r
            .trim()
            .parse()
            .map_err(|_| Error::client(format!("malformed position '{}'", s)))?;
        Ok(Self::new(q, r))
    }
}

/// Iterator behind [`Position::flood`].
pub struct Flood {
    center: Position,
    rng: SmallRng,
    radius: i32,
    ring: Vec<Position>,
    cursor: usize,
}

impl Iterator for Flood {
    type Item = Position;
    fn next(&mut self) -> Option<Position> {
        if self.cursor >= self.ring.len() {
            self.ring = self.center.ring(self.radius);
            self.ring.shuffle(&mut self.rng);
            self.cursor = 0;
            self.radius += 1;
        }
        let cell = self.ring[self.cursor];
        self.cursor += 1;
        Some(cell)
    }
}
