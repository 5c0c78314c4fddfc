use hxk_grid::DIRECTIONS;
use hxk_grid::Position;
use std::collections::BTreeMap;
use std::collections::HashSet;

/// Cumulative revealed area over the hex grid.
///
/// The area only ever grows; fog of war does not regress. The boundary is
/// extracted on demand as closed pixel-space rings, one per connected
/// stretch of frontier, by chaining every hex edge that borders an
/// unrevealed cell.
#[derive(Debug, Default, Clone)]
pub struct Vision {
    revealed: HashSet<Position>,
}

/// Canonical corner key. Every pointy-top hex corner is the north corner or
/// the south corner of exactly one hex, which makes corner identity exact
/// integer data rather than a float comparison.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
enum Corner {
    North(Position),
    South(Position),
}

impl Corner {
    fn to_pixels(self) -> [f64; 2] {
        let (hex, offset) = match self {
            Corner::North(hex) => (hex, -hxk_core::GRID_SIZE),
            Corner::South(hex) => (hex, hxk_core::GRID_SIZE),
        };
        let (x, y) = hex.to_pixels();
        [x, y + offset]
    }
}

/// Endpoints of the edge shared with the neighbor in `DIRECTIONS[index]`,
/// oriented so that chaining successive edges of one hex walks its outline.
fn edge(hex: Position, index: usize) -> (Corner, Corner) {
    let north = Corner::North(hex);
    let south = Corner::South(hex);
    let upper_right = Corner::South(hex + DIRECTIONS[1]);
    let lower_right = Corner::North(hex + DIRECTIONS[3]);
    let lower_left = Corner::North(hex + DIRECTIONS[4]);
    let upper_left = Corner::South(hex + DIRECTIONS[0]);
    match index {
        0 => (upper_left, north),
        1 => (north, upper_right),
        2 => (upper_right, lower_right),
        3 => (lower_right, south),
        4 => (south, lower_left),
        5 => (lower_left, upper_left),
        _ => unreachable!("hexes have six edges"),
    }
}

impl Vision {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn contains(&self, cell: Position) -> bool {
        self.revealed.contains(&cell)
    }
    pub fn len(&self) -> usize {
        self.revealed.len()
    }
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }
    /// Union the hexagon of the given radius into the revealed area.
    /// Returns true when any new cell was revealed.
    pub fn reveal(&mut self, center: Position, radius: i32) -> bool {
        let mut grew = false;
        for cell in center.hexagon(radius) {
            grew |= self.revealed.insert(cell);
        }
        grew
    }
    /// Extract the boundary as closed pixel-coordinate rings.
    ///
    /// Each boundary edge is oriented consistently around the area it
    /// encloses, so following the successor map yields closed loops; holes
    /// come out as their own rings. Corners are ordered, so repeated
    /// extraction over the same area yields identical rings.
    pub fn outline(&self) -> Vec<Vec<[f64; 2]>> {
        let mut successors: BTreeMap<Corner, Vec<Corner>> = BTreeMap::new();
        for &hex in &self.revealed {
            for (index, direction) in DIRECTIONS.iter().enumerate() {
                if self.revealed.contains(&(hex + *direction)) {
                    continue;
                }
                let (from, to) = edge(hex, index);
                successors.entry(from).or_default().push(to);
            }
        }
        let mut rings = Vec::new();
        while let Some(&start) = successors.keys().next() {
            let mut ring = Vec::new();
            let mut cursor = start;
            loop {
                ring.push(cursor.to_pixels());
                let Some(outgoing) = successors.get_mut(&cursor) else {
                    break;
                };
                let next = outgoing.pop().expect("successor lists are never empty");
                if outgoing.is_empty() {
                    successors.remove(&cursor);
                }
                cursor = next;
                if cursor == start {
                    break;
                }
            }
            rings.push(ring);
        }
        rings
    }
}
