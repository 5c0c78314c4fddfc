use crate::hex::Position;
use crate::pqueue::PriorityQueue;
use hxk_core::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

/// Bounded ε-admissible A* from `start` toward `target`.
///
/// The f-score is `g + HEURISTIC_WEIGHT * h` with `h` the hex distance to
/// the target, so the search accepts sub-optimal paths in exchange for
/// expanding fewer nodes. Neighbors are considered in randomized order and
/// cells satisfying `occupied` are never expanded. The search stops after
/// `limit` node expansions.
///
/// Returns the reconstructed path (including `start`) to `target` when
/// reached, otherwise to the visited node closest to the target. A path of
/// length zero or one means stay put.
pub fn astar(
    start: Position,
    target: Position,
    occupied: impl Fn(&Position) -> bool,
    limit: usize,
    rng: &mut SmallRng,
) -> Vec<Position> {
    let mut open = PriorityQueue::new();
    let mut score: HashMap<Position, i32> = HashMap::from([(start, 0)]);
    let mut came: HashMap<Position, Position> = HashMap::new();
    let mut best = start;
    let mut expansions = 0;
    open.add(start, HEURISTIC_WEIGHT * start.distance(target));
    while let Some(current) = open.pop() {
        if current.distance(target) < best.distance(target) {
            best = current;
        }
        if current == target {
            return rebuild(&came, start, target);
        }
        expansions += 1;
        if expansions >= limit {
            break;
        }
        let mut neighbors = current.neighbors();
        neighbors.shuffle(rng);
        let tentative = score[&current] + 1;
        for next in neighbors {
            if occupied(&next) {
                continue;
            }
            if tentative < *score.get(&next).unwrap_or(&i32::MAX) {
                score.insert(next, tentative);
                came.insert(next, current);
                open.add(next, tentative + HEURISTIC_WEIGHT * next.distance(target));
            }
        }
    }
    rebuild(&came, start, best)
}

/// Breadth-first fallback planner with the same contract as [`astar`] but
/// no heuristic: expansion order is purely ring order. Produces contiguous
/// shortest paths within the expansion bound.
pub fn flood_path(
    start: Position,
    target: Position,
    occupied: impl Fn(&Position) -> bool,
    limit: usize,
    rng: &mut SmallRng,
) -> Vec<Position> {
    let mut frontier = VecDeque::from([start]);
    let mut came: HashMap<Position, Position> = HashMap::new();
    let mut seen: HashSet<Position> = HashSet::from([start]);
    let mut best = start;
    let mut expansions = 0;
    while let Some(current) = frontier.pop_front() {
        if current.distance(target) < best.distance(target) {
            best = current;
        }
        if current == target {
            return rebuild(&came, start, target);
        }
        expansions += 1;
        if expansions >= limit {
            break;
        }
        let mut neighbors = current.neighbors();
        neighbors.shuffle(rng);
        for next in neighbors {
            if occupied(&next) || seen.contains(&next) {
                continue;
            }
            seen.insert(next);
            came.insert(next, current);
            frontier.push_back(next);
        }
    }
    rebuild(&came, start, best)
}

fn rebuild(came: &HashMap<Position, Position>, start: Position, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut cursor = end;
    while cursor != start {
        match came.get(&cursor) {
            Some(&previous) => {
                path.push(previous);
                cursor = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn wall() -> HashSet<Position> {
        // vertical wall at q=5 spanning r in 0..=2
        (0..=2).map(|r| Position::new(5, r)).collect()
    }

    fn assert_contiguous(path: &[Position], blocked: &HashSet<Position>) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
        for cell in &path[1..] {
            assert!(!blocked.contains(cell));
        }
    }

    #[test]
    fn reaches_target_on_open_ground() {
        let start = Position::new(0, 0);
        let target = Position::new(6, 0);
        let path = astar(start, target, |_| false, 100, &mut rng());
        assert_eq!(*path.first().unwrap(), start);
        assert_eq!(*path.last().unwrap(), target);
        assert_contiguous(&path, &HashSet::new());
    }
    #[test]
    fn routes_around_obstacles() {
        let blocked = wall();
        let start = Position::new(0, 0);
        let target = Position::new(10, 0);
        let path = astar(start, target, |p| blocked.contains(p), 200, &mut rng());
        assert_eq!(*path.last().unwrap(), target);
        assert_contiguous(&path, &blocked);
        assert!(path.len() as i32 > start.distance(target));
    }
    #[test]
    fn bounded_search_returns_closest_visited() {
        let start = Position::new(0, 0);
        let target = Position::new(30, 0);
        let path = astar(start, target, |_| false, 5, &mut rng());
        assert_eq!(*path.first().unwrap(), start);
        assert_contiguous(&path, &HashSet::new());
        // progress was made toward the target within the bound
        assert!(path.last().unwrap().distance(target) < start.distance(target));
        assert!(path.len() <= 6);
    }
    #[test]
    fn unreachable_target_yields_closest_approach() {
        // target fully enclosed by occupied cells
        let target = Position::new(8, 0);
        let blocked: HashSet<Position> = target.neighbors().into_iter().collect();
        let start = Position::new(0, 0);
        let path = astar(start, target, |p| blocked.contains(p), 500, &mut rng());
        assert_ne!(*path.last().unwrap(), target);
        assert_contiguous(&path, &blocked);
    }
    #[test]
    fn staying_put_is_a_single_cell_path() {
        let start = Position::new(2, 2);
        let path = astar(start, start, |_| false, 20, &mut rng());
        assert_eq!(path, vec![start]);
    }
    #[test]
    fn flood_path_matches_contract() {
        let blocked = wall();
        let start = Position::new(0, 0);
        let target = Position::new(10, 0);
        let path = flood_path(start, target, |p| blocked.contains(p), 2000, &mut rng());
        assert_eq!(*path.first().unwrap(), start);
        assert_eq!(*path.last().unwrap(), target);
        assert_contiguous(&path, &blocked);
    }
    #[test]
    fn flood_path_finds_shortest_on_open_ground() {
        let start = Position::new(0, 0);
        let target = Position::new(4, 0);
        let path = flood_path(start, target, |_| false, 2000, &mut rng());
        assert_eq!(path.len() as i32, start.distance(target) + 1);
    }
}
