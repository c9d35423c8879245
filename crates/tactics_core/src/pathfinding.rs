//! Grid-based pathfinding using the A* algorithm.
//!
//! Movement is 8-directional with uniform step cost. Diagonal steps may not
//! cut a corner: both orthogonal neighbours of the diagonal must exist and be
//! walkable. The open set is a binary heap whose ties are broken by
//! insertion order, so identical queries always produce identical paths.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridPos};

/// Distance estimate used to order the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Heuristic {
    /// `|dx| + |dy|`. Overestimates when diagonals cost 1, so paths are not
    /// always shortest, but matches the reference path shapes.
    #[default]
    Manhattan,
    /// `max(|dx|, |dy|)`. Admissible for 8-directional uniform cost.
    Chebyshev,
}

impl Heuristic {
    /// Estimated cost from `from` to `to`.
    #[must_use]
    pub fn estimate(self, from: GridPos, to: GridPos) -> u32 {
        match self {
            Self::Manhattan => from.manhattan(to),
            Self::Chebyshev => from.chebyshev(to),
        }
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    pos: GridPos,
    g_score: u32,
    f_score: u32,
    /// Insertion sequence; earlier entries win ties.
    seq: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the lowest f_score pops first.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction offsets for 8-directional movement.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // right
    (-1, 0),  // left
    (0, 1),   // down
    (0, -1),  // up
    (1, 1),   // right-down
    (-1, -1), // left-up
    (1, -1),  // right-up
    (-1, 1),  // left-down
];

/// Check whether a single step from `from` by `(dx, dy)` is legal.
///
/// The destination must be walkable. For diagonal steps both orthogonal
/// neighbours must be walkable as well (no corner cutting).
#[must_use]
pub fn is_step_allowed(grid: &Grid, from: GridPos, dx: i32, dy: i32) -> bool {
    if !grid.is_walkable(from.offset(dx, dy)) {
        return false;
    }
    if dx != 0 && dy != 0 {
        grid.is_walkable(from.offset(dx, 0)) && grid.is_walkable(from.offset(0, dy))
    } else {
        true
    }
}

/// Walkable neighbours of `pos` in [`DIRECTIONS`] order.
#[must_use]
pub fn neighbors(grid: &Grid, pos: GridPos) -> Vec<GridPos> {
    DIRECTIONS
        .iter()
        .filter(|&&(dx, dy)| is_step_allowed(grid, pos, dx, dy))
        .map(|&(dx, dy)| pos.offset(dx, dy))
        .collect()
}

/// Find a path using the default [`Heuristic::Manhattan`].
///
/// See [`find_path_with`].
#[must_use]
pub fn find_path(grid: &Grid, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    find_path_with(grid, start, goal, Heuristic::default())
}

/// Find a path from `start` to `goal`.
///
/// The returned path begins with `start` and ends with `goal`; when they are
/// the same tile the path is just `[goal]`. The start tile itself is not
/// required to be walkable. Returns `None` when the goal cannot be reached.
#[must_use]
pub fn find_path_with(
    grid: &Grid,
    start: GridPos,
    goal: GridPos,
    heuristic: Heuristic,
) -> Option<Vec<GridPos>> {
    if start == goal {
        return Some(vec![goal]);
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut g_score: HashMap<GridPos, u32> = HashMap::new();
    let mut seq: u64 = 0;

    g_score.insert(start, 0);
    open_set.push(AStarNode {
        pos: start,
        g_score: 0,
        f_score: heuristic.estimate(start, goal),
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        // Skip stale heap entries superseded by a cheaper route.
        if g_score
            .get(&current.pos)
            .is_some_and(|&best| current.g_score > best)
        {
            continue;
        }

        for &(dx, dy) in &DIRECTIONS {
            if !is_step_allowed(grid, current.pos, dx, dy) {
                continue;
            }

            let next = current.pos.offset(dx, dy);
            let tentative_g = current.g_score + 1;
            let neighbor_g = g_score.get(&next).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(next, current.pos);
                g_score.insert(next, tentative_g);

                seq += 1;
                open_set.push(AStarNode {
                    pos: next,
                    g_score: tentative_g,
                    f_score: tentative_g + heuristic.estimate(next, goal),
                    seq,
                });
            }
        }
    }

    tracing::debug!(?start, ?goal, "No path found");
    None
}

/// Reconstruct path from the predecessor map.
fn reconstruct_path(came_from: &HashMap<GridPos, GridPos>, goal: GridPos) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
