use crate::grid::{tile_center, Grid};
use glam::Vec2;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Neighbor directions in fixed order: +x, -x, +y, -y. The enumeration
/// order is the BFS tie-break and must not change under replay.
const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Breadth-first search from `start` to `goal` over Path and Goal tiles.
///
/// Returns tile-center waypoints in world units, start first and the goal
/// center last, with the BFS-shortest hop count. An unreachable goal yields
/// an empty route; callers treat that as "do not spawn here", never as an
/// error.
pub fn find_path(grid: &Grid, start: (u16, u16), goal: (u16, u16), tile_size: f32) -> Vec<Vec2> {
    let width = grid.width() as usize;
    let size = width * grid.height() as usize;
    let index = |x: u16, y: u16| (y as usize) * width + (x as usize);

    let mut visited = vec![false; size];
    let mut parent: Vec<Option<(u16, u16)>> = vec![None; size];
    let mut queue = VecDeque::new();

    visited[index(start.0, start.1)] = true;
    queue.push_back(start);

    let mut reached = false;
    'search: while let Some((x, y)) = queue.pop_front() {
        if (x, y) == goal {
            reached = true;
            break 'search;
        }
        for (dx, dy) in NEIGHBORS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as u16, ny as u16);
            if !grid.in_bounds(nx, ny) || visited[index(nx, ny)] {
                continue;
            }
            if !grid.get(nx, ny).is_walkable() {
                continue;
            }
            visited[index(nx, ny)] = true;
            parent[index(nx, ny)] = Some((x, y));
            queue.push_back((nx, ny));
        }
    }

    if !reached {
        return Vec::new();
    }

    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(prev) = parent[index(current.0, current.1)] {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();
    cells
        .into_iter()
        .map(|(x, y)| tile_center(x, y, tile_size))
        .collect()
}

/// Waypoint routes keyed by spawn tile.
///
/// Each route is computed once and shared (`Arc`) by every monster spawned
/// from that tile; an unreachable spawn caches its empty route too, so the
/// search never re-runs until [`PathCache::clear`] on restart.
#[derive(Clone, Debug, Default)]
pub struct PathCache {
    routes: HashMap<(u16, u16), Arc<[Vec2]>>,
}

impl PathCache {
    pub fn route(
        &mut self,
        grid: &Grid,
        spawn: (u16, u16),
        goal: (u16, u16),
        tile_size: f32,
    ) -> Arc<[Vec2]> {
        self.routes
            .entry(spawn)
            .or_insert_with(|| {
                let path = find_path(grid, spawn, goal, tile_size);
                if path.is_empty() {
                    warn!(?spawn, ?goal, "spawn has no route to the goal; it will stay silent");
                }
                path.into()
            })
            .clone()
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAP;
    use crate::grid::Grid;

    fn walkable_grid(rows: &[&str]) -> Grid {
        let mut grid = Grid::from_rows(rows).unwrap();
        grid.find_spawn_points();
        grid
    }

    #[test]
    fn straight_corridor_is_traversed_end_to_end() {
        let grid = walkable_grid(&["S+++G"]);
        let path = find_path(&grid, (0, 0), (4, 0), 40.0);
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], tile_center(0, 0, 40.0));
        assert_eq!(*path.last().unwrap(), tile_center(4, 0, 40.0));
    }

    #[test]
    fn bfs_takes_the_shortest_branch() {
        // Upper branch is 2 hops shorter than the lower detour.
        let grid = walkable_grid(&[
            "S++++G",
            "+....+",
            "++++++",
        ]);
        let path = find_path(&grid, (0, 0), (5, 0), 40.0);
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn unreachable_goal_yields_an_empty_route() {
        let grid = walkable_grid(&["S+.+G"]);
        assert!(find_path(&grid, (0, 0), (4, 0), 40.0).is_empty());
    }

    #[test]
    fn both_default_map_spawns_reach_the_goal() {
        let mut grid = Grid::from_rows(&DEFAULT_MAP).unwrap();
        let spawns = grid.find_spawn_points();
        let goal = grid.goal();
        for spawn in spawns {
            let path = find_path(&grid, spawn, goal, 40.0);
            assert_eq!(path.len(), 20, "spawn {:?}", spawn);
            assert_eq!(*path.last().unwrap(), tile_center(goal.0, goal.1, 40.0));
        }
    }

    #[test]
    fn cache_computes_each_spawn_once() {
        let grid = walkable_grid(&["S+++G"]);
        let mut cache = PathCache::default();
        let first = cache.route(&grid, (0, 0), (4, 0), 40.0);
        let second = cache.route(&grid, (0, 0), (4, 0), 40.0);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_remembers_unreachable_spawns_as_empty() {
        let grid = walkable_grid(&["S+.+G"]);
        let mut cache = PathCache::default();
        assert!(cache.route(&grid, (0, 0), (4, 0), 40.0).is_empty());
        // Still cached; the failed search is not repeated.
        assert_eq!(cache.len(), 1);
    }
}
