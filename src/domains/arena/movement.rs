use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use super::agent::Agent;
use super::bomb::BombRegistry;
use super::grid::Grid;
use super::position::{Direction, Position};

/// Result of resolving one movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The agent already stood on the target.
    Stayed,
    Moved {
        from: Position,
        to: Position,
        direction: Direction,
    },
    /// No path to the (possibly substituted) target.
    Unreachable { target: Position },
}

/// Read-only view of everything that decides where agents may walk.
#[derive(Clone, Copy)]
pub struct Terrain<'a> {
    grid: &'a Grid,
    bombs: &'a BombRegistry,
}

impl<'a> Terrain<'a> {
    pub fn new(grid: &'a Grid, bombs: &'a BombRegistry) -> Self {
        Self { grid, bombs }
    }

    pub fn walkable(&self, x: i32, y: i32) -> bool {
        self.grid.in_bounds(x, y) && !self.grid.is_box(x, y) && !self.bombs.blocks_movement(x, y)
    }

    fn walkable_at(&self, position: Position) -> bool {
        self.walkable(position.x, position.y)
    }

    /// First cell of a shortest walkable path from `src` to `dst`.
    ///
    /// `None` when already there or when `dst` cannot be reached. The source
    /// cell itself is never tested, so an agent standing on its own fresh or
    /// aged bomb can still leave.
    pub fn shortest_next_step(&self, src: Position, dst: Position) -> Option<Position> {
        if src == dst {
            return None;
        }

        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut queue = VecDeque::from([src]);
        came_from.insert(src, src);

        while let Some(current) = queue.pop_front() {
            if current == dst {
                return Self::first_step(&came_from, src, dst);
            }
            for direction in Direction::ALL {
                let next = current.step(direction);
                if self.walkable_at(next) && !came_from.contains_key(&next) {
                    came_from.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn first_step(came_from: &HashMap<Position, Position>, src: Position, dst: Position) -> Option<Position> {
        let mut cell = dst;
        loop {
            let parent = *came_from.get(&cell)?;
            if parent == src {
                return Some(cell);
            }
            cell = parent;
        }
    }

    /// Walkable neighbour of `target` closest to `from`, ties in direction order.
    pub fn fallback_destination(&self, from: Position, target: Position) -> Option<Position> {
        Direction::ALL
            .into_iter()
            .map(|direction| target.step(direction))
            .filter(|cell| self.walkable_at(*cell))
            .min_by_key(|cell| cell.manhattan(from))
    }

    /// Moves the agent at most one cell toward `target`.
    pub fn resolve_move(&self, agent: &mut Agent, target: Position) -> MoveOutcome {
        if agent.position == target {
            agent.stay();
            return MoveOutcome::Stayed;
        }

        let mut destination = target;
        if !self.walkable_at(target) {
            debug!(agent = %agent.name, %target, "destination not walkable");
            match self.fallback_destination(agent.position, target) {
                Some(alternative) => {
                    debug!(agent = %agent.name, %alternative, "alternative destination");
                    destination = alternative;
                }
                None => {
                    agent.stay();
                    return MoveOutcome::Unreachable { target };
                }
            }
        }

        match self.shortest_next_step(agent.position, destination) {
            Some(next) => {
                let from = agent.position;
                agent.move_to(next);
                MoveOutcome::Moved {
                    from,
                    to: next,
                    direction: agent.direction,
                }
            }
            None => {
                agent.stay();
                if destination == agent.position {
                    MoveOutcome::Stayed
                } else {
                    MoveOutcome::Unreachable { target: destination }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::arena::agent::MotionState;
    use crate::domains::arena::bomb::Bomb;
    use crate::domains::arena::rules::{HEIGHT, WIDTH};

    fn open() -> (Grid, BombRegistry) {
        (Grid::empty(WIDTH, HEIGHT), BombRegistry::new())
    }

    #[test]
    fn next_step_walks_straight_toward_the_target() {
        let (grid, bombs) = open();
        let terrain = Terrain::new(&grid, &bombs);
        for x in (1..WIDTH).rev() {
            assert_eq!(
                terrain.shortest_next_step(Position::new(x, 5), Position::new(0, 5)),
                Some(Position::new(x - 1, 5))
            );
        }
        assert_eq!(terrain.shortest_next_step(Position::new(0, 5), Position::new(0, 5)), None);
    }

    #[test]
    fn ties_follow_direction_order() {
        let (grid, bombs) = open();
        let terrain = Terrain::new(&grid, &bombs);
        // up-right diagonal: up comes before right
        assert_eq!(
            terrain.shortest_next_step(Position::new(5, 5), Position::new(6, 4)),
            Some(Position::new(5, 4))
        );
        // down-left diagonal: down comes before left
        assert_eq!(
            terrain.shortest_next_step(Position::new(5, 5), Position::new(4, 6)),
            Some(Position::new(5, 6))
        );
    }

    #[test]
    fn walled_in_source_has_no_path() {
        // 0 . .
        // P 0 X
        // 0 . .
        let (mut grid, bombs) = open();
        for (x, y) in [(0, 4), (1, 5), (0, 6)] {
            grid.place_box(x, y);
        }
        let terrain = Terrain::new(&grid, &bombs);
        assert_eq!(terrain.shortest_next_step(Position::new(0, 5), Position::new(2, 5)), None);
    }

    #[test]
    fn blocked_destination_is_never_reached() {
        let (mut grid, bombs) = open();
        grid.place_box(12, 10);
        let terrain = Terrain::new(&grid, &bombs);
        assert_eq!(terrain.shortest_next_step(Position::new(0, 0), Position::new(12, 10)), None);
    }

    #[test]
    fn path_goes_around_obstacles() {
        let (mut grid, bombs) = open();
        grid.place_box(1, 0);
        let terrain = Terrain::new(&grid, &bombs);
        assert_eq!(
            terrain.shortest_next_step(Position::new(0, 0), Position::new(2, 0)),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn walkable_checks_bounds_boxes_and_aged_bombs() {
        let (mut grid, mut bombs) = open();
        let mut agents = vec![Agent::new(0, "a", Position::new(0, 0))];
        assert!(!Terrain::new(&grid, &bombs).walkable(WIDTH * 2, HEIGHT - 1));
        assert!(!Terrain::new(&grid, &bombs).walkable(WIDTH - 1, HEIGHT * 2));
        assert!(!Terrain::new(&grid, &bombs).walkable(-WIDTH * 2, 0));
        assert!(!Terrain::new(&grid, &bombs).walkable(0, -HEIGHT * 2));

        bombs.place(Bomb::new(0, Position::new(5, 6), 3));
        assert!(Terrain::new(&grid, &bombs).walkable(5, 6));
        bombs.tick_all(&mut agents);
        assert!(!Terrain::new(&grid, &bombs).walkable(5, 6));

        grid.place_box(9, 8);
        let terrain = Terrain::new(&grid, &bombs);
        assert!(!terrain.walkable(9, 8));
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if (x, y) != (5, 6) && (x, y) != (9, 8) {
                    assert!(terrain.walkable(x, y), "({}, {}) should be walkable", x, y);
                }
            }
        }
    }

    #[test]
    fn moving_onto_own_cell_is_a_no_op() {
        let (grid, bombs) = open();
        let mut agent = Agent::new(0, "a", Position::new(0, 0));
        let outcome = Terrain::new(&grid, &bombs).resolve_move(&mut agent, Position::new(0, 0));
        assert_eq!(outcome, MoveOutcome::Stayed);
        assert_eq!(agent.position, Position::new(0, 0));
        assert_eq!(agent.state, MotionState::Idle);
    }

    #[test]
    fn boxed_target_falls_back_to_the_closest_neighbour() {
        let (mut grid, bombs) = open();
        grid.place_box(3, 1);
        let mut agent = Agent::new(0, "a", Position::new(0, 0));
        let terrain = Terrain::new(&grid, &bombs);
        for _ in 0..4 {
            terrain.resolve_move(&mut agent, Position::new(3, 1));
        }
        assert_eq!(agent.position, Position::new(3, 0));

        let outcome = terrain.resolve_move(&mut agent, Position::new(4, 0));
        assert_eq!(agent.position, Position::new(4, 0));
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Position::new(3, 0),
                to: Position::new(4, 0),
                direction: Direction::Right,
            }
        );
    }

    #[test]
    fn fully_enclosed_target_leaves_the_agent_in_place() {
        let (mut grid, bombs) = open();
        for (x, y) in [(6, 5), (5, 4), (7, 4), (6, 3), (6, 4)] {
            grid.place_box(x, y);
        }
        let mut agent = Agent::new(0, "a", Position::new(0, 0));
        let outcome = Terrain::new(&grid, &bombs).resolve_move(&mut agent, Position::new(6, 4));
        assert_eq!(outcome, MoveOutcome::Unreachable { target: Position::new(6, 4) });
        assert_eq!(agent.position, Position::new(0, 0));
        assert_eq!(agent.state, MotionState::Idle);
    }

    #[test]
    fn agent_can_leave_a_cell_holding_its_fresh_bomb() {
        let (grid, mut bombs) = open();
        bombs.place(Bomb::new(0, Position::new(0, 0), 3));
        let mut agent = Agent::new(0, "a", Position::new(0, 0));
        Terrain::new(&grid, &bombs).resolve_move(&mut agent, Position::new(0, 3));
        assert_eq!(agent.position, Position::new(0, 1));
    }
}
