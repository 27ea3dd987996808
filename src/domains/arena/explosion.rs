//! Blast resolution for one turn.
//!
//! Detonations are processed breadth first from a FIFO queue so chain
//! reactions fan out in the order they are triggered. Box credit is only
//! handed out once every ray has been cast, which is what lets two owners
//! share a box hit in the same pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use tracing::debug;

use super::agent::{return_bomb, Agent, AgentId};
use super::bomb::{Bomb, BombRegistry};
use super::grid::Grid;
use super::position::{Direction, Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyedBox {
    pub position: Position,
    /// Every distinct owner whose blast reached the box, ascending.
    pub credited: Vec<AgentId>,
}

/// What a propagation pass did.
#[derive(Debug, Clone, Default)]
pub struct Blast {
    pub scorched: HashSet<Position>,
    pub destroyed_boxes: Vec<DestroyedBox>,
    /// Bombs in the order they went off, seeds first.
    pub detonated: Vec<Bomb>,
    /// Subset of `detonated` that was set off by another blast.
    pub chained: Vec<Bomb>,
}

/// Resolves the explosions of `seeds`, bombs whose timer already reached zero.
///
/// Mutates the grid (destroyed boxes), the registry (chain-triggered and
/// detonated bombs are removed) and the agents (bombs returned, score).
pub fn propagate(grid: &mut Grid, bombs: &mut BombRegistry, agents: &mut [Agent], seeds: Vec<Bomb>) -> Blast {
    let mut blast = Blast::default();
    if seeds.is_empty() {
        bombs.remove_detonated();
        return blast;
    }

    let mut queued: HashSet<Position> = seeds.iter().map(|bomb| bomb.position).collect();
    let mut box_hit_by: BTreeMap<Position, BTreeSet<AgentId>> = BTreeMap::new();
    let mut queue: VecDeque<Bomb> = seeds.into_iter().collect();

    while let Some(bomb) = queue.pop_front() {
        blast.scorched.insert(bomb.position);

        for direction in Direction::ALL {
            for distance in 1..bomb.range as i32 {
                let cell = bomb.position.offset(direction, distance);
                if !grid.contains(cell) {
                    break;
                }
                blast.scorched.insert(cell);

                if grid.is_box(cell.x, cell.y) {
                    box_hit_by.entry(cell).or_default().insert(bomb.owner_id);
                    break;
                }

                if let Some(other) = bombs.bomb_at_mut(cell) {
                    if other.timer > 0 && queued.insert(cell) {
                        debug!(?bomb, ?other, "blast sets off a neighbouring bomb");
                        other.timer = 0;
                        let triggered = *other;
                        return_bomb(agents, triggered.owner_id);
                        blast.chained.push(triggered);
                        queue.push_back(triggered);
                    }
                    break;
                }
            }
        }

        blast.detonated.push(bomb);
    }

    for (position, owners) in box_hit_by {
        if grid.clear_box(position.x, position.y) {
            for owner_id in &owners {
                if let Some(owner) = agents.get_mut(*owner_id) {
                    owner.score += 1;
                }
            }
            blast.destroyed_boxes.push(DestroyedBox {
                position,
                credited: owners.into_iter().collect(),
            });
        }
    }

    bombs.remove_detonated();
    blast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::arena::rules::{BOMB_RANGE, HEIGHT, WIDTH};

    fn setup() -> (Grid, BombRegistry, Vec<Agent>) {
        (
            Grid::empty(WIDTH, HEIGHT),
            BombRegistry::new(),
            vec![
                Agent::new(0, "a", Position::new(0, 0)),
                Agent::new(1, "b", Position::new(12, 10)),
            ],
        )
    }

    fn primed(owner_id: AgentId, x: i32, y: i32) -> Bomb {
        let mut bomb = Bomb::new(owner_id, Position::new(x, y), BOMB_RANGE);
        bomb.timer = 0;
        bomb
    }

    #[test]
    fn open_grid_blast_is_a_cross_without_corners() {
        let (mut grid, mut bombs, mut agents) = setup();
        let blast = propagate(&mut grid, &mut bombs, &mut agents, vec![primed(0, 3, 7)]);

        let expected: HashSet<Position> = [
            (3, 7), (4, 7), (5, 7), (2, 7), (1, 7),
            (3, 8), (3, 9), (3, 6), (3, 5),
        ]
        .into_iter()
        .map(|(x, y)| Position::new(x, y))
        .collect();
        assert_eq!(blast.scorched, expected);
        assert_eq!(blast.detonated.len(), 1);
        assert!(blast.chained.is_empty());
    }

    #[test]
    fn rays_stop_at_the_grid_edge() {
        let (mut grid, mut bombs, mut agents) = setup();
        let blast = propagate(&mut grid, &mut bombs, &mut agents, vec![primed(0, 0, 0)]);
        let expected: HashSet<Position> = [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)]
            .into_iter()
            .map(|(x, y)| Position::new(x, y))
            .collect();
        assert_eq!(blast.scorched, expected);
    }

    #[test]
    fn first_box_is_destroyed_and_shields_the_next() {
        let (mut grid, mut bombs, mut agents) = setup();
        grid.place_box(6, 7);
        grid.place_box(6, 8);

        let blast = propagate(&mut grid, &mut bombs, &mut agents, vec![primed(0, 6, 6)]);

        assert!(!grid.is_box(6, 7));
        assert!(grid.is_box(6, 8));
        assert!(!blast.scorched.contains(&Position::new(6, 8)));
        assert_eq!(agents[0].score, 1);
        assert_eq!(blast.destroyed_boxes.len(), 1);
    }

    #[test]
    fn boxes_at_the_end_of_every_ray_are_destroyed() {
        let (mut grid, mut bombs, mut agents) = setup();
        let boxes = [(6, 8), (6, 4), (8, 6), (4, 6)];
        for (x, y) in boxes {
            grid.place_box(x, y);
        }
        propagate(&mut grid, &mut bombs, &mut agents, vec![primed(0, 6, 6)]);
        assert!(boxes.iter().all(|(x, y)| !grid.is_box(*x, *y)));
        assert_eq!(agents[0].score, 4);
    }

    #[test]
    fn two_owners_hitting_the_same_box_both_score() {
        // B0.....
        // .......
        // .B.....
        let (mut grid, mut bombs, mut agents) = setup();
        grid.place_box(1, 0);
        let seeds = vec![primed(0, 0, 0), primed(1, 1, 2)];
        bombs.place(seeds[0]);
        bombs.place(seeds[1]);

        let blast = propagate(&mut grid, &mut bombs, &mut agents, seeds);

        assert!(bombs.is_empty());
        assert!(!grid.is_box(1, 0));
        assert_eq!(agents[0].score, 1);
        assert_eq!(agents[1].score, 1);
        assert_eq!(blast.destroyed_boxes[0].credited, vec![0, 1]);
    }

    #[test]
    fn one_box_shields_what_lies_behind_it_from_both_bombs() {
        // ..0....
        // .B00...
        // ..B....
        let (mut grid, mut bombs, mut agents) = setup();
        grid.place_box(2, 0);
        grid.place_box(2, 1);
        grid.place_box(3, 1);
        let seeds = vec![primed(0, 1, 1), primed(1, 2, 2)];
        bombs.place(seeds[0]);
        bombs.place(seeds[1]);

        propagate(&mut grid, &mut bombs, &mut agents, seeds);

        assert!(bombs.is_empty());
        assert!(!grid.is_box(2, 1));
        assert!(grid.is_box(2, 0));
        assert!(grid.is_box(3, 1));
        assert_eq!((agents[0].score, agents[1].score), (1, 1));
    }

    #[test]
    fn blast_sets_off_a_bomb_in_range() {
        let (mut grid, mut bombs, mut agents) = setup();
        agents[1].bombs_left = 0;
        bombs.place(Bomb::new(1, Position::new(4, 7), BOMB_RANGE));

        let blast = propagate(&mut grid, &mut bombs, &mut agents, vec![primed(0, 4, 5)]);

        assert!(bombs.is_empty());
        assert_eq!(agents[1].bombs_left, 1);
        assert_eq!(blast.chained.len(), 1);
        assert_eq!(blast.detonated.len(), 2);
        // the chained bomb's own cross is applied
        assert!(blast.scorched.contains(&Position::new(4, 8)));
        assert!(blast.scorched.contains(&Position::new(6, 7)));
    }

    #[test]
    fn a_bomb_in_the_ray_stops_it() {
        let (mut grid, mut bombs, mut agents) = setup();
        let mut long = primed(0, 0, 5);
        long.range = 6;
        bombs.place(Bomb::new(1, Position::new(2, 5), 1));

        let blast = propagate(&mut grid, &mut bombs, &mut agents, vec![long]);

        // the range-1 chained bomb only scorches its own cell
        assert!(blast.scorched.contains(&Position::new(2, 5)));
        assert!(!blast.scorched.contains(&Position::new(3, 5)));
        assert!(blast.scorched.contains(&Position::new(0, 10)));
    }

    #[test]
    fn an_already_queued_bomb_still_stops_a_ray() {
        // box C S B .....   S sets off B and C; B's left ray must stop at C
        let (mut grid, mut bombs, mut agents) = setup();
        agents.push(Agent::new(2, "c", Position::new(12, 0)));
        grid.place_box(2, 5);
        bombs.place(Bomb::new(1, Position::new(6, 5), 6));
        bombs.place(Bomb::new(2, Position::new(4, 5), 6));
        let mut seed = primed(0, 5, 5);
        seed.range = 2;

        let blast = propagate(&mut grid, &mut bombs, &mut agents, vec![seed]);

        assert_eq!(blast.chained.len(), 2);
        assert!(!grid.is_box(2, 5));
        assert_eq!(blast.destroyed_boxes[0].credited, vec![2]);
        let scores: Vec<u32> = agents.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![0, 0, 1]);
    }

    #[test]
    fn chain_reaction_credits_the_box_to_the_chained_owner() {
        let (mut grid, mut bombs, mut agents) = setup();
        grid.place_box(8, 5);
        bombs.place(Bomb::new(1, Position::new(6, 5), BOMB_RANGE));

        propagate(&mut grid, &mut bombs, &mut agents, vec![primed(0, 4, 5)]);

        assert!(!grid.is_box(8, 5));
        assert_eq!(agents[0].score, 0);
        assert_eq!(agents[1].score, 1);
    }
}
