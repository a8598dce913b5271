//! Best-first search over the 16-direction move grid.

use log::{debug, trace};
use std::collections::{BinaryHeap, HashSet};

use super::types::{MoveNode, OpenEntry, PlanError, SearchConfig, SearchResult, SearchStatus};
use crate::config::constants::DRONE_MOVE_DISTANCE;
use crate::geometry::{Coordinate, Heading, Region};

/// Closed-set key: a position snapped to the step-length grid, plus whether
/// the path that reached it has already left the central region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    cell_lng: i64,
    cell_lat: i64,
    has_exited_central: bool,
}

impl StateKey {
    fn new(position: &Coordinate, has_exited_central: bool) -> Self {
        Self {
            cell_lng: (position.lng / DRONE_MOVE_DISTANCE).round() as i64,
            cell_lat: (position.lat / DRONE_MOVE_DISTANCE).round() as i64,
            has_exited_central,
        }
    }
}

/// Finds the headings that take the drone from a start to a goal while
/// staying out of no-fly zones and leaving the central region at most once.
///
/// Nodes are ranked by straight-line distance to the goal alone, so this is a
/// greedy best-first search: it finds a path quickly but not necessarily the
/// shortest one when detours are needed. Each call owns all of its state, so
/// one `Pathfinder` can serve many searches, including from several threads.
pub struct Pathfinder<'a> {
    no_fly_zones: &'a [Region],
    central_region: &'a Region,
    config: SearchConfig,
}

impl<'a> Pathfinder<'a> {
    pub fn new(
        no_fly_zones: &'a [Region],
        central_region: &'a Region,
        config: SearchConfig,
    ) -> Self {
        Self {
            no_fly_zones,
            central_region,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(no_fly_zones: &'a [Region], central_region: &'a Region) -> Self {
        Self::new(no_fly_zones, central_region, SearchConfig::default())
    }

    /// Search for a path from `start` to within one move of `goal`.
    ///
    /// Out-of-range coordinates (in the endpoints or any region) are an error.
    /// An unreachable goal is not: it yields a [`SearchResult`] with no
    /// headings and a status saying why the search stopped.
    pub fn find_path(
        &self,
        start: Coordinate,
        goal: Coordinate,
    ) -> Result<SearchResult, PlanError> {
        trace!(
            "find_path: start=({}, {}) goal=({}, {})",
            start.lng, start.lat, goal.lng, goal.lat
        );

        let start_score = start.distance_to(&goal)?;
        self.validate_regions()?;

        let mut nodes = vec![MoveNode {
            position: start,
            parent: None,
            heading: None,
            has_exited_central: !self.central_region.contains(&start),
        }];
        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut sequence = 0u64;

        open_set.push(OpenEntry {
            score: start_score,
            sequence,
            node: 0,
        });
        sequence += 1;

        let mut nodes_expanded = 0;

        while nodes_expanded < self.config.max_iterations {
            let Some(entry) = open_set.pop() else {
                debug!("search exhausted after expanding {} nodes", nodes_expanded);
                return Ok(SearchResult::failed(SearchStatus::Exhausted, nodes_expanded));
            };

            let position = nodes[entry.node].position;
            let has_exited = nodes[entry.node].has_exited_central;

            if position.is_close_to(&goal)? {
                let headings = reconstruct_path(&nodes, entry.node);
                debug!(
                    "goal reached in {} moves after expanding {} nodes",
                    headings.len(),
                    nodes_expanded
                );
                return Ok(SearchResult {
                    status: SearchStatus::GoalFound,
                    headings,
                    nodes_expanded,
                });
            }

            if !closed_set.insert(StateKey::new(&position, has_exited)) {
                continue;
            }

            let current_in_central = self.central_region.contains(&position);

            for heading in Heading::ALL {
                let candidate = position.step(heading)?;
                if !self.is_legal_move(current_in_central, has_exited, &candidate) {
                    continue;
                }

                let candidate_exited = has_exited || !self.central_region.contains(&candidate);
                if closed_set.contains(&StateKey::new(&candidate, candidate_exited)) {
                    continue;
                }

                let score = candidate.distance_to(&goal)?;
                nodes.push(MoveNode {
                    position: candidate,
                    parent: Some(entry.node),
                    heading: Some(heading),
                    has_exited_central: candidate_exited,
                });
                open_set.push(OpenEntry {
                    score,
                    sequence,
                    node: nodes.len() - 1,
                });
                sequence += 1;
            }

            nodes_expanded += 1;
        }

        debug!(
            "iteration limit of {} reached without finding the goal",
            self.config.max_iterations
        );
        Ok(SearchResult::failed(SearchStatus::IterationLimit, nodes_expanded))
    }

    /// Whether moving from a position to `candidate` is allowed.
    ///
    /// `current_in_central` and `has_exited` describe the position being left.
    pub(crate) fn is_legal_move(
        &self,
        current_in_central: bool,
        has_exited: bool,
        candidate: &Coordinate,
    ) -> bool {
        if !candidate.is_valid() {
            return false;
        }
        if self.no_fly_zones.iter().any(|zone| zone.contains(candidate)) {
            return false;
        }
        // Leaving the central region a second time is not allowed.
        !(current_in_central && has_exited && !self.central_region.contains(candidate))
    }

    fn validate_regions(&self) -> Result<(), PlanError> {
        self.no_fly_zones
            .iter()
            .chain(std::iter::once(self.central_region))
            .try_for_each(|region| {
                region.validate().map_err(|source| PlanError::InvalidRegion {
                    name: region.name.clone(),
                    source,
                })
            })
    }
}

/// Walk parent links back from `goal_node` and return the headings in
/// start-to-goal order.
fn reconstruct_path(nodes: &[MoveNode], goal_node: usize) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current = goal_node;

    while let Some(parent) = nodes[current].parent {
        if let Some(heading) = nodes[current].heading {
            headings.push(heading);
        }
        current = parent;
    }

    headings.reverse();
    headings
}

/// Search for the outbound headings from `start` to `goal`.
///
/// Convenience wrapper around [`Pathfinder::find_path`].
pub fn find_outbound_headings(
    start: Coordinate,
    goal: Coordinate,
    no_fly_zones: &[Region],
    central_region: &Region,
    config: &SearchConfig,
) -> Result<SearchResult, PlanError> {
    Pathfinder::new(no_fly_zones, central_region, config.clone()).find_path(start, goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;

    const S: f64 = DRONE_MOVE_DISTANCE;

    fn far_away_central() -> Region {
        Region::new("central", vec![Coordinate::new(10.0, 10.0)])
    }

    fn rect(name: &str, min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Region {
        Region::new(
            name,
            vec![
                Coordinate::new(min_lng, max_lat),
                Coordinate::new(max_lng, max_lat),
                Coordinate::new(max_lng, min_lat),
                Coordinate::new(min_lng, min_lat),
            ],
        )
    }

    fn replay(start: Coordinate, headings: &[Heading]) -> Vec<Coordinate> {
        let mut points = vec![start];
        let mut current = start;
        for &heading in headings {
            current = current.step(heading).unwrap();
            points.push(current);
        }
        points
    }

    #[test]
    fn test_open_field_straight_line() {
        let central = far_away_central();
        let start = Coordinate::new(0.0, 0.0);
        let goal = Coordinate::new(5.5 * S, 0.0);

        let result = Pathfinder::with_defaults(&[], &central)
            .find_path(start, goal)
            .unwrap();

        assert_eq!(result.status, SearchStatus::GoalFound);
        assert_eq!(result.headings, vec![Heading::Bearing(0); 5]);
    }

    #[test]
    fn test_open_field_goal_five_steps_away() {
        let central = far_away_central();
        let start = Coordinate::new(0.0, 0.0);
        let goal = Coordinate::new(5.0 * S, 0.0);

        let result = Pathfinder::with_defaults(&[], &central)
            .find_path(start, goal)
            .unwrap();

        // After four moves the float gap to 5 * S is a hair under one step,
        // which already counts as close.
        assert_eq!(result.status, SearchStatus::GoalFound);
        assert_eq!(result.headings, vec![Heading::Bearing(0); 4]);

        let end = *replay(start, &result.headings).last().unwrap();
        assert!(end.is_close_to(&goal).unwrap());
    }

    #[test]
    fn test_start_already_at_goal() {
        let central = far_away_central();
        let start = Coordinate::new(1.0, 1.0);

        let result = Pathfinder::with_defaults(&[], &central)
            .find_path(start, start)
            .unwrap();

        assert!(result.is_found());
        assert!(result.headings.is_empty());
        assert_eq!(result.nodes_expanded, 0);
    }

    #[test]
    fn test_blocking_wall_fails_softly() {
        let central = far_away_central();
        let zones = vec![rect("wall", 4.0 * S, -S, 6.0 * S, S)];
        let config = SearchConfig::default().with_max_iterations(2_000);

        let result = find_outbound_headings(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(5.0 * S, 0.0),
            &zones,
            &central,
            &config,
        )
        .unwrap();

        assert_eq!(result.status, SearchStatus::IterationLimit);
        assert!(result.headings.is_empty());
        assert_eq!(result.nodes_expanded, 2_000);
    }

    #[test]
    fn test_enclosed_start_exhausts() {
        let central = far_away_central();
        let zones = vec![
            rect("west", -5.0 * S, -5.0 * S, -3.0 * S, 5.0 * S),
            rect("east", 3.0 * S, -5.0 * S, 5.0 * S, 5.0 * S),
            rect("south", -5.0 * S, -5.0 * S, 5.0 * S, -3.0 * S),
            rect("north", -5.0 * S, 3.0 * S, 5.0 * S, 5.0 * S),
        ];

        let result = find_outbound_headings(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(20.0 * S, 0.0),
            &zones,
            &central,
            &SearchConfig::default(),
        )
        .unwrap();

        assert_eq!(result.status, SearchStatus::Exhausted);
        assert!(result.headings.is_empty());
        assert!(result.nodes_expanded > 0);
    }

    #[test]
    fn test_detour_avoids_no_fly_zone() {
        let central = far_away_central();
        let zones = vec![rect("block", 4.0 * S, -3.0 * S, 6.0 * S, 3.0 * S)];
        let start = Coordinate::new(0.0, 0.0);
        let goal = Coordinate::new(10.0 * S, 0.0);

        let result = find_outbound_headings(start, goal, &zones, &central, &SearchConfig::default())
            .unwrap();

        assert!(result.is_found());
        let points = replay(start, &result.headings);
        assert!(points.last().unwrap().is_close_to(&goal).unwrap());
        for p in &points {
            assert!(!zones[0].contains(p), "path enters no-fly zone at {:?}", p);
        }
    }

    #[test]
    fn test_leaving_central_region_once_is_allowed() {
        let central = rect("central", -2.0 * S, -2.0 * S, 2.0 * S, 2.0 * S);
        let start = Coordinate::new(0.0, 0.0);
        let goal = Coordinate::new(10.0 * S, 0.0);

        let result = find_outbound_headings(start, goal, &[], &central, &SearchConfig::default())
            .unwrap();

        assert!(result.is_found());
        assert!(result.headings.iter().all(|&h| h == Heading::Bearing(0)));
    }

    #[test]
    fn test_path_outside_central_never_reenters_it() {
        // Start and goal are both outside, so the path has already exited and
        // must not cross the central region.
        let central = rect("central", -2.0 * S, -2.0 * S, 2.0 * S, 2.0 * S);
        let start = Coordinate::new(-5.0 * S, 0.0);
        let goal = Coordinate::new(5.0 * S, 0.0);

        let result = find_outbound_headings(start, goal, &[], &central, &SearchConfig::default())
            .unwrap();

        assert!(result.is_found());
        let points = replay(start, &result.headings);
        assert!(points.last().unwrap().is_close_to(&goal).unwrap());
        for p in &points {
            assert!(!central.contains(p), "path re-enters central region at {:?}", p);
        }
    }

    #[test]
    fn test_second_exit_is_illegal() {
        let central = rect("central", -2.0 * S, -2.0 * S, 2.0 * S, 2.0 * S);
        let finder = Pathfinder::with_defaults(&[], &central);
        let outside = Coordinate::new(3.0 * S, 0.0);
        let inside = Coordinate::new(S, 0.0);

        // First exit
        assert!(finder.is_legal_move(true, false, &outside));
        // Exit after having been outside before
        assert!(!finder.is_legal_move(true, true, &outside));
        // Entering is always allowed
        assert!(finder.is_legal_move(false, true, &inside));
        // Moving around inside is always allowed
        assert!(finder.is_legal_move(true, true, &inside));
    }

    #[test]
    fn test_no_fly_candidate_is_illegal() {
        let central = far_away_central();
        let zones = vec![rect("zone", 0.0, 0.0, 1.0, 1.0)];
        let finder = Pathfinder::with_defaults(&zones, &central);

        assert!(!finder.is_legal_move(false, false, &Coordinate::new(0.5, 0.5)));
        assert!(finder.is_legal_move(false, false, &Coordinate::new(1.5, 0.5)));
        assert!(!finder.is_legal_move(false, false, &Coordinate::new(181.0, 0.5)));
    }

    #[test]
    fn test_invalid_start_is_hard_failure() {
        let central = far_away_central();
        let result = find_outbound_headings(
            Coordinate::new(0.0, 91.0),
            Coordinate::new(0.0, 0.0),
            &[],
            &central,
            &SearchConfig::default(),
        );

        assert_eq!(
            result,
            Err(PlanError::InvalidCoordinate(GeometryError::OutOfRange {
                lng: 0.0,
                lat: 91.0
            }))
        );
    }

    #[test]
    fn test_invalid_region_is_hard_failure() {
        let central = far_away_central();
        let zones = vec![Region::new("bad", vec![Coordinate::new(500.0, 0.0)])];
        let result = find_outbound_headings(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(S * 3.0, 0.0),
            &zones,
            &central,
            &SearchConfig::default(),
        );

        assert!(matches!(result, Err(PlanError::InvalidRegion { ref name, .. }) if name == "bad"));
    }

    #[test]
    fn test_search_is_deterministic() {
        let central = rect("central", -2.0 * S, -2.0 * S, 2.0 * S, 2.0 * S);
        let zones = vec![rect("block", 4.0 * S, -3.0 * S, 6.0 * S, 3.0 * S)];
        let start = Coordinate::new(0.0, 0.0);
        let goal = Coordinate::new(10.0 * S, 2.0 * S);
        let finder = Pathfinder::with_defaults(&zones, &central);

        let first = finder.find_path(start, goal).unwrap();
        let second = finder.find_path(start, goal).unwrap();
        assert_eq!(first, second);
    }
}
