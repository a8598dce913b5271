//! Round-trip flight plan assembly.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::pathfinder::Pathfinder;
use super::types::{PlanError, SearchConfig};
use crate::geometry::{Coordinate, Heading, Region};

/// One move of a delivery flight.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub order_no: String,
    pub from: Coordinate,
    pub heading: Heading,
    pub to: Coordinate,
}

impl Serialize for MoveRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("MoveRecord", 6)?;
        row.serialize_field("orderNo", &self.order_no)?;
        row.serialize_field("fromLongitude", &self.from.lng)?;
        row.serialize_field("fromLatitude", &self.from.lat)?;
        row.serialize_field("angle", &self.heading)?;
        row.serialize_field("toLongitude", &self.to.lng)?;
        row.serialize_field("toLatitude", &self.to.lat)?;
        row.end()
    }
}

/// Headings for the return leg: the outbound legs in reverse order, each
/// turned around by 180°.
///
/// Every move has the same length, so retracing a move backwards is the same
/// move in the opposite direction.
pub fn return_headings(outbound: &[Heading]) -> Vec<Heading> {
    outbound.iter().rev().map(Heading::reversed).collect()
}

/// Build the full move list for one delivery: out to the target, hover,
/// back to the depot, hover.
///
/// An outbound path of `n` moves produces `2n + 2` records. An empty outbound
/// path means no flight and is rejected with [`PlanError::EmptyPath`].
pub fn build_round_trip(
    order_no: &str,
    depot: Coordinate,
    outbound: &[Heading],
) -> Result<Vec<MoveRecord>, PlanError> {
    if outbound.is_empty() {
        return Err(PlanError::EmptyPath);
    }

    let headings = outbound
        .iter()
        .copied()
        .chain(std::iter::once(Heading::Hover))
        .chain(return_headings(outbound))
        .chain(std::iter::once(Heading::Hover));

    let mut moves = Vec::with_capacity(outbound.len() * 2 + 2);
    let mut from = depot;
    for heading in headings {
        let to = from.step(heading)?;
        moves.push(MoveRecord {
            order_no: order_no.to_string(),
            from,
            heading,
            to,
        });
        from = to;
    }

    Ok(moves)
}

/// Every position the drone occupies: the depot, then the end of each move.
pub fn waypoints(depot: Coordinate, moves: &[MoveRecord]) -> Vec<Coordinate> {
    std::iter::once(depot)
        .chain(moves.iter().map(|m| m.to))
        .collect()
}

/// Plan a delivery from `depot` to `target` and back.
///
/// A search that ends without reaching the target is reported as
/// [`PlanError::NoPath`] carrying the reason the search stopped. A depot
/// already within reach of the target gives [`PlanError::EmptyPath`]; both
/// answer true to [`PlanError::is_no_path`].
pub fn plan_delivery(
    order_no: &str,
    depot: Coordinate,
    target: Coordinate,
    no_fly_zones: &[Region],
    central_region: &Region,
    config: &SearchConfig,
) -> Result<Vec<MoveRecord>, PlanError> {
    let result =
        Pathfinder::new(no_fly_zones, central_region, config.clone()).find_path(depot, target)?;
    if !result.is_found() {
        return Err(PlanError::NoPath(result.status));
    }
    build_round_trip(order_no, depot, &result.headings)
}
