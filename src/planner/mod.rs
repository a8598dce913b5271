//! Outbound path search and round-trip flight plan assembly.

pub mod flight_plan;
pub mod pathfinder;
mod types;

pub use flight_plan::{MoveRecord, build_round_trip, plan_delivery, return_headings, waypoints};
pub use pathfinder::{Pathfinder, find_outbound_headings};
pub use types::{PlanError, SearchConfig, SearchResult, SearchStatus};
