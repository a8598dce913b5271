//! dronepath - Plan round-trip drone delivery flight paths around no-fly zones

pub mod api;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod output;
pub mod planner;
pub mod validation;
