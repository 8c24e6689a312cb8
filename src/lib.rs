//! Greenhouse digital twin.
//!
//! Polls a sensor feed into one reconciled snapshot (falling back to a
//! bounded random walk when the feed is down) and drives a set of
//! procedural animators from it once per rendered frame.

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod sensor;
pub mod simulation;
pub mod telemetry;
