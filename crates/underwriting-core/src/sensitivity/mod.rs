//! Fixed stress-scenario fan-out over the ratio calculator and projector.

pub mod scenarios;

pub use scenarios::run_scenarios;
