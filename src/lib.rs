//! Intersection Simulation Library
//!
//! A four-way signalized intersection simulation that runs headless and can be
//! driven tick by tick from any host loop.

pub mod simulation;
