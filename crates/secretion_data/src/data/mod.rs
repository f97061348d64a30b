//! Core data structures for the secretion simulation.

pub mod cell;
pub mod entity;
pub mod geometry;
pub mod stats;
