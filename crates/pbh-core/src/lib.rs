//! PBH abundance bounds: evolution model, constraint channels and envelopes.
//!
//! Stage 1: mass grid, cosmological background, evolution model
//! Stage 2: constraint channels, aggregation, sessions, result tables

pub mod aggregate;
pub mod backreaction;
pub mod channels;
pub mod cosmology;
pub mod evolution;
pub mod grid;
pub mod session;
pub mod table;
