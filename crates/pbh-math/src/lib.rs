//! Numerical primitives for the SCPN Beta-PBH engine.
//!
//! Every iterative routine here takes an explicit tolerance and an iteration
//! cap and reports `PbhError::NonConvergence` instead of looping forever.

pub mod ode;
pub mod quadrature;
pub mod roots;
pub mod special;
