//! Core rust implementation of Netflux, compiling logic-based signaling network rules into
//! normalized-Hill ordinary differential equations.

pub mod configuration;
pub mod io;
pub mod logic_model;
pub mod network;
pub mod ode;
