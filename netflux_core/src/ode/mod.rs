//! Module for compiling a Model into a system of normalized ordinary differential equations

pub mod expression;
pub mod logic;
pub mod system;
