//! Module providing the species and reaction tables, and the Model built from them.

pub mod model;
pub mod reaction;
pub mod species;
