//! Module for reading and writing Models and their exports
pub mod csv;
pub mod json;
pub mod rule_parse;
pub mod xgmml;
