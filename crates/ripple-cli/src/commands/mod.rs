//! CLI command implementations.

pub mod common;
pub mod graphs;
pub mod inspect;
pub mod run;
pub mod validate;
