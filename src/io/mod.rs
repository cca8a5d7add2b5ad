//! Readers and writers for the files the pipeline consumes and produces.

use std::fmt;

pub mod error;
pub mod raw;
pub mod routes;
pub mod stock;
pub mod targets;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Targets,
    RawPredictions,
    Routes,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Targets => write!(f, "targets"),
            Format::RawPredictions => write!(f, "raw predictions"),
            Format::Routes => write!(f, "routes"),
        }
    }
}
