pub mod config;
pub mod constraint;
pub mod document;
pub mod error;
pub mod filer;
pub mod geometry;
pub mod persist;
pub mod topo;

pub use error::{AssocError, AssocResult};

pub fn version() -> &'static str {
    "0.1.0"
}
