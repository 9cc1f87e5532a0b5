#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod routes;
pub mod scoring;
pub mod time;

pub use catalog::{CatalogError, QuizCatalog};
pub use error::Error;
pub use scoring::BandFallback;
pub use time::Clock;
