//! Data types for the harvesting pipeline.

pub mod category;
pub mod period;
pub mod record;

pub use category::{CategoryCode, CategoryMap, StandardsEdition};
pub use period::Period;
pub use record::{CrawlOutcome, GazetteRecord};
