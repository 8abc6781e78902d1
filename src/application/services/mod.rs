//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, SchemaProvider, RecordAccessor)
//! but are themselves concrete structs, not traits.

mod schema_store;
mod structured_data;

pub use schema_store::SchemaStore;
pub use structured_data::StructuredDataService;
