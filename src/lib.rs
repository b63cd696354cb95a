//! Mend: Self-Healing Configuration Files
//!
//! A schema-constrained key-value store persisted to an annotated text file.
//! Values that go missing, fail to parse or fall outside their allowed set are
//! repaired to the schema default and the repair is written back.

pub mod error;
pub mod format;
pub mod logging;
pub mod schema;
pub mod store;
pub mod validation;

pub use error::{LoggingError, StoreError};
pub use schema::{KeySpec, SchemaProvider, StaticSchema, ValidationRule};
pub use store::{ConfigStore, FileOpener, FsOpener};
