//! SKY batch query documents.
//!
//! SKY reads request documents on standard input. This crate pairs the
//! generic [`marshall_core::Document`] with the SKY schema tables (shipped as
//! TOML data in `schema/sky.toml`) and adds the pieces specific to SKY:
//! typed accessors, output-name generation, category path lookup, and a
//! runner that pipes a query into the SKY client.
//!
//! # Example
//!
//! ```rust
//! use marshall_sky::SkyQuery;
//!
//! let mut query = SkyQuery::new().unwrap();
//! query.set_reference_date("2013041600").unwrap();
//! query.set_field("T2M").unwrap();
//! query.set_ensemble_member("5").unwrap();
//!
//! assert_eq!(
//!     query.output_name().unwrap(),
//!     std::path::Path::new("2013041600/m005/T2M"),
//! );
//! ```

pub mod categories;
pub mod error;
pub mod query;
pub mod runner;

pub use categories::category_for_path;
pub use error::{Error, Result};
pub use query::{SCHEMA_TOML, SkyQuery, schema};
pub use runner::QueryRunner;
