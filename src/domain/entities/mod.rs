//! Core domain entities.
//!
//! The service has a single entity, [`UrlRecord`], the mapping between a short
//! code and its destination. Following the "New Type" pattern, creation and
//! modification use dedicated structs:
//!
//! - [`NewUrlRecord`] - Input for inserting a record
//! - [`UrlPatch`] - Input for overwriting the destination of a record

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlPatch, UrlRecord};
