//! Utility functions for short code generation and URL validation.
//!
//! - [`code_generator`] - Random and seeded short code generation
//! - [`url_validator`] - Destination URL validation

pub mod code_generator;
pub mod url_validator;
