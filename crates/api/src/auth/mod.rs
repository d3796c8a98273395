//! Authentication primitives.
//!
//! - [`confirmation`] -- stateless, single-use email confirmation codes.
//! - [`jwt`] -- bearer access-token generation and validation.

pub mod confirmation;
pub mod jwt;
