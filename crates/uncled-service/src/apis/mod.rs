//! JSON API endpoints.

pub mod tx;
