//! API schema types for JSON response bodies.

pub mod health;
