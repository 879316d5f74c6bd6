//! Domain Layer
//!
//! Entities, value objects and repository interfaces. No I/O here.

pub mod entity;
pub mod repository;
pub mod value_object;
