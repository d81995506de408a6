//! Adapters implementing domain ports against external systems.

pub mod servicenow;
