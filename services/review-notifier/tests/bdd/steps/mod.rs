//! BDD step definitions for review notifier service

pub mod delivery_steps;
pub mod lifecycle_steps;
