//! Use-case services (action layer).
//!
//! # Responsibility
//! - Orchestrate write models, read projections and cascades into use-case
//!   level APIs.
//! - Keep the boundary layer decoupled from storage details.

pub mod category_action;
pub mod resource_action;
