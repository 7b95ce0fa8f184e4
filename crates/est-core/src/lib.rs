//! # est-core
//!
//! Core types, estimate construction, and the costing engine for Estima.
//!
//! This crate provides everything that does not touch storage:
//! - Entity structs for all domain objects (roles, estimates, bindings, tasks)
//! - Wire enums with fixed string representations
//! - The client-submitted input document and its validation
//! - `EstimateDraft`, the in-memory building state for a new estimate
//! - The pure costing engine (cost, revenue, margin, working days)
//! - Cross-cutting error types

pub mod costing;
pub mod draft;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod input;
