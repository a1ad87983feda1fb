//! # FOS Rust Backend
//!
//! Fleet utilization scheduling engine for airline operations.
//!
//! This crate provides the core of the Fleet Operations Scheduler (FOS):
//! aircraft fly recurring routes and undergo periodic maintenance, and the
//! engine keeps every aircraft timeline consistent — at any instant an
//! aircraft is doing at most one thing, maintenance obligations are never
//! silently dropped, and conflicts between new flights and existing
//! commitments are detected and, where possible, resolved automatically.
//!
//! ## Features
//!
//! - **Operation Windows**: full ground-to-ground busy intervals derived
//!   from route, aircraft and ground service data
//! - **Conflict Detection**: pure interval-overlap admission at full
//!   date+time precision
//! - **Maintenance Rescheduling**: deadline-bounded relocation of blocked
//!   maintenance occurrences
//! - **Gap Optimization**: best-effort repositioning of short checks after
//!   schedule changes
//! - **Batch Creation**: up to 14 flights per request with partial-success
//!   semantics
//! - **Block Expansion**: per-calendar-day display blocks for maintenance
//!   patterns over a date range
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: ID newtypes and Data Transfer Objects (DTOs)
//! - [`models`]: domain records and the operation-window time model
//! - [`services`]: scheduling business logic and orchestration
//! - [`db`]: repository traits, errors, and the in-memory implementation
//! - [`config`]: TOML-backed scheduling parameters
//!
//! HTTP routing, request validation, persistence schema and authentication
//! are external collaborators; this crate exposes the service layer they
//! call into.

pub mod api;

pub mod config;
pub mod db;
pub mod models;

pub mod services;
