//! Storage module for fleet and timeline data.
//!
//! This module provides abstractions for persistence via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP server, batch jobs, etc.)      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services::*) - Business Logic           │
//! │  - Window computation and conflict admission             │
//! │  - Maintenance rescheduling and optimization             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! SQL-backed implementations live outside this crate; they implement the
//! same traits, and [`repository::ScheduleCommit`] gives them the unit of
//! atomicity a transactional backend must honor.

pub mod repositories;
pub mod repository;

pub use repositories::LocalRepository;
pub use repository::{
    ErrorContext, FleetRepository, FullRepository, RepositoryError, RepositoryResult,
    ScheduleCommit, ScheduleRepository,
};
