//! Domain model for tasks, life areas, and weekly goals.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services, and stats.
//! - Own field-level validation so every write path enforces the same rules.
//!
//! # Invariants
//! - Tasks are identified by a stable `TaskId` generated on creation.
//! - Life areas and weekly goals use SQLite rowids.
//! - Timestamps are Unix epoch milliseconds.

pub mod life_area;
pub mod task;
pub mod weekly_goal;
