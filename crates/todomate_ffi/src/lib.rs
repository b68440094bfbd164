//! Flutter-facing bindings for TodoMate core.

pub mod api;
