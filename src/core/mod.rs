//! Core business logic - framework-agnostic ledger and economy operations.
//!
//! Each submodule is one engine: every public function reads current state,
//! validates, applies a single mutation transaction against the store, and
//! returns a plain result value for the (external) presentation layer. No
//! function here formats user-facing text or keeps state between calls.

/// Habit completion toggling - the daily checklist
pub mod completion;
/// Point-type conversion engine
pub mod convert;
/// Group membership store operations
pub mod group;
/// Habit CRUD, including deletion with balance reconciliation
pub mod habit;
/// Purchase engine for peer and communal rewards
pub mod purchase;
/// Balance reconciliation from source facts
pub mod reconcile;
/// Reward shop CRUD and communal seeding
pub mod reward;
/// Streak recomputation, medal awards, and group achievements
pub mod streak;
/// User store operations and balance primitives
pub mod user;
