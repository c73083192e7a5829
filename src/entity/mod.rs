//! Database entity models for user-sessions-seaorm-store.
//!
//! The primary entity in this module is the `session` entity, which represents
//! the `sessions` table holding one row per user session.

/// Session entity model for Sea-ORM database interaction.
pub mod session;
