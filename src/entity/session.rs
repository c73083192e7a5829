//! Session entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation for user sessions.
//! It provides the Sea-ORM entity definition that maps to the `sessions` table
//! created by the crate's migrator.

use sea_orm::entity::prelude::*;

/// Maximum number of characters of the user agent that is persisted.
pub const USER_AGENT_MAX_LEN: usize = 200;

/// Sea-ORM entity model representing one user session row.
///
/// # Database Schema
///
/// | Column       | Type                    | Description                           |
/// |--------------|-------------------------|---------------------------------------|
/// | session_key  | TEXT (Primary Key)      | Opaque, URL-safe session key          |
/// | session_data | TEXT                    | Codec-encoded session payload         |
/// | expire_date  | TIMESTAMPTZ             | Exclusive upper bound on validity     |
/// | user_agent   | VARCHAR(200) NULL       | Client user agent, truncated          |
/// | user_id      | TEXT NULL               | Owning principal, `NULL` if anonymous |
/// | ip           | VARCHAR(45) NULL        | Client address (IPv4 or IPv6)         |
///
/// # Usage
///
/// Rows are written by [`SessionStore`](crate::SessionStore) and the
/// [`SeaOrmStore`](crate::SeaOrmStore) adapter. Reading them directly is
/// useful for "active sessions" listings, see
/// [`SessionRepository::find_by_user`](crate::SessionRepository::find_by_user).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// The unique session key.
    ///
    /// Primary key of the table; the storage-level uniqueness constraint on
    /// this column is what makes concurrent key allocation safe.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub session_key: String,

    /// The encoded session payload, as produced by a
    /// [`SessionCodec`](crate::SessionCodec).
    #[sea_orm(column_type = "Text")]
    pub session_data: String,

    /// The session expiration timestamp.
    ///
    /// A session is live only while this is strictly in the future. Expired
    /// rows are filtered out on load and removed by
    /// [`clear_expired`](crate::clear_expired).
    pub expire_date: DateTimeWithTimeZone,

    /// The user agent the session was last saved with.
    pub user_agent: Option<String>,

    /// Identifier of the authenticated principal, `None` for anonymous sessions.
    pub user_id: Option<String>,

    /// The client address the session was last saved with.
    pub ip: Option<String>,
}

/// Required enum for Sea-ORM entity relations.
///
/// The user table belongs to the embedding application, so no relation is declared.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
