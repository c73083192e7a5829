//! Access to the `sessions` table.

use std::fmt::Debug;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};
use time::OffsetDateTime;

use crate::clock::to_db_datetime;
use crate::entity::session::{
    self, ActiveModel as SessionActiveModel, Entity as SessionEntity, Model as SessionRow,
};
use crate::error::{StorageError, UniqueColumn};

pub type StorageResult<T> = Result<T, StorageError>;

/// Repository over persisted session rows.
///
/// [`SessionStore`](crate::SessionStore) only talks to storage through this
/// trait, so tests and alternative backends can supply their own.
#[async_trait]
pub trait SessionRepository: Debug + Send + Sync {
    /// Row with exactly this key, expired or not.
    async fn find(&self, session_key: &str) -> StorageResult<Option<SessionRow>>;

    /// Row with this key whose `expire_date` is strictly after `now`.
    async fn find_live(
        &self,
        session_key: &str,
        now: OffsetDateTime,
    ) -> StorageResult<Option<SessionRow>>;

    /// Whether a row with this key exists, expired or not.
    async fn exists(&self, session_key: &str) -> StorageResult<bool>;

    /// Unconditional insert. A duplicate key must surface as
    /// `StorageError::UniqueViolation { column: UniqueColumn::SessionKey }`.
    async fn insert(&self, row: SessionRow) -> StorageResult<()>;

    /// Insert, or replace every column of the row with the same key.
    async fn upsert(&self, row: SessionRow) -> StorageResult<()>;

    /// Like [`upsert`](Self::upsert), but an existing row keeps its stored
    /// `user_agent` and `ip`.
    async fn upsert_payload(&self, row: SessionRow) -> StorageResult<()>;

    /// Deletes the row with this key; a missing row is not an error.
    async fn delete(&self, session_key: &str) -> StorageResult<()>;

    /// Deletes every row with `expire_date` strictly before `now`.
    async fn delete_expired(&self, now: OffsetDateTime) -> StorageResult<u64>;

    /// Live rows owned by `user_id`, soonest expiry first.
    async fn find_by_user(
        &self,
        user_id: &str,
        now: OffsetDateTime,
    ) -> StorageResult<Vec<SessionRow>>;
}

/// [`SessionRepository`] over a Sea-ORM connection.
///
/// Works with any backend Sea-ORM supports that understands
/// `INSERT ... ON CONFLICT`; PostgreSQL and SQLite are covered by the crate's
/// features.
#[derive(Debug, Clone)]
pub struct SeaOrmRepository {
    conn: DatabaseConnection,
}

impl SeaOrmRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Attributes a failed write to a column.
    ///
    /// The violation detail names the primary key on the supported backends
    /// (PostgreSQL reports the `sessions_pkey` constraint, SQLite the
    /// `sessions.session_key` column), which settles it without another query.
    /// Anything else falls back to checking whether the key is now taken.
    async fn classify(&self, err: DbErr, session_key: &str) -> StorageError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                if names_session_key(&detail) {
                    return StorageError::UniqueViolation {
                        column: UniqueColumn::SessionKey,
                    };
                }
                match self.exists(session_key).await {
                    Ok(true) => StorageError::UniqueViolation {
                        column: UniqueColumn::SessionKey,
                    },
                    Ok(false) => StorageError::UniqueViolation {
                        column: UniqueColumn::Other(detail),
                    },
                    Err(lookup) => lookup,
                }
            }
            _ => StorageError::Database(err),
        }
    }

    /// Inserts `row`, or updates `columns` of the row already using its key.
    async fn upsert_columns(
        &self,
        row: SessionRow,
        columns: &[session::Column],
    ) -> StorageResult<()> {
        let session_key = row.session_key.clone();
        let txn = self.conn.begin().await?;

        let written = SessionEntity::insert(active_model(row))
            .on_conflict(
                OnConflict::column(session::Column::SessionKey)
                    .update_columns(columns.iter().copied())
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await;

        match written {
            Ok(_) => {
                txn.commit().await?;
                Ok(())
            }
            Err(err) => {
                txn.rollback().await?;
                Err(self.classify(err, &session_key).await)
            }
        }
    }
}

fn names_session_key(detail: &str) -> bool {
    detail.contains("sessions_pkey") || detail.contains("sessions.session_key")
}

fn db_now(now: OffsetDateTime) -> StorageResult<sea_orm::prelude::DateTimeWithTimeZone> {
    to_db_datetime(now).map_err(|e| StorageError::Database(DbErr::Custom(e.to_string())))
}

fn active_model(row: SessionRow) -> SessionActiveModel {
    SessionActiveModel {
        session_key: Set(row.session_key),
        session_data: Set(row.session_data),
        expire_date: Set(row.expire_date),
        user_agent: Set(row.user_agent),
        user_id: Set(row.user_id),
        ip: Set(row.ip),
    }
}

#[async_trait]
impl SessionRepository for SeaOrmRepository {
    async fn find(&self, session_key: &str) -> StorageResult<Option<SessionRow>> {
        Ok(SessionEntity::find_by_id(session_key.to_owned())
            .one(&self.conn)
            .await?)
    }

    async fn find_live(
        &self,
        session_key: &str,
        now: OffsetDateTime,
    ) -> StorageResult<Option<SessionRow>> {
        Ok(SessionEntity::find_by_id(session_key.to_owned())
            .filter(session::Column::ExpireDate.gt(db_now(now)?))
            .one(&self.conn)
            .await?)
    }

    async fn exists(&self, session_key: &str) -> StorageResult<bool> {
        let count = SessionEntity::find()
            .filter(session::Column::SessionKey.eq(session_key))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, row: SessionRow) -> StorageResult<()> {
        let session_key = row.session_key.clone();
        let txn = self.conn.begin().await?;

        let inserted = SessionEntity::insert(active_model(row))
            .exec_without_returning(&txn)
            .await;

        match inserted {
            Ok(_) => {
                txn.commit().await?;
                Ok(())
            }
            Err(err) => {
                txn.rollback().await?;
                Err(self.classify(err, &session_key).await)
            }
        }
    }

    async fn upsert(&self, row: SessionRow) -> StorageResult<()> {
        self.upsert_columns(
            row,
            &[
                session::Column::SessionData,
                session::Column::ExpireDate,
                session::Column::UserAgent,
                session::Column::UserId,
                session::Column::Ip,
            ],
        )
        .await
    }

    async fn upsert_payload(&self, row: SessionRow) -> StorageResult<()> {
        self.upsert_columns(
            row,
            &[
                session::Column::SessionData,
                session::Column::ExpireDate,
                session::Column::UserId,
            ],
        )
        .await
    }

    async fn delete(&self, session_key: &str) -> StorageResult<()> {
        SessionEntity::delete_by_id(session_key.to_owned())
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> StorageResult<u64> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpireDate.lt(db_now(now)?))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        now: OffsetDateTime,
    ) -> StorageResult<Vec<SessionRow>> {
        Ok(SessionEntity::find()
            .filter(session::Column::UserId.eq(user_id))
            .filter(session::Column::ExpireDate.gt(db_now(now)?))
            .order_by_asc(session::Column::ExpireDate)
            .all(&self.conn)
            .await?)
    }
}
