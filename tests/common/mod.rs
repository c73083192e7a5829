#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use time::{Duration, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;
use user_sessions_seaorm_store::entity::session::{Entity as SessionEntity, Model as SessionRow};
use user_sessions_seaorm_store::migration::{Migrator, MigratorTrait};
use user_sessions_seaorm_store::{
    Clock, KeyGenerator, RandomKeyGenerator, SeaOrmRepository, SessionCodec, SessionConfig,
    SessionData, SessionEngine, SessionRepository, SignedCodec,
};

pub const SECRET: &str = "test-secret";

/// 2024-01-01T00:00:00Z
pub fn t0() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_704_067_200).unwrap()
}

pub async fn connect() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let conn = Database::connect(opt).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    conn
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Hands out queued keys first, then random ones.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    queue: Mutex<VecDeque<String>>,
}

impl ScriptedKeys {
    pub fn new<I: IntoIterator<Item = &'static str>>(keys: I) -> Self {
        Self {
            queue: Mutex::new(keys.into_iter().map(String::from).collect()),
        }
    }
}

impl KeyGenerator for ScriptedKeys {
    fn generate(&self) -> String {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RandomKeyGenerator.generate())
    }
}

/// Always proposes the same key.
#[derive(Debug)]
pub struct RepeatingKey(pub &'static str);

impl KeyGenerator for RepeatingKey {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

pub struct Harness {
    pub conn: DatabaseConnection,
    pub repository: SeaOrmRepository,
    pub engine: SessionEngine,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(SessionConfig::default()).await
    }

    pub async fn with_config(config: SessionConfig) -> Self {
        let conn = connect().await;
        let repository = SeaOrmRepository::new(conn.clone());
        let engine = SessionEngine::new(repository.clone(), SignedCodec::new(SECRET))
            .with_config(config)
            .with_clock(FixedClock(t0()));
        Self {
            conn,
            repository,
            engine,
        }
    }

    pub fn with_keys(mut self, keys: impl KeyGenerator + 'static) -> Self {
        self.engine = self.engine.with_key_generator(keys);
        self
    }

    pub async fn row(&self, session_key: &str) -> Option<SessionRow> {
        self.repository.find(session_key).await.unwrap()
    }

    pub async fn row_count(&self) -> u64 {
        SessionEntity::find().count(&self.conn).await.unwrap()
    }

    /// Inserts a row directly, bypassing the store.
    pub async fn seed(&self, session_key: &str, data: &SessionData, expire_date: OffsetDateTime) {
        let row = SessionRow {
            session_key: session_key.to_string(),
            session_data: SignedCodec::new(SECRET).encode(data).unwrap(),
            expire_date: chrono::DateTime::from_timestamp(expire_date.unix_timestamp(), 0)
                .unwrap()
                .into(),
            user_agent: None,
            user_id: None,
            ip: None,
        };
        self.repository.insert(row).await.unwrap();
    }

    pub fn decode(&self, row: &SessionRow) -> SessionData {
        SignedCodec::new(SECRET).decode(&row.session_data).unwrap()
    }
}

pub fn expires_in(secs: i64) -> OffsetDateTime {
    t0() + Duration::seconds(secs)
}

/// Records the target and level of every event.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<(String, Level)>>>);

impl CapturedEvents {
    pub fn contains(&self, target: &str, level: Level) -> bool {
        self.0
            .lock()
            .unwrap()
            .iter()
            .any(|(t, l)| t == target && *l == level)
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        self.0
            .lock()
            .unwrap()
            .push((meta.target().to_string(), *meta.level()));
    }
}
