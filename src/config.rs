//! Store configuration.

use serde::Deserialize;
use time::Duration;

/// Behavioural settings shared by every [`SessionStore`](crate::SessionStore)
/// handed out by one [`SessionEngine`](crate::SessionEngine).
///
/// Every field has a default, so the struct can be embedded in an
/// application's own configuration file:
///
/// ```
/// use user_sessions_seaorm_store::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "session_age_secs": 3600 }"#).unwrap();
/// assert_eq!(config.session_age_secs, 3600);
/// assert_eq!(config.max_create_attempts, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a session without a custom expiry, in seconds (default: two weeks).
    pub session_age_secs: u64,

    /// User agent substrings identifying health-check probes whose sessions are never persisted.
    pub health_check_agents: Vec<String>,

    /// Upper bound on key allocation attempts in `create()`.
    pub max_create_attempts: u32,

    /// Payload key holding the authenticated principal's identifier.
    pub auth_user_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_age_secs: default_session_age_secs(),
            health_check_agents: default_health_check_agents(),
            max_create_attempts: default_max_create_attempts(),
            auth_user_key: default_auth_user_key(),
        }
    }
}

fn default_session_age_secs() -> u64 {
    60 * 60 * 24 * 7 * 2
}

fn default_health_check_agents() -> Vec<String> {
    vec![
        "Amazon-Route53-Health-Check-Service".into(),
        "StatusCake".into(),
    ]
}

fn default_max_create_attempts() -> u32 {
    32
}

fn default_auth_user_key() -> String {
    "_auth_user_id".into()
}

impl SessionConfig {
    pub fn with_session_age(mut self, age: Duration) -> Self {
        self.session_age_secs = age.whole_seconds().max(0) as u64;
        self
    }

    pub fn with_health_check_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.health_check_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_create_attempts(mut self, attempts: u32) -> Self {
        self.max_create_attempts = attempts.max(1);
        self
    }

    pub fn with_auth_user_key(mut self, key: impl Into<String>) -> Self {
        self.auth_user_key = key.into();
        self
    }

    /// Default session lifetime as a [`Duration`].
    pub fn session_age(&self) -> Duration {
        Duration::seconds(i64::try_from(self.session_age_secs).unwrap_or(i64::MAX))
    }

    /// Whether `user_agent` belongs to a configured health-check probe.
    pub fn is_health_check(&self, user_agent: Option<&str>) -> bool {
        user_agent.is_some_and(|agent| {
            self.health_check_agents
                .iter()
                .any(|probe| !probe.is_empty() && agent.contains(probe.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.session_age(), Duration::weeks(2));
        assert_eq!(config.auth_user_key, "_auth_user_id");
        assert_eq!(config.max_create_attempts, 32);
        assert_eq!(config.health_check_agents.len(), 2);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{ "health_check_agents": ["Pingdom"] }"#).unwrap();
        assert_eq!(config.health_check_agents, vec!["Pingdom".to_string()]);
        assert_eq!(config.session_age_secs, 1_209_600);
    }

    #[test]
    fn test_health_check_matches_substrings() {
        let config = SessionConfig::default();
        assert!(config.is_health_check(Some("Amazon-Route53-Health-Check-Service (ref abc)")));
        assert!(config.is_health_check(Some("Mozilla/5.0 (StatusCake)")));
        assert!(!config.is_health_check(Some("Mozilla/5.0 (X11; Linux x86_64)")));
        assert!(!config.is_health_check(None));
    }

    #[test]
    fn test_empty_probe_never_matches() {
        let config = SessionConfig::default().with_health_check_agents([""]);
        assert!(!config.is_health_check(Some("anything")));
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_session_age(Duration::hours(1))
            .with_max_create_attempts(0)
            .with_auth_user_key("uid");
        assert_eq!(config.session_age_secs, 3600);
        assert_eq!(config.max_create_attempts, 1);
        assert_eq!(config.auth_user_key, "uid");
    }
}
