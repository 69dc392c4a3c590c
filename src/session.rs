use chrono::{DateTime, Duration, Utc};

use crate::storage::Backend;

pub const LOGGED_IN_KEY: &str = "adminLoggedIn";
pub const LOGIN_TIME_KEY: &str = "loginTime";

/// Sessions older than this are treated as absent.
pub fn max_age() -> Duration {
    Duration::hours(4)
}

/// The admin session flag as read from session storage.
///
/// This gates dashboard commands only. It is not an authentication boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    pub logged_in: bool,
    pub login_time: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn read(backend: &impl Backend) -> anyhow::Result<Self> {
        // Strict on purpose: only "true" and a numeric timestamp count as a session.
        let logged_in = backend.load(LOGGED_IN_KEY)?.as_deref() == Some("true");
        let login_time = backend
            .load(LOGIN_TIME_KEY)?
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis);

        Ok(Self {
            logged_in,
            login_time,
        })
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (self.logged_in, self.login_time) {
            (true, Some(login_time)) => now - login_time <= max_age(),
            _ => false,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.login_time.map(|t| t + max_age())
    }

    pub fn start(backend: &mut impl Backend, now: DateTime<Utc>) -> anyhow::Result<Self> {
        backend.save(LOGGED_IN_KEY, "true")?;
        backend.save(LOGIN_TIME_KEY, &now.timestamp_millis().to_string())?;
        Ok(Self {
            logged_in: true,
            login_time: Some(now),
        })
    }

    pub fn clear(backend: &mut impl Backend) -> anyhow::Result<()> {
        backend.remove(LOGGED_IN_KEY)?;
        backend.remove(LOGIN_TIME_KEY)?;
        Ok(())
    }
}

/// Whether an admin session is active at `now`. A stale flag is removed.
pub fn authenticate(backend: &mut impl Backend, now: DateTime<Utc>) -> anyhow::Result<bool> {
    let session = SessionContext::read(&*backend)?;
    if session.is_active_at(now) {
        return Ok(true);
    }

    if session.logged_in && session.login_time.is_some() {
        tracing::info!(expired_at = ?session.expires_at(), "admin session expired");
        SessionContext::clear(backend)?;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn now_ms() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
    }

    fn login_at(now: DateTime<Utc>) -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        SessionContext::start(&mut backend, now).unwrap();
        backend
    }

    #[test]
    fn fresh_session_is_active() {
        let now = now_ms();
        let mut backend = login_at(now);
        assert!(authenticate(&mut backend, now + Duration::minutes(5)).unwrap());
    }

    #[test]
    fn session_is_active_through_exact_expiry() {
        let now = now_ms();
        let mut backend = login_at(now);
        assert!(authenticate(&mut backend, now + max_age()).unwrap());
    }

    #[test]
    fn expired_session_is_cleared() {
        let now = now_ms();
        let mut backend = login_at(now);

        let later = now + max_age() + Duration::milliseconds(1);
        assert!(!authenticate(&mut backend, later).unwrap());
        assert_eq!(backend.load(LOGGED_IN_KEY).unwrap(), None);
        assert_eq!(backend.load(LOGIN_TIME_KEY).unwrap(), None);
    }

    #[test]
    fn missing_or_garbled_flag_is_inactive() {
        let mut backend = MemoryBackend::new();
        assert!(!authenticate(&mut backend, now_ms()).unwrap());

        backend.save(LOGGED_IN_KEY, "true").unwrap();
        backend.save(LOGIN_TIME_KEY, "yesterday").unwrap();
        assert!(!authenticate(&mut backend, now_ms()).unwrap());

        backend
            .save(LOGIN_TIME_KEY, &now_ms().timestamp_millis().to_string())
            .unwrap();
        backend.save(LOGGED_IN_KEY, "yes").unwrap();
        assert!(!authenticate(&mut backend, now_ms()).unwrap());

        backend.save(LOGGED_IN_KEY, "false").unwrap();
        backend
            .save(LOGIN_TIME_KEY, &now_ms().timestamp_millis().to_string())
            .unwrap();
        assert!(!authenticate(&mut backend, now_ms()).unwrap());
    }

    #[test]
    fn stores_login_time_as_epoch_millis() {
        let now = DateTime::from_timestamp_millis(1_770_000_000_123).unwrap();
        let backend = login_at(now);

        assert_eq!(
            backend.load(LOGIN_TIME_KEY).unwrap().as_deref(),
            Some("1770000000123")
        );
        let session = SessionContext::read(&backend).unwrap();
        assert_eq!(session.login_time, Some(now));
        assert_eq!(session.expires_at(), Some(now + Duration::hours(4)));
    }

    #[test]
    fn clear_logs_out() {
        let now = now_ms();
        let mut backend = login_at(now);
        SessionContext::clear(&mut backend).unwrap();
        assert!(!authenticate(&mut backend, now).unwrap());
    }
}
