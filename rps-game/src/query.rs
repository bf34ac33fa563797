use chrono::{DateTime, Utc};

/// Cached result of one read query.
///
/// A disabled query never runs; it is re-enabled when its input (the
/// connected account) becomes available.
#[derive(Debug, Clone)]
pub struct Query<T> {
    enabled: bool,
    data: Option<T>,
    error: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<T> Query<T> {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            data: None,
            error: None,
            fetched_at: None,
        }
    }

    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Record a finished fetch. A failure keeps the previous data.
    pub fn store(&mut self, result: Result<T, String>) {
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(message) => self.error = Some(message),
        }
        self.fetched_at = Some(Utc::now());
    }
}
