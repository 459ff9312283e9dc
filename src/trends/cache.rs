//! TTL cache over the `trend_queries` table. A cached result is returned
//! for repeated lookups of the same (keyword, locale, range) key until it
//! ages out; `--refresh` bypasses the lookup but still overwrites the entry.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::db::models::TrendQueryRow;
use crate::db::Database;
use crate::trends::TrendResult;

/// Cached results are served for this long after they were stored.
pub const CACHE_TTL_MINUTES: i64 = 60;

/// Time source, injectable so expiry is testable without sleeping.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct TrendCache<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    ttl: Duration,
}

impl<'a> TrendCache<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self {
            db,
            clock,
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
        }
    }

    /// Fresh cached row for the key, or None if absent or expired. A row
    /// with a malformed timestamp counts as expired.
    pub fn get(&self, keyword: &str, locale: &str, range: &str) -> Result<Option<TrendQueryRow>> {
        let Some(row) = self.db.get_trend_query(keyword, locale, range)? else {
            return Ok(None);
        };
        let created = match DateTime::parse_from_rfc3339(&row.created_at) {
            Ok(t) => t.with_timezone(&Utc),
            Err(_) => return Ok(None),
        };
        if self.clock.now() - created >= self.ttl {
            tracing::debug!(keyword, locale, range, "trend cache entry expired");
            return Ok(None);
        }
        Ok(Some(row))
    }

    /// Store a result under the key, replacing any previous entry.
    pub fn put(
        &self,
        keyword: &str,
        locale: &str,
        range: &str,
        result: &TrendResult,
    ) -> Result<TrendQueryRow> {
        let created_at = self.clock.now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        self.db
            .put_trend_query(keyword, locale, range, result, &created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::random::SeededRandom;
    use std::cell::Cell;

    struct FixedClock {
        now: Cell<DateTime<Utc>>,
    }

    impl FixedClock {
        fn at(iso: &str) -> Self {
            Self {
                now: Cell::new(
                    DateTime::parse_from_rfc3339(iso)
                        .unwrap()
                        .with_timezone(&Utc),
                ),
            }
        }

        fn advance_minutes(&self, minutes: i64) {
            self.now.set(self.now.get() + Duration::minutes(minutes));
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.now.get()
        }
    }

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("cache.db")).unwrap();
        (dir, db)
    }

    fn sample_result(keyword: &str) -> TrendResult {
        let mut rng = SeededRandom::new(9);
        crate::trends::synthetic_trend(keyword, &mut rng)
    }

    #[test]
    fn hit_within_ttl_returns_stored_result() {
        let (_dir, db) = test_db();
        let clock = FixedClock::at("2026-08-30T10:00:00Z");
        let cache = TrendCache::new(&db, &clock);

        let result = sample_result("ai");
        cache.put("ai", "KR", "30d", &result).unwrap();

        clock.advance_minutes(59);
        let row = cache.get("ai", "KR", "30d").unwrap().unwrap();
        assert_eq!(row.result.keyword, "ai");
        assert_eq!(row.result.avg_volume, result.avg_volume);
        assert_eq!(row.created_at, "2026-08-30T10:00:00Z");
    }

    #[test]
    fn entry_expires_at_ttl() {
        let (_dir, db) = test_db();
        let clock = FixedClock::at("2026-08-30T10:00:00Z");
        let cache = TrendCache::new(&db, &clock);

        cache.put("ai", "KR", "30d", &sample_result("ai")).unwrap();
        clock.advance_minutes(60);
        assert!(cache.get("ai", "KR", "30d").unwrap().is_none());
    }

    #[test]
    fn key_distinguishes_locale_and_range() {
        let (_dir, db) = test_db();
        let clock = FixedClock::at("2026-08-30T10:00:00Z");
        let cache = TrendCache::new(&db, &clock);

        cache.put("ai", "KR", "30d", &sample_result("ai")).unwrap();
        assert!(cache.get("ai", "US", "30d").unwrap().is_none());
        assert!(cache.get("ai", "KR", "7d").unwrap().is_none());
        assert!(cache.get("ai", "KR", "30d").unwrap().is_some());
    }

    #[test]
    fn miss_on_empty_cache() {
        let (_dir, db) = test_db();
        let clock = FixedClock::at("2026-08-30T10:00:00Z");
        let cache = TrendCache::new(&db, &clock);
        assert!(cache.get("nothing", "KR", "30d").unwrap().is_none());
    }
}
