//! Bounded-time pattern matching
//!
//! Script searches run against text that may contain pathological input
//! (e.g. megabyte-long identifiers). Every search attempt is bounded by a
//! timeout; [`BoundedSearch`] retries a timed-out attempt once and then
//! gives up on further matches instead of failing.

use async_trait::async_trait;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A search attempt that did not finish within its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Pattern matching timed out after {0:?}")]
pub struct MatchTimeout(pub Duration);

/// Pattern search that may time out
///
/// The haystack is shared so a retried attempt does not copy the script again.
#[async_trait]
pub trait PatternMatcher: Send + Sync {
    /// Find the next match at or after `start`
    async fn find_at(&self, haystack: Arc<str>, start: usize) -> Result<Option<Range<usize>>, MatchTimeout>;
}

/// Regex search bounded by a wall-clock timeout
///
/// The search runs on the blocking pool and the caller waits for it with
/// `tokio::time::timeout`, so the runtime keeps running in the meantime. A
/// regex search cannot be interrupted: an abandoned attempt finishes in the
/// background and its result is dropped.
#[derive(Debug, Clone)]
pub struct TimedRegexMatcher {
    regex: Regex,
    timeout: Duration,
}

impl TimedRegexMatcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(regex: Regex) -> Self {
        Self {
            regex,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

#[async_trait]
impl PatternMatcher for TimedRegexMatcher {
    async fn find_at(&self, haystack: Arc<str>, start: usize) -> Result<Option<Range<usize>>, MatchTimeout> {
        if start > haystack.len() {
            return Ok(None);
        }

        let regex = self.regex.clone();
        let search = tokio::task::spawn_blocking(move || regex.find_at(&haystack, start).map(|m| m.range()));

        match tokio::time::timeout(self.timeout, search).await {
            Ok(Ok(found)) => Ok(found),
            Ok(Err(e)) => match e.try_into_panic() {
                Ok(payload) => std::panic::resume_unwind(payload),
                Err(e) => {
                    debug!("Pattern matching task did not complete: {}", e);
                    Ok(None)
                }
            },
            Err(_) => Err(MatchTimeout(self.timeout)),
        }
    }
}

/// Search session applying the timeout policy
///
/// A timed-out attempt is retried once with the same bound. When the retry
/// times out as well the session is exhausted: it reports no further
/// matches, so callers keep what they already found.
pub struct BoundedSearch<'a> {
    matcher: &'a dyn PatternMatcher,
    timeouts: usize,
    exhausted: bool,
}

impl<'a> BoundedSearch<'a> {
    /// Attempts per search: the first try plus one retry
    pub const MAX_ATTEMPTS: usize = 2;

    pub fn new(matcher: &'a dyn PatternMatcher) -> Self {
        Self {
            matcher,
            timeouts: 0,
            exhausted: false,
        }
    }

    /// Next match at or after `from`, or `None` when there is none or the
    /// retry budget ran out
    pub async fn find(&mut self, haystack: &Arc<str>, from: usize) -> Option<Range<usize>> {
        if self.exhausted {
            return None;
        }

        for attempt in 1..=Self::MAX_ATTEMPTS {
            match self.matcher.find_at(haystack.clone(), from).await {
                Ok(found) => return found,
                Err(timeout) => {
                    self.timeouts += 1;
                    debug!("Search attempt {} at offset {}: {}", attempt, from, timeout);
                }
            }
        }

        self.exhausted = true;
        None
    }

    /// Number of timed-out attempts so far
    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
