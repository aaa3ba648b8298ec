//! Slow metadata backend for testing
//!
//! This module provides a decorator around any MetadataBackend that adds
//! configurable delays to listing calls. It is used to test loading states
//! and out-of-order responses (a slow early request finishing after a fast
//! later one).

use super::backend::{FetchError, ListPage, ListRequest, MetadataBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Configuration for slow backend simulation
#[derive(Debug, Clone)]
pub struct SlowBackendConfig {
    /// Delay for every list call
    pub list_delay: Duration,
    /// Extra delay per returned record
    pub per_item_delay: Duration,
}

impl SlowBackendConfig {
    /// Same delay for every call
    pub fn uniform(delay: Duration) -> Self {
        Self {
            list_delay: delay,
            per_item_delay: Duration::ZERO,
        }
    }

    /// No delays (useful as a baseline)
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// Simulates a slow network link
    pub fn slow_network() -> Self {
        Self {
            list_delay: Duration::from_millis(500),
            per_item_delay: Duration::from_millis(1),
        }
    }
}

impl Default for SlowBackendConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Metrics tracking for listing calls
#[derive(Debug, Clone, Default)]
pub struct BackendMetrics {
    /// Number of list calls
    pub list_calls: usize,
    /// Number of records returned
    pub items_returned: usize,
    /// Number of failed calls
    pub failures: usize,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
}

impl BackendMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Slow backend wrapper for testing
///
/// Wraps any MetadataBackend and delays each call. Scripted delays, when
/// queued, override the configured delay for the next calls in order.
pub struct SlowBackend {
    inner: Arc<dyn MetadataBackend>,
    config: SlowBackendConfig,
    scripted: Mutex<VecDeque<Duration>>,
    metrics: Arc<Mutex<BackendMetrics>>,
}

impl SlowBackend {
    pub fn new(inner: Arc<dyn MetadataBackend>, config: SlowBackendConfig) -> Self {
        Self {
            inner,
            config,
            scripted: Mutex::new(VecDeque::new()),
            metrics: Arc::new(Mutex::new(BackendMetrics::new())),
        }
    }

    /// Create with uniform delay for all calls
    pub fn with_uniform_delay(inner: Arc<dyn MetadataBackend>, delay: Duration) -> Self {
        Self::new(inner, SlowBackendConfig::uniform(delay))
    }

    /// Queue delays for the next calls, in call order
    pub async fn script_delays(&self, delays: impl IntoIterator<Item = Duration>) {
        self.scripted.lock().await.extend(delays);
    }

    /// Get a snapshot of current metrics
    pub async fn metrics(&self) -> BackendMetrics {
        self.metrics.lock().await.clone()
    }

    /// Reset metrics to zero
    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    async fn add_delay(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            self.metrics.lock().await.total_delay_time += delay;
        }
    }
}

#[async_trait]
impl MetadataBackend for SlowBackend {
    async fn list(&self, request: &ListRequest) -> Result<ListPage, FetchError> {
        // Pick the delay when the call starts so call order decides it
        let scripted = self.scripted.lock().await.pop_front();
        self.metrics.lock().await.list_calls += 1;

        let result = self.inner.list(request).await;

        let delay = match (&result, scripted) {
            (_, Some(delay)) => delay,
            (Ok(page), None) => {
                self.config.list_delay + self.config.per_item_delay * page.items.len() as u32
            }
            (Err(_), None) => self.config.list_delay,
        };
        self.add_delay(delay).await;

        let mut metrics = self.metrics.lock().await;
        match &result {
            Ok(page) => metrics.items_returned += page.items.len(),
            Err(_) => metrics.failures += 1,
        }
        drop(metrics);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use crate::services::metadata::InMemoryBackend;
    use std::time::Instant;

    fn inner() -> Arc<dyn MetadataBackend> {
        Arc::new(InMemoryBackend::new(vec![
            Item::folder("a", "a"),
            Item::folder("b", "b"),
        ]))
    }

    #[tokio::test]
    async fn test_slow_backend_adds_delay() {
        let slow = SlowBackend::with_uniform_delay(inner(), Duration::from_millis(100));

        let start = Instant::now();
        let _ = slow.list(&ListRequest::new(10)).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100),
            "Expected at least 100ms delay, got {:?}",
            elapsed
        );

        let metrics = slow.metrics().await;
        assert_eq!(metrics.list_calls, 1);
        assert_eq!(metrics.items_returned, 2);
        assert!(metrics.total_delay_time >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_scripted_delays_apply_in_call_order() {
        let slow = SlowBackend::new(inner(), SlowBackendConfig::none());
        slow.script_delays([Duration::from_millis(80)]).await;

        let start = Instant::now();
        let _ = slow.list(&ListRequest::new(10)).await;
        assert!(start.elapsed() >= Duration::from_millis(80));

        // Queue exhausted: back to the configured (zero) delay
        let start = Instant::now();
        let _ = slow.list(&ListRequest::new(10)).await;
        assert!(start.elapsed() < Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_failures_are_counted() {
        let memory = Arc::new(InMemoryBackend::new(vec![]));
        memory.fail_next(FetchError::Unauthorized).await;
        let slow = SlowBackend::new(memory, SlowBackendConfig::none());

        assert!(slow.list(&ListRequest::new(10)).await.is_err());

        let metrics = slow.metrics().await;
        assert_eq!(metrics.failures, 1);

        slow.reset_metrics().await;
        assert_eq!(slow.metrics().await.list_calls, 0);
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(
            SlowBackendConfig::slow_network().list_delay,
            Duration::from_millis(500)
        );
        assert_eq!(SlowBackendConfig::none().list_delay, Duration::ZERO);
    }
}
