use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
    pub total_response_time: Duration,
    pub last_request_time: Option<SystemTime>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub endpoint: String,
    pub method: String,
    pub status_code: Option<u16>,
    pub response_time: Duration,
    pub success: bool,
    pub rate_limited: bool,
}

impl ApiMetrics {
    pub fn average_response_time(&self) -> Duration {
        if self.total_requests == 0 {
            Duration::from_millis(0)
        } else {
            self.total_response_time / self.total_requests as u32
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<ApiMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_request(&self, request_metrics: RequestMetrics) {
        let mut metrics = self.metrics.write().await;

        metrics.total_requests += 1;
        metrics.total_response_time += request_metrics.response_time;
        metrics.last_request_time = Some(SystemTime::now());

        if request_metrics.success {
            metrics.successful_requests += 1;
        } else {
            metrics.failed_requests += 1;
            metrics.last_error = Some(format!(
                "{} {} -> {}",
                request_metrics.method,
                request_metrics.endpoint,
                request_metrics
                    .status_code
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "no response".to_string())
            ));
        }

        if request_metrics.rate_limited {
            metrics.rate_limited_requests += 1;
        }
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.read().await.clone()
    }
}
