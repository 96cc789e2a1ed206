//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub regions: Vec<RegionHealth>,
}

/// Per-region database health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RegionHealth {
    pub region: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check: pings every configured region pool.
///
/// Healthy requires every region to answer; a single unreachable region
/// degrades the whole service to 503 since operations may target it.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let mut regions = Vec::new();
    let mut all_connected = true;

    for (name, pool) in state.pools.iter() {
        let start = std::time::Instant::now();
        let connected = sqlx::query("SELECT 1").execute(pool).await.is_ok();
        let latency_ms = start.elapsed().as_millis() as u64;
        persistence::metrics::record_pool_metrics(name, pool);
        all_connected &= connected;
        regions.push(RegionHealth {
            region: name.to_string(),
            connected,
            latency_ms: connected.then_some(latency_ms),
        });
    }

    let response = HealthResponse {
        status: if all_connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        regions,
    };

    if all_connected {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the default region's database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let connected = match state.pools.pool(None) {
        Ok(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
        Err(_) => false,
    };

    if connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.6.2".to_string(),
            regions: vec![RegionHealth {
                region: "us-east".to_string(),
                connected: true,
                latency_ms: Some(4),
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"region\":\"us-east\""));
        assert!(json.contains("\"latency_ms\":4"));
    }

    #[test]
    fn test_disconnected_region_omits_latency() {
        let health = RegionHealth {
            region: "eu-west".to_string(),
            connected: false,
            latency_ms: None,
        };
        assert!(!health.connected);
        assert!(health.latency_ms.is_none());
    }

    #[test]
    fn test_status_response() {
        let response = StatusResponse {
            status: "alive".to_string(),
        };
        assert_eq!(response.status, "alive");
    }
}
