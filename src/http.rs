//! HTTP client for an OSRM-compatible routing service.
//!
//! Used to cross-check a chosen itinerary with real travel durations:
//! - One request per itinerary (all spots as waypoints)
//! - Per-leg durations read from the first returned route
//! - Automatic retry with exponential backoff on 429 and transport errors

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{PlannerError, Result};
use crate::{GpsPoint, TravelProfile};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API response for the route endpoint
#[derive(Debug, Deserialize)]
struct RouteApiResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    duration: f64,
}

/// Routing profile name for a travel profile.
fn profile_name(profile: TravelProfile) -> Result<&'static str> {
    match profile {
        TravelProfile::Walking => Ok("foot"),
        TravelProfile::Cycling => Ok("bike"),
        TravelProfile::Transit => Err(PlannerError::UnsupportedProfile {
            profile: profile.as_str().to_string(),
        }),
    }
}

/// Build the route URL: coordinates are `lng,lat` pairs joined by `;`.
fn route_url(base_url: &str, profile: &str, points: &[GpsPoint]) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{:.6},{:.6}", p.longitude, p.latitude))
        .collect();
    format!(
        "{}/route/v1/{}/{}?overview=false",
        base_url.trim_end_matches('/'),
        profile,
        coords.join(";")
    )
}

/// Read per-leg durations out of a route response body.
fn parse_leg_durations(body: &[u8], expected_legs: usize) -> Result<Vec<f64>> {
    let data: RouteApiResponse = serde_json::from_slice(body)
        .map_err(|e| PlannerError::routing(format!("JSON parse error: {}", e)))?;

    if data.code != "Ok" {
        return Err(PlannerError::routing(format!(
            "{}: {}",
            data.code,
            data.message.unwrap_or_default()
        )));
    }

    let route = data
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| PlannerError::routing("response contained no route"))?;

    if route.legs.len() != expected_legs {
        return Err(PlannerError::routing(format!(
            "expected {} legs, got {}",
            expected_legs,
            route.legs.len()
        )));
    }

    Ok(route.legs.into_iter().map(|leg| leg.duration).collect())
}

/// Client for point-to-point travel durations
pub struct RoutingClient {
    client: Client,
    base_url: String,
}

impl RoutingClient {
    /// Create a client for a routing server, e.g. `"https://router.example.org"`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlannerError::routing(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Travel duration in seconds for each leg between consecutive `points`.
    pub async fn leg_durations(
        &self,
        points: &[GpsPoint],
        profile: TravelProfile,
    ) -> Result<Vec<f64>> {
        if points.len() < 2 {
            return Ok(Vec::new());
        }
        let profile = profile_name(profile)?;

        let url = route_url(&self.base_url, profile, points);
        let mut retries = 0;
        let req_start = Instant::now();

        loop {
            match self.client.get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        retries += 1;
                        if retries > MAX_RETRIES {
                            return Err(PlannerError::Routing {
                                message: "Max retries exceeded (429)".to_string(),
                                status_code: Some(status.as_u16()),
                            });
                        }

                        let wait = Duration::from_millis(500 * (1 << retries));
                        warn!(
                            "[Routing] 429 Too Many Requests, retry {} with {:?} backoff",
                            retries, wait
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(PlannerError::Routing {
                            message: format!("HTTP {}", status),
                            status_code: Some(status.as_u16()),
                        });
                    }

                    let bytes = resp
                        .bytes()
                        .await
                        .map_err(|e| PlannerError::routing(format!("Body download error: {}", e)))?;
                    let durations = parse_leg_durations(&bytes, points.len() - 1)?;

                    info!(
                        "[Routing] {} legs ({}) in {:?}",
                        durations.len(),
                        profile,
                        req_start.elapsed()
                    );
                    return Ok(durations);
                }
                Err(e) => {
                    retries += 1;
                    if retries > MAX_RETRIES {
                        return Err(PlannerError::routing(format!("Request error: {}", e)));
                    }

                    let wait = Duration::from_millis(200 * (1 << retries));
                    debug!("[Routing] Error: {}, retry {} after {:?}", e, retries, wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Blocking wrapper for callers without an async runtime (FFI, demos).
    pub fn leg_durations_blocking(
        &self,
        points: &[GpsPoint],
        profile: TravelProfile,
    ) -> Result<Vec<f64>> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PlannerError::routing(format!("Runtime error: {}", e)))?;
        rt.block_on(self.leg_durations(points, profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url() {
        let points = vec![GpsPoint::new(51.5, -0.13), GpsPoint::new(51.51, -0.12)];
        assert_eq!(
            route_url("http://localhost:5000/", "foot", &points),
            "http://localhost:5000/route/v1/foot/\
             -0.130000,51.500000;-0.120000,51.510000?overview=false"
        );
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(profile_name(TravelProfile::Walking).unwrap(), "foot");
        assert_eq!(profile_name(TravelProfile::Cycling).unwrap(), "bike");
        assert!(matches!(
            profile_name(TravelProfile::Transit),
            Err(PlannerError::UnsupportedProfile { .. })
        ));
    }

    #[test]
    fn test_parse_leg_durations() {
        let body =
            br#"{"code":"Ok","routes":[{"legs":[{"duration":312.4},{"duration":95.0}]}]}"#;
        assert_eq!(parse_leg_durations(body, 2).unwrap(), vec![312.4, 95.0]);
        assert!(parse_leg_durations(body, 3).is_err());
    }

    #[test]
    fn test_parse_error_codes() {
        let body = br#"{"code":"NoRoute","message":"Impossible route"}"#;
        let err = parse_leg_durations(body, 1).unwrap_err();
        assert!(err.to_string().contains("NoRoute"));

        assert!(parse_leg_durations(b"not json", 1).is_err());
    }

    #[tokio::test]
    async fn test_short_itinerary_skips_request() {
        let client = RoutingClient::new("http://127.0.0.1:9").unwrap();
        let one = vec![GpsPoint::new(51.5, -0.13)];
        let walking = client.leg_durations(&one, TravelProfile::Walking).await;
        assert!(walking.unwrap().is_empty());

        // Fewer than two points never reaches the profile check
        let transit = client.leg_durations(&one, TravelProfile::Transit).await;
        assert!(transit.unwrap().is_empty());
        let none = client.leg_durations(&[], TravelProfile::Transit).await;
        assert!(none.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transit_itinerary_rejected_before_request() {
        let client = RoutingClient::new("http://127.0.0.1:9").unwrap();
        let two = vec![GpsPoint::new(51.5, -0.13), GpsPoint::new(51.51, -0.12)];
        assert!(matches!(
            client.leg_durations(&two, TravelProfile::Transit).await,
            Err(PlannerError::UnsupportedProfile { .. })
        ));
    }
}
