//! Cross-check suggested spots with durations from a routing server.
//!
//! Run with: cargo run --example route_check --features http -- http://localhost:5000

use cheer_planner::{
    parse_pace, GpsPoint, PlannerConfig, RoutingClient, SelectionStrategy, SpotPlanner,
    SuggestionInput, TravelProfile,
};

#[tokio::main]
async fn main() {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    let course: Vec<GpsPoint> = (0..=80)
        .map(|i| GpsPoint::new(51.5000 + i as f64 * 0.0009, -0.1650 + i as f64 * 0.0004))
        .collect();

    let mut planner = SpotPlanner::new(PlannerConfig::default()).expect("default config is valid");
    planner.load_course(&course);

    let input = SuggestionInput {
        num_spots: 4,
        strategy: SelectionStrategy::MaxSpread,
        pace: "6:00".to_string(),
        profile: TravelProfile::Walking,
        skip_first_km: 0.5,
    };
    let count = planner.suggest(&input).expect("max spread needs no pace");
    println!("Selected {} spots, asking {} for walking times", count, base_url);

    let client = RoutingClient::new(&base_url).expect("client builds");
    let points: Vec<GpsPoint> = planner.selected_positions().iter().map(|s| s.point).collect();

    let durations = match client.leg_durations(&points, TravelProfile::Walking).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Routing failed: {}", e);
            return;
        }
    };

    let pace = parse_pace(&input.pace).expect("valid pace");
    match planner.itinerary(pace, TravelProfile::Walking, Some(&durations)) {
        Ok(legs) => {
            for leg in legs {
                println!(
                    "{:.0}m -> {:.0}m: slack {:+.0}s ({})",
                    leg.from_distance,
                    leg.to_distance,
                    leg.slack_seconds,
                    if leg.feasible { "ok" } else { "too tight" }
                );
            }
        }
        Err(e) => eprintln!("Itinerary check failed: {}", e),
    }
}
