//! Plan cheer spots on a synthetic out-and-back course with both strategies.
//!
//! Run with: cargo run --example plan_spots

use cheer_planner::{
    format_pace, GpsPoint, PlannerConfig, SelectionStrategy, SpotPlanner, SuggestionInput,
    TravelProfile,
};

fn main() {
    // 6km north, a short turn east, then 6km back south (Hyde Park area)
    let mut course: Vec<GpsPoint> = (0..=60)
        .map(|i| GpsPoint::new(51.5000 + i as f64 * 0.0009, -0.1650))
        .collect();
    course.extend((0..=60).map(|i| GpsPoint::new(51.5540 - i as f64 * 0.0009, -0.1630)));

    let mut planner = match SpotPlanner::new(PlannerConfig::default()) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            return;
        }
    };
    planner.load_course(&course);

    println!("Cheer Spot Planning\n");
    println!(
        "Course: {:.2}km, {} candidates every {}m\n",
        planner.index().total_distance() / 1000.0,
        planner.index().candidates().len(),
        planner.config().candidate_interval_m
    );

    let pace = "5:30";
    for strategy in [SelectionStrategy::MaxSpread, SelectionStrategy::MinTravel] {
        let input = SuggestionInput {
            num_spots: 4,
            strategy,
            pace: pace.to_string(),
            profile: TravelProfile::Cycling,
            skip_first_km: 1.0,
        };

        match planner.suggest(&input) {
            Ok(count) => {
                println!("{:?}: {} spots", strategy, count);
                for spot in planner.selected_positions() {
                    println!(
                        "   {:>7.0}m  ({:.5}, {:.5})",
                        spot.distance, spot.point.latitude, spot.point.longitude
                    );
                }
            }
            Err(e) => {
                println!("{:?}: {}", strategy, e);
                continue;
            }
        }

        let pace_s_per_m = match cheer_planner::parse_pace(pace) {
            Ok(p) => p,
            Err(_) => continue,
        };
        match planner.itinerary(pace_s_per_m, TravelProfile::Cycling, None) {
            Ok(legs) => {
                for leg in legs {
                    println!(
                        "   {:.0}m -> {:.0}m: runner {:.0}s, spectator {:.0}s, slack {:+.0}s {}",
                        leg.from_distance,
                        leg.to_distance,
                        leg.runner_seconds,
                        leg.spectator_seconds,
                        leg.slack_seconds,
                        if leg.feasible { "ok" } else { "TOO TIGHT" }
                    );
                }
            }
            Err(e) => println!("   itinerary: {}", e),
        }
        println!("   (pace {} per km)\n", format_pace(pace_s_per_m));
    }
}
