//! Per-bus and per-stop statistics (§4.5). A thin collaborator: it shares
//! the stop/route registries with the graph builder but does not touch the
//! graph at all.

use std::collections::{HashMap, HashSet};

use geo::prelude::HaversineDistance;

use crate::error::Error;
use crate::transit::{BusRoute, RoadDistanceTable, StopRegistry};

#[derive(Clone, Debug, PartialEq)]
pub struct BusStats {
	pub stop_count: usize,
	pub unique_stop_count: usize,
	pub route_length: f64,
	pub curvature: f64,
}

/// Realized traversal length, in meters: forward-only for a cyclic route,
/// forward + reverse for a linear one.
fn road_length(distances: &RoadDistanceTable, route: &BusRoute) -> Result<f64, Error> {
	let mut total = 0.0;
	for pair in route.stops.windows(2) {
		total += distances.lookup(&pair[0], &pair[1])?;
	}
	if !route.is_roundtrip {
		for pair in route.stops.windows(2) {
			total += distances.lookup(&pair[1], &pair[0])?;
		}
	}
	Ok(total)
}

/// Great-circle length, in meters, along the same traversal as `road_length`.
fn geo_length(stops: &StopRegistry, route: &BusRoute) -> Result<f64, Error> {
	let leg = |a: &str, b: &str| -> Result<f64, Error> {
		let p1 = stops.get(a).ok_or_else(|| Error::UnknownEntity(a.to_string()))?.point();
		let p2 = stops.get(b).ok_or_else(|| Error::UnknownEntity(b.to_string()))?.point();
		Ok(p1.haversine_distance(&p2))
	};
	let mut total = 0.0;
	for pair in route.stops.windows(2) {
		total += leg(&pair[0], &pair[1])?;
	}
	if !route.is_roundtrip {
		total *= 2.0;
	}
	Ok(total)
}

pub fn bus_stats(
	stops: &StopRegistry,
	distances: &RoadDistanceTable,
	route: &BusRoute,
) -> Result<BusStats, Error> {
	let stop_count = if route.is_roundtrip { route.stops.len() } else { 2 * route.stops.len() - 1 };
	let unique_stop_count = route.stops.iter().collect::<HashSet<_>>().len();
	let route_length = road_length(distances, route)?;
	let geo = geo_length(stops, route)?;
	let curvature = route_length / geo;
	Ok(BusStats { stop_count, unique_stop_count, route_length, curvature })
}

/// Alphabetically sorted bus names serving each stop.
pub fn stop_buses(routes: &[BusRoute]) -> HashMap<String, Vec<String>> {
	let mut membership: HashMap<String, HashSet<String>> = HashMap::new();
	for route in routes {
		for stop in &route.stops {
			membership.entry(stop.clone()).or_default().insert(route.name.clone());
		}
	}
	membership
		.into_iter()
		.map(|(stop, buses)| {
			let mut buses: Vec<String> = buses.into_iter().collect();
			buses.sort();
			(stop, buses)
		})
		.collect()
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::transit::Stop;

	fn registry(named: &[(&str, f64, f64)]) -> StopRegistry {
		let mut r = StopRegistry::default();
		for &(name, lat, lon) in named {
			r.insert(Stop { name: name.into(), latitude: lat, longitude: lon });
		}
		r
	}

	#[test]
	fn asymmetric_distances_scenario_4() {
		let stops = registry(&[("A", 0.0, 0.0), ("B", 0.0, 0.001), ("C", 0.0, 0.002)]);
		let mut distances = RoadDistanceTable::default();
		distances.insert("A", "B", 100.0);
		distances.insert("B", "A", 200.0);
		distances.insert("B", "C", 100.0);
		distances.insert("C", "B", 100.0);
		let route = BusRoute { name: "1".into(), stops: vec!["A".into(), "B".into(), "C".into()], is_roundtrip: false };
		let stats = bus_stats(&stops, &distances, &route).unwrap();
		assert_eq!(stats.route_length, 500.0);
		assert_eq!(stats.stop_count, 5);
		assert_eq!(stats.unique_stop_count, 3);
	}

	#[test]
	fn cyclic_stop_count_is_stop_list_length() {
		let stops = registry(&[("A", 0.0, 0.0), ("B", 0.0, 0.001)]);
		let mut distances = RoadDistanceTable::default();
		distances.insert("A", "B", 100.0);
		distances.insert("B", "A", 100.0);
		let route = BusRoute { name: "2".into(), stops: vec!["A".into(), "B".into(), "A".into()], is_roundtrip: true };
		let stats = bus_stats(&stops, &distances, &route).unwrap();
		assert_eq!(stats.stop_count, 3);
		assert_eq!(stats.unique_stop_count, 2);
	}

	#[test]
	fn scenario_5_curvature_ratio() {
		let stops = registry(&[("A", 0.0, 0.0), ("B", 0.005, 0.0)]);
		let geo_distance = stops.get("A").unwrap().point().haversine_distance(&stops.get("B").unwrap().point());

		let mut distances = RoadDistanceTable::default();
		distances.insert("A", "B", geo_distance * 1.5);
		distances.insert("B", "A", geo_distance * 1.5);
		let route = BusRoute { name: "1".into(), stops: vec!["A".into(), "B".into()], is_roundtrip: false };
		let stats = bus_stats(&stops, &distances, &route).unwrap();
		assert!((stats.curvature - 1.5).abs() < 1e-9, "curvature was {}", stats.curvature);
	}

	#[test]
	fn stop_buses_are_sorted_alphabetically() {
		let routes = vec![
			BusRoute { name: "2".into(), stops: vec!["A".into(), "B".into()], is_roundtrip: false },
			BusRoute { name: "1".into(), stops: vec!["A".into()], is_roundtrip: false },
		];
		let membership = stop_buses(&routes);
		assert_eq!(membership.get("A").unwrap(), &vec!["1".to_string(), "2".to_string()]);
	}
}
