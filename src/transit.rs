//! Domain model (stops, bus routes, road distances) and the transit graph
//! builder (§3, §4.3).

use indexmap::IndexMap;

use crate::error::Error;
use crate::graph::Graph;

#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
	pub name: String,
	pub latitude: f64,
	pub longitude: f64,
}

impl Stop {
	pub fn point(&self) -> geo::Point<f64> {
		geo::Point::new(self.longitude, self.latitude)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BusRoute {
	pub name: String,
	pub stops: Vec<String>,
	pub is_roundtrip: bool,
}

impl BusRoute {
	/// Validates the §9 closure requirement: a roundtrip route's sequence
	/// must actually close on itself.
	pub fn validate(&self) -> Result<(), Error> {
		if self.stops.len() < 2 {
			return Err(Error::MalformedInput(format!(
				"bus {:?} has fewer than 2 stops",
				self.name
			)));
		}
		if self.is_roundtrip && self.stops.first() != self.stops.last() {
			return Err(Error::MalformedInput(format!(
				"bus {:?} is a roundtrip but its stops do not close (first != last)",
				self.name
			)));
		}
		Ok(())
	}
}

/// `(u -> v)` meters, with `(v -> u)` fallback. Deliberately asymmetric:
/// reverse lookup is a fallback, not an assumption that the table is a
/// metric (§3, Design Notes).
#[derive(Clone, Debug, Default)]
pub struct RoadDistanceTable {
	distances: IndexMap<(String, String), f64>,
}

impl RoadDistanceTable {
	pub fn insert(&mut self, from: &str, to: &str, meters: f64) {
		self.distances.insert((from.to_string(), to.to_string()), meters);
	}

	pub fn lookup(&self, from: &str, to: &str) -> Result<f64, Error> {
		if let Some(&d) = self.distances.get(&(from.to_string(), to.to_string())) {
			return Ok(d);
		}
		if let Some(&d) = self.distances.get(&(to.to_string(), from.to_string())) {
			return Ok(d);
		}
		Err(Error::MissingDistance { from: from.to_string(), to: to.to_string() })
	}
}

/// Dense, insertion-ordered stop index (§3 Stop Index).
#[derive(Clone, Debug, Default)]
pub struct StopRegistry {
	stops: IndexMap<String, Stop>,
}

impl StopRegistry {
	pub fn insert(&mut self, stop: Stop) {
		self.stops.insert(stop.name.clone(), stop);
	}

	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.stops.get_index_of(name)
	}

	pub fn get(&self, name: &str) -> Option<&Stop> {
		self.stops.get(name)
	}

	pub fn get_index(&self, idx: usize) -> &Stop {
		self.stops.get_index(idx).expect("dense stop index out of range").1
	}

	pub fn len(&self) -> usize {
		self.stops.len()
	}
}

/// Semantic label of a graph edge, 1-to-1 with edge ids (§3 Edge Action).
#[derive(Clone, Debug, PartialEq)]
pub enum EdgeAction {
	Wait { stop_name: String, time: f64 },
	Ride { bus_name: String, time: f64, span_count: u32 },
}

impl EdgeAction {
	pub fn time(&self) -> f64 {
		match self {
			EdgeAction::Wait { time, .. } => *time,
			EdgeAction::Ride { time, .. } => *time,
		}
	}
}

/// Converts km/h to meters/minute, the unit ride edges are weighted in.
fn meters_per_minute(bus_velocity_kmh: f64) -> f64 {
	bus_velocity_kmh * 1000.0 / 60.0
}

/// Constructs the vertex/edge layout of §4.3: two vertices per stop, one
/// `Wait` edge per stop, and forward (+ reverse, for linear routes) chains
/// of cumulative `Ride` edges per bus.
pub struct TransitGraphBuilder<'a> {
	stops: &'a StopRegistry,
	routes: &'a [BusRoute],
	distances: &'a RoadDistanceTable,
	wait_time: f64,
	bus_velocity: f64,
}

pub struct BuiltTransitGraph {
	pub graph: Graph,
	pub actions: Vec<EdgeAction>,
}

impl<'a> TransitGraphBuilder<'a> {
	pub fn new(
		stops: &'a StopRegistry,
		routes: &'a [BusRoute],
		distances: &'a RoadDistanceTable,
		wait_time: f64,
		bus_velocity: f64,
	) -> Self {
		Self { stops, routes, distances, wait_time, bus_velocity }
	}

	pub fn build(&self) -> Result<BuiltTransitGraph, Error> {
		let n = self.stops.len();
		let mut graph = Graph::new(2 * n);
		let mut actions = Vec::new();
		let speed = meters_per_minute(self.bus_velocity);

		for i in 0..n {
			let stop = self.stops.get_index(i);
			let edge_id = graph.add_edge(2 * i, 2 * i + 1, self.wait_time)?;
			debug_assert_eq!(edge_id, actions.len());
			actions.push(EdgeAction::Wait { stop_name: stop.name.clone(), time: self.wait_time });
			log::trace!("wait edge at {:?}: {} min", stop.name, self.wait_time);
		}

		for route in self.routes {
			self.emit_ride_edges(route, speed, &mut graph, &mut actions)?;
		}

		log::info!(
			"built transit graph: {} vertices, {} edges over {} routes",
			graph.vertex_count(),
			graph.edge_count(),
			self.routes.len()
		);

		Ok(BuiltTransitGraph { graph, actions })
	}

	fn emit_ride_edges(
		&self,
		route: &BusRoute,
		speed: f64,
		graph: &mut Graph,
		actions: &mut Vec<EdgeAction>,
	) -> Result<(), Error> {
		let stops = &route.stops;
		let k = stops.len();

		// Forward pass: always emitted, for both cyclic and linear routes.
		for i in 0..k {
			let mut cumulative = 0.0;
			let mut span = 0u32;
			for j in (i + 1)..k {
				let leg = self.distances.lookup(&stops[j - 1], &stops[j])? / speed;
				cumulative += leg;
				span += 1;
				let from = 2 * self.stop_index(&stops[i])? + 1;
				let to = 2 * self.stop_index(&stops[j])?;
				let edge_id = graph.add_edge(from, to, cumulative)?;
				debug_assert_eq!(edge_id, actions.len());
				actions.push(EdgeAction::Ride {
					bus_name: route.name.clone(),
					time: cumulative,
					span_count: span,
				});
			}
		}

		// Reverse pass, linear routes only (§4.3 rule 3).
		if !route.is_roundtrip {
			for i in (0..k).rev() {
				let mut cumulative = 0.0;
				let mut span = 0u32;
				for j in (0..i).rev() {
					let leg = self.distances.lookup(&stops[j + 1], &stops[j])? / speed;
					cumulative += leg;
					span += 1;
					let from = 2 * self.stop_index(&stops[i])? + 1;
					let to = 2 * self.stop_index(&stops[j])?;
					let edge_id = graph.add_edge(from, to, cumulative)?;
					debug_assert_eq!(edge_id, actions.len());
					actions.push(EdgeAction::Ride {
						bus_name: route.name.clone(),
						time: cumulative,
						span_count: span,
					});
				}
			}
		}

		Ok(())
	}

	fn stop_index(&self, name: &str) -> Result<usize, Error> {
		self.stops.index_of(name).ok_or_else(|| Error::UnknownEntity(name.to_string()))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn registry(names: &[&str]) -> StopRegistry {
		let mut r = StopRegistry::default();
		for (i, name) in names.iter().enumerate() {
			r.insert(Stop { name: name.to_string(), latitude: 0.0, longitude: i as f64 * 0.01 });
		}
		r
	}

	#[test]
	fn linear_two_stop_route_scenario_1() {
		let stops = registry(&["A", "B"]);
		let mut distances = RoadDistanceTable::default();
		distances.insert("A", "B", 1000.0);
		distances.insert("B", "A", 1200.0);
		let routes = vec![BusRoute { name: "1".into(), stops: vec!["A".into(), "B".into()], is_roundtrip: false }];
		let built = TransitGraphBuilder::new(&stops, &routes, &distances, 6.0, 60.0).build().unwrap();

		// 2 wait edges + forward (A->B) + reverse (B->A) = 4 edges total
		assert_eq!(built.graph.edge_count(), 4);

		let a = stops.index_of("A").unwrap();
		let b = stops.index_of("B").unwrap();

		// forward ride edge: 2a+1 -> 2b, weight 1.0 (1000m / 1000 m/min)
		let forward = graph_edge_between(&built, 2 * a + 1, 2 * b).unwrap();
		assert_eq!(forward.1, 1.0);
		// reverse ride edge: 2b+1 -> 2a, weight 1.2 (1200m / 1000 m/min)
		let reverse = graph_edge_between(&built, 2 * b + 1, 2 * a).unwrap();
		assert_eq!(reverse.1, 1.2);
	}

	fn graph_edge_between(built: &BuiltTransitGraph, from: usize, to: usize) -> Option<(usize, f64)> {
		built.graph.outgoing(from).iter().find_map(|&id| {
			let e = built.graph.edge(id);
			(e.to == to).then_some((id, e.weight))
		})
	}

	#[test]
	fn cyclic_route_has_no_reverse_edges() {
		let stops = registry(&["A", "B", "C"]);
		let mut distances = RoadDistanceTable::default();
		distances.insert("A", "B", 100.0);
		distances.insert("B", "C", 100.0);
		distances.insert("C", "A", 100.0);
		let routes = vec![BusRoute {
			name: "2".into(),
			stops: vec!["A".into(), "B".into(), "C".into(), "A".into()],
			is_roundtrip: true,
		}];
		let built = TransitGraphBuilder::new(&stops, &routes, &distances, 1.0, 60.0).build().unwrap();

		let c = stops.index_of("C").unwrap();
		let b = stops.index_of("B").unwrap();
		// no reverse edge C -> B should exist
		assert!(graph_edge_between(&built, 2 * c + 1, 2 * b).is_none());
	}

	#[test]
	fn roundtrip_must_close_or_fails_malformed() {
		let route = BusRoute { name: "X".into(), stops: vec!["A".into(), "B".into()], is_roundtrip: true };
		assert!(matches!(route.validate(), Err(Error::MalformedInput(_))));
	}

	#[test]
	fn missing_distance_fails_build() {
		let stops = registry(&["A", "B"]);
		let distances = RoadDistanceTable::default();
		let routes = vec![BusRoute { name: "1".into(), stops: vec!["A".into(), "B".into()], is_roundtrip: false }];
		let err = TransitGraphBuilder::new(&stops, &routes, &distances, 6.0, 60.0).build().unwrap_err();
		assert!(matches!(err, Error::MissingDistance { .. }));
	}
}
