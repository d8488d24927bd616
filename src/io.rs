//! The JSON wire format (§6): request document in, response array out.
//!
//! Kept deliberately thin per §1 ("textual input/output syntax ... treated
//! as a thin external collaborator") — this module only maps between the
//! document shape and the domain types the rest of the crate works with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::RouteResult;
use crate::stats::BusStats;
use crate::transit::{BusRoute, EdgeAction, Stop};

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum BaseRequest {
	Stop {
		name: String,
		latitude: f64,
		longitude: f64,
		#[serde(default)]
		road_distances: HashMap<String, f64>,
	},
	Bus {
		name: String,
		stops: Vec<String>,
		is_roundtrip: bool,
	},
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum StatRequest {
	Bus { id: i64, name: String },
	Stop { id: i64, name: String },
	Route { id: i64, from: String, to: String },
}

#[derive(Deserialize, Debug)]
struct RoutingSettingsDoc {
	bus_wait_time: u32,
	bus_velocity: u32,
}

#[derive(Deserialize, Debug)]
struct InputDocument {
	base_requests: Vec<BaseRequest>,
	stat_requests: Vec<StatRequest>,
	#[serde(default)]
	routing_settings: Option<RoutingSettingsDoc>,
}

/// Everything ingest produces from the input document, before the graph is
/// built: the stop/bus registries in their raw (still name-keyed) form plus
/// the routing settings, if present.
pub struct Ingested {
	pub stops: Vec<Stop>,
	pub road_distances: Vec<(String, String, f64)>,
	pub routes: Vec<BusRoute>,
	pub stat_requests: Vec<StatRequestKind>,
	pub wait_time: Option<f64>,
	pub bus_velocity: Option<f64>,
}

pub enum StatRequestKind {
	Bus { id: i64, name: String },
	Stop { id: i64, name: String },
	Route { id: i64, from: String, to: String },
}

pub fn ingest(reader: impl std::io::Read) -> Result<Ingested, crate::error::Error> {
	let doc: InputDocument = serde_json::from_reader(reader)
		.map_err(|e| crate::error::Error::MalformedInput(e.to_string()))?;

	let mut stops = Vec::new();
	let mut road_distances = Vec::new();
	let mut routes = Vec::new();

	for req in doc.base_requests {
		match req {
			BaseRequest::Stop { name, latitude, longitude, road_distances: rd } => {
				for (neighbor, meters) in rd {
					road_distances.push((name.clone(), neighbor, meters));
				}
				stops.push(Stop { name, latitude, longitude });
			}
			BaseRequest::Bus { name, stops: route_stops, is_roundtrip } => {
				routes.push(BusRoute { name, stops: route_stops, is_roundtrip });
			}
		}
	}

	let stat_requests = doc
		.stat_requests
		.into_iter()
		.map(|r| match r {
			StatRequest::Bus { id, name } => StatRequestKind::Bus { id, name },
			StatRequest::Stop { id, name } => StatRequestKind::Stop { id, name },
			StatRequest::Route { id, from, to } => StatRequestKind::Route { id, from, to },
		})
		.collect();

	Ok(Ingested {
		stops,
		road_distances,
		routes,
		stat_requests,
		wait_time: doc.routing_settings.as_ref().map(|s| s.bus_wait_time as f64),
		bus_velocity: doc.routing_settings.as_ref().map(|s| s.bus_velocity as f64),
	})
}

/// Projects a time/length value to an integer JSON number when it is whole,
/// else a double — §6, §9 "Floating time formatting". Presentation only;
/// must never feed back into arithmetic.
fn number_or_int(x: f64) -> Value {
	if x == x.round() {
		Value::from(x.round() as i64)
	} else {
		Value::from(x)
	}
}

fn not_found(id: i64) -> Value {
	let mut m = Map::new();
	m.insert("request_id".into(), Value::from(id));
	m.insert("error_message".into(), Value::from("not found"));
	Value::Object(m)
}

pub fn bus_response(id: i64, stats: Option<&BusStats>) -> Value {
	let Some(stats) = stats else { return not_found(id) };
	let mut m = Map::new();
	m.insert("request_id".into(), Value::from(id));
	m.insert("stop_count".into(), Value::from(stats.stop_count as i64));
	m.insert("unique_stop_count".into(), Value::from(stats.unique_stop_count as i64));
	m.insert("route_length".into(), number_or_int(stats.route_length));
	m.insert("curvature".into(), Value::from(stats.curvature));
	Value::Object(m)
}

pub fn stop_response(id: i64, buses: Option<&[String]>) -> Value {
	let Some(buses) = buses else { return not_found(id) };
	let mut m = Map::new();
	m.insert("request_id".into(), Value::from(id));
	m.insert("buses".into(), Value::from(buses.to_vec()));
	Value::Object(m)
}

fn action_to_json(action: &EdgeAction) -> Value {
	let mut m = Map::new();
	match action {
		EdgeAction::Wait { stop_name, time } => {
			m.insert("type".into(), Value::from("Wait"));
			m.insert("stop_name".into(), Value::from(stop_name.clone()));
			m.insert("time".into(), number_or_int(*time));
		}
		EdgeAction::Ride { bus_name, time, span_count } => {
			m.insert("type".into(), Value::from("Bus"));
			m.insert("bus".into(), Value::from(bus_name.clone()));
			m.insert("span_count".into(), Value::from(*span_count));
			m.insert("time".into(), number_or_int(*time));
		}
	}
	Value::Object(m)
}

pub fn route_response(id: i64, result: &RouteResult) -> Value {
	match result {
		RouteResult::NotFound => not_found(id),
		RouteResult::Found { total_time, actions } => {
			let mut m = Map::new();
			m.insert("request_id".into(), Value::from(id));
			m.insert("total_time".into(), number_or_int(*total_time));
			m.insert("items".into(), Value::from(actions.iter().map(action_to_json).collect::<Vec<_>>()));
			Value::Object(m)
		}
	}
}

#[derive(Serialize)]
pub struct OutputDocument(pub Vec<Value>);
