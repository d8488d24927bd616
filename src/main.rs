//! # bus router
//!
//! Reads a transit-network document from standard input, builds the
//! time-weighted wait/ride graph once, and writes the answers to the
//! document's `stat_requests` to standard output.

use std::collections::HashMap;
use std::process::ExitCode;

mod error;
mod graph;
mod io;
mod query;
mod router;
mod stats;
mod transit;

use error::Error;
use query::RouteQueryService;
use router::Router;
use transit::{RoadDistanceTable, StopRegistry, TransitGraphBuilder};

fn run() -> Result<(), Error> {
	log::info!("loading input document");
	let ingested = io::ingest(std::io::stdin())?;

	let mut stops = StopRegistry::default();
	for stop in ingested.stops {
		stops.insert(stop);
	}

	let mut distances = RoadDistanceTable::default();
	for (from, to, meters) in &ingested.road_distances {
		distances.insert(from, to, *meters);
	}

	for route in &ingested.routes {
		route.validate()?;
	}

	log::info!("loaded {} stops and {} bus routes", stops.len(), ingested.routes.len());

	let bus_stats: HashMap<String, stats::BusStats> = ingested
		.routes
		.iter()
		.map(|route| Ok((route.name.clone(), stats::bus_stats(&stops, &distances, route)?)))
		.collect::<Result<_, Error>>()?;
	let stop_buses = stats::stop_buses(&ingested.routes);

	let needs_routing = ingested.stat_requests.iter().any(|r| matches!(r, io::StatRequestKind::Route { .. }));
	let (wait_time, bus_velocity) = if needs_routing {
		let wait_time = ingested
			.wait_time
			.ok_or_else(|| Error::MalformedInput("routing_settings required for Route requests".into()))?;
		let bus_velocity = ingested
			.bus_velocity
			.ok_or_else(|| Error::MalformedInput("routing_settings required for Route requests".into()))?;
		(wait_time, bus_velocity)
	} else {
		(ingested.wait_time.unwrap_or(0.0), ingested.bus_velocity.unwrap_or(1.0))
	};

	let built = TransitGraphBuilder::new(&stops, &ingested.routes, &distances, wait_time, bus_velocity).build()?;
	let router = Router::new(&built.graph);
	let service = RouteQueryService::new(&stops, &router, &built.actions);

	let mut responses = Vec::with_capacity(ingested.stat_requests.len());
	for request in &ingested.stat_requests {
		let response = match request {
			io::StatRequestKind::Bus { id, name } => io::bus_response(*id, bus_stats.get(name)),
			io::StatRequestKind::Stop { id, name } => {
				if stops.index_of(name).is_none() {
					io::stop_response(*id, None)
				} else {
					io::stop_response(*id, Some(stop_buses.get(name).map(Vec::as_slice).unwrap_or(&[])))
				}
			}
			io::StatRequestKind::Route { id, from, to } => {
				log::trace!("answering route query {:?} -> {:?}", from, to);
				io::route_response(*id, &service.find_route(from, to))
			}
		};
		responses.push(response);
	}

	log::info!("answered {} stat requests", responses.len());
	serde_json::to_writer(std::io::stdout(), &io::OutputDocument(responses))
		.map_err(|e| Error::MalformedInput(format!("failed to write output: {e}")))?;

	Ok(())
}

fn main() -> ExitCode {
	env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));
	match run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			log::error!("{e}");
			ExitCode::FAILURE
		}
	}
}
