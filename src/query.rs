//! Route Query Service (§4.4): maps stop names to vertices, invokes the
//! router, and reconstructs the action sequence.

use crate::router::Router;
use crate::transit::{EdgeAction, StopRegistry};

#[derive(Clone, Debug, PartialEq)]
pub enum RouteResult {
	NotFound,
	Found { total_time: f64, actions: Vec<EdgeAction> },
}

pub struct RouteQueryService<'a> {
	stops: &'a StopRegistry,
	router: &'a Router<'a>,
	actions: &'a [EdgeAction],
}

impl<'a> RouteQueryService<'a> {
	pub fn new(stops: &'a StopRegistry, router: &'a Router<'a>, actions: &'a [EdgeAction]) -> Self {
		Self { stops, router, actions }
	}

	/// Enters the graph at the "arrived" vertex of `from_name` and exits at
	/// the "arrived" vertex of `to_name`, so the first action in any
	/// non-empty itinerary is always a Wait at the origin (§4.4).
	pub fn find_route(&self, from_name: &str, to_name: &str) -> RouteResult {
		let (Some(from_idx), Some(to_idx)) =
			(self.stops.index_of(from_name), self.stops.index_of(to_name))
		else {
			return RouteResult::NotFound;
		};

		let from_vertex = 2 * from_idx;
		let to_vertex = 2 * to_idx;

		log::trace!("routing {:?} (v{}) -> {:?} (v{})", from_name, from_vertex, to_name, to_vertex);

		match self.router.build_route(from_vertex, to_vertex) {
			Ok(Some((_, handle))) => {
				let actions: Vec<EdgeAction> = (0..self.router.route_edge_count(handle))
					.map(|i| self.actions[self.router.route_edge(handle, i)].clone())
					.collect();
				// §8: total_time must equal the sum of the actions' own times,
				// not merely the router's internally tracked path weight.
				let total_time = actions.iter().map(EdgeAction::time).sum();
				RouteResult::Found { total_time, actions }
			}
			Ok(None) => RouteResult::NotFound,
			// InvalidVertex cannot happen here: vertices come from a valid
			// dense stop index, always within the graph's vertex count.
			Err(_) => RouteResult::NotFound,
		}
	}
}
