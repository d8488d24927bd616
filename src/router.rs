//! Shortest-path router over a built [`Graph`].
//!
//! The graph is static and has non-negative weights, so plain Dijkstra from
//! a single source gives exact minimum-weight distances to every other
//! reachable vertex. Queries tend to repeat sources (the same stop is
//! frequently used as an origin across many route requests), so each
//! source's Dijkstra run is cached for the lifetime of the router.

use std::cell::RefCell;
use std::collections::HashMap;

use noisy_float::prelude::{n64, N64};
use priority_queue::PriorityQueue;

use crate::error::Error;
use crate::graph::Graph;

/// A reachability record for one destination vertex, as seen from a fixed
/// source: the minimum weight to reach it, and the edge used on the last
/// hop of some shortest path (`None` for the source itself).
#[derive(Clone, Copy, Debug)]
struct Reached {
	weight: N64,
	via_edge: Option<usize>,
}

/// Dijkstra's result from a single source: distance/predecessor-edge per
/// reachable vertex.
type SourceTable = HashMap<usize, Reached>;

/// Opaque handle identifying a computed route, valid for the router's
/// lifetime. Carries the reconstructed edge sequence directly; the spec's
/// `get_route_edge(handle, i)` indexing is just a slice index into it.
#[derive(Clone, Copy, Debug)]
pub struct RouteHandle(usize);

pub struct BuiltRoute {
	pub total_weight: f64,
	pub edges: Vec<usize>,
}

pub struct Router<'g> {
	graph: &'g Graph,
	/// Dijkstra tables, memoized per source vertex.
	source_cache: RefCell<HashMap<usize, SourceTable>>,
	/// Reconstructed routes returned so far, indexed by `RouteHandle`.
	routes: RefCell<Vec<BuiltRoute>>,
}

impl<'g> Router<'g> {
	pub fn new(graph: &'g Graph) -> Self {
		Self {
			graph,
			source_cache: RefCell::new(HashMap::new()),
			routes: RefCell::new(Vec::new()),
		}
	}

	fn check_vertex(&self, v: usize) -> Result<(), Error> {
		if v >= self.graph.vertex_count() {
			Err(Error::InvalidVertex { vertex: v, vertex_count: self.graph.vertex_count() })
		} else {
			Ok(())
		}
	}

	/// Runs (or reuses a cached run of) Dijkstra from `from`.
	fn dijkstra_from(&self, from: usize) -> SourceTable {
		if let Some(table) = self.source_cache.borrow().get(&from) {
			return table.clone();
		}
		let mut table: SourceTable = HashMap::new();
		table.insert(from, Reached { weight: n64(0.0), via_edge: None });

		// Ties on weight are broken by vertex id so that identical graphs
		// always relax vertices in the same order, making the resulting
		// shortest path deterministic (§4.2, §5).
		let mut queue: PriorityQueue<usize, std::cmp::Reverse<(N64, usize)>> = PriorityQueue::new();
		queue.push(from, std::cmp::Reverse((n64(0.0), from)));

		while let Some((u, _)) = queue.pop() {
			let d = table.get(&u).unwrap().weight;
			for &edge_id in self.graph.outgoing(u) {
				let e = self.graph.edge(edge_id);
				let nd = d + n64(e.weight);
				let better = table.get(&e.to).map_or(true, |r| nd < r.weight);
				if better {
					table.insert(e.to, Reached { weight: nd, via_edge: Some(edge_id) });
					queue.push(e.to, std::cmp::Reverse((nd, e.to)));
				}
			}
		}

		self.source_cache.borrow_mut().insert(from, table.clone());
		table
	}

	/// Finds the minimum-weight path `from -> to`, returning a handle that
	/// can be walked edge-by-edge with [`Router::route_edge`] /
	/// [`Router::route_edge_count`].
	pub fn build_route(&self, from: usize, to: usize) -> Result<Option<(f64, RouteHandle)>, Error> {
		self.check_vertex(from)?;
		self.check_vertex(to)?;

		let table = self.dijkstra_from(from);
		let Some(reached) = table.get(&to) else {
			return Ok(None);
		};

		let mut edges = Vec::new();
		let mut v = to;
		while let Some(Reached { via_edge: Some(edge_id), .. }) = table.get(&v) {
			edges.push(*edge_id);
			v = self.graph.edge(*edge_id).from;
		}
		edges.reverse();

		let mut routes = self.routes.borrow_mut();
		let handle = RouteHandle(routes.len());
		routes.push(BuiltRoute { total_weight: reached.weight.raw(), edges });
		Ok(Some((reached.weight.raw(), handle)))
	}

	/// The `i`th edge id of a previously built route.
	pub fn route_edge(&self, handle: RouteHandle, i: usize) -> usize {
		self.routes.borrow()[handle.0].edges[i]
	}

	pub fn route_edge_count(&self, handle: RouteHandle) -> usize {
		self.routes.borrow()[handle.0].edges.len()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn line_graph() -> Graph {
		let mut g = Graph::new(3);
		g.add_edge(0, 1, 1.0).unwrap();
		g.add_edge(1, 2, 2.0).unwrap();
		g
	}

	#[test]
	fn finds_shortest_path_and_reconstructs_edges() {
		let g = line_graph();
		let r = Router::new(&g);
		let (weight, handle) = r.build_route(0, 2).unwrap().unwrap();
		assert_eq!(weight, 3.0);
		assert_eq!(r.route_edge_count(handle), 2);
		assert_eq!(r.route_edge(handle, 0), 0);
		assert_eq!(r.route_edge(handle, 1), 1);
	}

	#[test]
	fn unreachable_pair_returns_none() {
		let g = line_graph();
		let r = Router::new(&g);
		assert!(r.build_route(2, 0).unwrap().is_none());
	}

	#[test]
	fn same_vertex_is_zero_weight_empty_path() {
		let g = line_graph();
		let r = Router::new(&g);
		let (weight, handle) = r.build_route(1, 1).unwrap().unwrap();
		assert_eq!(weight, 0.0);
		assert_eq!(r.route_edge_count(handle), 0);
	}

	#[test]
	fn picks_cheaper_of_two_parallel_edges() {
		let mut g = Graph::new(2);
		g.add_edge(0, 1, 5.0).unwrap();
		let cheap = g.add_edge(0, 1, 1.0).unwrap();
		let r = Router::new(&g);
		let (weight, handle) = r.build_route(0, 1).unwrap().unwrap();
		assert_eq!(weight, 1.0);
		assert_eq!(r.route_edge(handle, 0), cheap);
	}

	#[test]
	fn invalid_vertex_fails() {
		let g = line_graph();
		let r = Router::new(&g);
		assert!(matches!(r.build_route(5, 0), Err(Error::InvalidVertex { .. })));
	}
}
