//! A minimal directed weighted graph.
//!
//! Vertex count is fixed at construction; edges are append-only and keep a
//! monotonically increasing id, so parallel edges between the same pair of
//! vertices are never collapsed (the transit builder relies on this: several
//! buses between the same two stops must all survive as distinct edges).

use crate::error::Error;

/// An edge, as stored by id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeData {
	pub from: usize,
	pub to: usize,
	pub weight: f64,
}

#[derive(Clone, Debug)]
pub struct Graph {
	vertex_count: usize,
	edges: Vec<EdgeData>,
	/// outgoing[v] holds the ids of edges leaving v, in insertion order
	outgoing: Vec<Vec<usize>>,
}

impl Graph {
	pub fn new(vertex_count: usize) -> Self {
		Self {
			vertex_count,
			edges: Vec::new(),
			outgoing: vec![Vec::new(); vertex_count],
		}
	}

	pub fn vertex_count(&self) -> usize {
		self.vertex_count
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	fn check_vertex(&self, v: usize) -> Result<(), Error> {
		if v >= self.vertex_count {
			Err(Error::InvalidVertex { vertex: v, vertex_count: self.vertex_count })
		} else {
			Ok(())
		}
	}

	/// Adds a directed edge `from -> to` with the given weight, returning its
	/// freshly allocated id. No deduplication; parallel edges are kept.
	pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<usize, Error> {
		self.check_vertex(from)?;
		self.check_vertex(to)?;
		let id = self.edges.len();
		self.edges.push(EdgeData { from, to, weight });
		self.outgoing[from].push(id);
		Ok(id)
	}

	/// Edge ids leaving `v`, in the order they were added.
	pub fn outgoing(&self, v: usize) -> &[usize] {
		&self.outgoing[v]
	}

	pub fn edge(&self, id: usize) -> EdgeData {
		self.edges[id]
	}
}
