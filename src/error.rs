//! Crate-wide error taxonomy.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
	#[error("malformed input: {0}")]
	MalformedInput(String),

	#[error("no road distance known between {from:?} and {to:?}")]
	MissingDistance { from: String, to: String },

	#[error("unknown stop or bus: {0:?}")]
	UnknownEntity(String),

	#[error("no route between the given stops")]
	NoPath,

	#[error("invalid vertex {vertex} (graph has {vertex_count} vertices)")]
	InvalidVertex { vertex: usize, vertex_count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
