//! Shape inference for embedding-bag operators.
//!
//! # About embedding bags
//!
//! An embedding bag operator gathers rows from an embedding table at a set of
//! indices and sums them into "bags". Three variants differ in how indices
//! are grouped into bags:
//!
//! - `EmbeddingBagOffsetsSum` takes a flat vector of indices and a vector of
//!   offsets marking the start of each bag.
//! - `EmbeddingBagPackedSum` takes a `(bags, bag_size)` matrix of indices.
//! - `EmbeddingSegmentsSum` takes a flat vector of indices, a parallel vector
//!   of segment IDs and a constant number of segments.
//!
//! In each case the output has one row per bag and the trailing dimensions
//! of the embedding table.
//!
//! # Crate overview
//!
//! The host IR graph exposes its nodes through the [`InferenceNode`] trait.
//! An [`Inferencer`] resolves the node's operator from its type name, checks
//! the operator's port contract ([`OpContract`]), derives the output shape
//! and writes it to the node's output port. Failures are reported as a
//! structured [`InferenceError`].
//!
//! Shapes may contain [unknown dimensions](Dimension::Unknown). These are
//! propagated to the output rather than guessed.
//!
//! ```
//! use bagshape::{PortSnapshot, Shape, SnapshotNode, infer};
//!
//! let mut node = SnapshotNode::new(0, "EmbeddingBagPackedSum", vec![
//!     PortSnapshot::with_shape(Shape::from_fixed(&[1000, 64])),
//!     PortSnapshot::with_shape(Shape::from_fixed(&[4, 3])),
//! ]);
//! let shape = infer(&mut node).unwrap();
//! assert_eq!(shape, Shape::from_fixed(&[4, 64]));
//! ```
//!
//! The [`graph`] module provides a small in-memory graph which implements
//! the host interface and can infer shapes for a whole model.

mod diagnostics;
pub mod env;
mod error;
pub mod graph;
mod infer;
mod node;
mod op_kind;
pub mod ops;
mod port;
mod port_set;
mod shape;

pub use diagnostics::{DiagnosticLevel, Diagnostics};
pub use error::{InferenceError, InferenceErrorKind};
pub use infer::{InferOptions, Inferencer, infer};
pub use node::{InferenceNode, SnapshotNode};
pub use op_kind::{EmbeddingBagKind, OpContract, UnknownOpType};
pub use port::{Constant, PortSnapshot};
pub use port_set::PortSet;
pub use shape::{Dimension, Shape, ShapeError};
