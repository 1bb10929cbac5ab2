//! Shape derivation rules for the embedding-bag operators.
//!
//! Each operator has a type which implements [`DeriveShape`]. All of the
//! operators produce an output of shape `(bags, ...embedding_dims)`, where
//! `embedding_dims` are the trailing dimensions of the weights table. They
//! differ in where the number of bags comes from.

mod offsets_sum;
mod packed_sum;
mod segments_sum;

pub use offsets_sum::OffsetsSum;
pub use packed_sum::PackedSum;
pub use segments_sum::SegmentsSum;

use crate::error::InferenceError;
use crate::op_kind::OpContract;
use crate::port::{Constant, PortSnapshot};
use crate::shape::Shape;

/// Index of the embedding table input, which is the same for all operators.
const WEIGHTS: usize = 0;

/// Inputs to shape derivation for a single node.
pub struct OpInputs<'a> {
    node: &'a str,
    contract: &'static OpContract,
    ports: &'a [PortSnapshot],
}

impl<'a> OpInputs<'a> {
    /// Create inputs for a node with diagnostic name `node`.
    ///
    /// Ports beyond the end of `ports` are treated as disconnected.
    pub fn new(node: &'a str, contract: &'static OpContract, ports: &'a [PortSnapshot]) -> Self {
        Self {
            node,
            contract,
            ports,
        }
    }

    /// Return the diagnostic name of the node.
    pub fn node(&self) -> &'a str {
        self.node
    }

    /// Return the snapshot of port `index`, if present.
    pub fn port(&self, index: usize) -> Option<&'a PortSnapshot> {
        self.ports.get(index)
    }

    /// Return the shape of port `index`, if connected and inferred.
    pub fn shape(&self, index: usize) -> Option<&'a Shape> {
        self.port(index)
            .filter(|p| p.is_connected())
            .and_then(|p| p.shape())
    }

    /// Return the constant value of port `index`, if it has one.
    pub fn constant(&self, index: usize) -> Option<&'a Constant> {
        self.port(index)
            .filter(|p| p.is_connected())
            .and_then(|p| p.constant_value())
    }

    /// Return the shape of port `index` or a [`InferenceError::MissingShape`]
    /// error if it is unknown.
    pub fn require_shape(&self, index: usize) -> Result<&'a Shape, InferenceError> {
        self.shape(index)
            .ok_or_else(|| InferenceError::MissingShape {
                node: self.node.to_string(),
                port: self.port_name(index),
            })
    }

    /// Return the diagnostic name of port `index`.
    pub fn port_name(&self, index: usize) -> &'static str {
        self.contract.port_name(index).unwrap_or("unknown")
    }

    /// Return the trailing embedding dimensions of the weights table.
    ///
    /// Fails if the weights have fewer than two dimensions, since the table
    /// must have a row dimension and at least one embedding dimension.
    pub fn embedding_dims(&self) -> Result<Shape, InferenceError> {
        let weights = self.require_shape(WEIGHTS)?;
        if weights.rank() < 2 {
            return Err(InferenceError::RankTooLow {
                node: self.node.to_string(),
                port: self.port_name(WEIGHTS),
            });
        }
        Ok(weights.slice_suffix_from(1)?)
    }
}

/// Derive the output shape of an operator from its inputs.
///
/// Implementations assume that mandatory ports have already been checked
/// for connectivity by the caller.
pub trait DeriveShape {
    fn derive_shape(&self, inputs: &OpInputs) -> Result<Shape, InferenceError>;
}

#[cfg(test)]
mod tests {
    use super::OpInputs;
    use crate::error::InferenceError;
    use crate::op_kind::EmbeddingBagKind;
    use crate::port::PortSnapshot;
    use crate::shape::shape;

    #[test]
    fn test_embedding_dims() {
        let contract = EmbeddingBagKind::PackedSum.contract();

        let ports = [PortSnapshot::with_shape(shape!(1000, 8, 64))];
        let inputs = OpInputs::new("bag", contract, &ports);
        assert_eq!(inputs.embedding_dims(), Ok(shape!(8, 64)));

        let ports = [PortSnapshot::with_shape(shape!(1000))];
        let inputs = OpInputs::new("bag", contract, &ports);
        assert_eq!(
            inputs.embedding_dims(),
            Err(InferenceError::RankTooLow {
                node: "bag".into(),
                port: "weights"
            })
        );

        let ports = [PortSnapshot::without_shape()];
        let inputs = OpInputs::new("bag", contract, &ports);
        assert_eq!(
            inputs.embedding_dims(),
            Err(InferenceError::MissingShape {
                node: "bag".into(),
                port: "weights"
            })
        );
    }

    #[test]
    fn test_disconnected_ports() {
        let contract = EmbeddingBagKind::PackedSum.contract();
        let ports = [PortSnapshot::disconnected()];
        let inputs = OpInputs::new("bag", contract, &ports);

        assert!(inputs.shape(0).is_none());
        assert!(inputs.shape(5).is_none());
        assert!(inputs.constant(1).is_none());
        assert_eq!(inputs.port_name(2), "per_sample_weights");
        assert_eq!(inputs.port_name(9), "unknown");
    }
}
