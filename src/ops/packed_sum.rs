use crate::error::InferenceError;
use crate::ops::{DeriveShape, OpInputs};
use crate::shape::Shape;

/// EmbeddingBagPackedSum operator.
///
/// Inputs are `weights`, `indices` and optional `per_sample_weights`.
/// `indices` has shape `(bags, bag_size)`.
///
/// The output has shape `(indices.shape[0], ...weights.shape[1:])`.
#[derive(Default)]
pub struct PackedSum {
    /// Require `indices` to have at least two dimensions.
    ///
    /// When false, any `indices` with at least one dimension is accepted,
    /// since only its leading dimension contributes to the output.
    pub strict_indices_rank: bool,
}

const INDICES: usize = 1;

impl DeriveShape for PackedSum {
    fn derive_shape(&self, inputs: &OpInputs) -> Result<Shape, InferenceError> {
        let embedding_dims = inputs.embedding_dims()?;
        let indices = inputs.require_shape(INDICES)?;

        if self.strict_indices_rank && indices.rank() < 2 {
            return Err(InferenceError::RankTooLow {
                node: inputs.node().to_string(),
                port: inputs.port_name(INDICES),
            });
        }

        Ok(indices.slice_prefix(1)?.concat(&embedding_dims))
    }
}
