use crate::error::InferenceError;
use crate::ops::{DeriveShape, OpInputs};
use crate::shape::Shape;

/// EmbeddingBagOffsetsSum operator.
///
/// Inputs are `weights`, `indices`, `offsets` and optional `default_index` and
/// `per_sample_weights`. `offsets` is a vector with one entry per bag, giving
/// the start of each bag within `indices`.
///
/// The output has shape `(len(offsets), ...weights.shape[1:])`.
pub struct OffsetsSum;

const OFFSETS: usize = 2;

impl DeriveShape for OffsetsSum {
    fn derive_shape(&self, inputs: &OpInputs) -> Result<Shape, InferenceError> {
        let embedding_dims = inputs.embedding_dims()?;

        let offsets = match inputs.shape(OFFSETS) {
            Some(offsets) if offsets.rank() == 1 => offsets,
            offsets => {
                return Err(InferenceError::InvalidOffsetsRank {
                    node: inputs.node().to_string(),
                    rank: offsets.map(|s| s.rank()),
                });
            }
        };

        Ok(offsets.slice_prefix(1)?.concat(&embedding_dims))
    }
}
