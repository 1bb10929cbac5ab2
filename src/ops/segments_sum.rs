use crate::error::InferenceError;
use crate::ops::{DeriveShape, OpInputs};
use crate::shape::{Dimension, Shape};

/// EmbeddingSegmentsSum operator.
///
/// Inputs are `weights`, `indices`, `segment_ids`, `num_segments` and
/// optional `default_index` and `per_sample_weights`. `indices` and
/// `segment_ids` are vectors of the same length which map each index to the
/// bag it contributes to. An unknown length only matches another unknown
/// length.
///
/// The output has shape `(num_segments, ...weights.shape[1:])`. The number of
/// segments must have been resolved to a constant before shape inference.
pub struct SegmentsSum;

const INDICES: usize = 1;
const SEGMENT_IDS: usize = 2;
const NUM_SEGMENTS: usize = 3;

impl DeriveShape for SegmentsSum {
    fn derive_shape(&self, inputs: &OpInputs) -> Result<Shape, InferenceError> {
        let embedding_dims = inputs.embedding_dims()?;

        let indices = inputs.shape(INDICES);
        let segment_ids = inputs.shape(SEGMENT_IDS);
        match (indices, segment_ids) {
            (Some(indices), Some(segment_ids))
                if indices.rank() == 1 && indices == segment_ids => {}
            _ => {
                return Err(InferenceError::ShapeMismatch {
                    node: inputs.node().to_string(),
                    lhs: inputs.port_name(INDICES),
                    rhs: inputs.port_name(SEGMENT_IDS),
                });
            }
        }

        let Some(num_segments) = inputs.constant(NUM_SEGMENTS) else {
            return Err(InferenceError::RequiresConstant {
                node: inputs.node().to_string(),
                port: inputs.port_name(NUM_SEGMENTS),
            });
        };
        let num_segments = num_segments
            .as_single()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| InferenceError::InvalidConstant {
                node: inputs.node().to_string(),
                port: inputs.port_name(NUM_SEGMENTS),
            })?;

        Ok(Shape::new([Dimension::Known(num_segments)]).concat(&embedding_dims))
    }
}

#[cfg(test)]
mod tests {
    use bagshape_testing::TestCases;

    use super::SegmentsSum;
    use crate::error::{InferenceError, InferenceErrorKind};
    use crate::op_kind::EmbeddingBagKind;
    use crate::ops::{DeriveShape, OpInputs};
    use crate::port::{Constant, PortSnapshot};
    use crate::shape::{Shape, shape};

    fn derive(
        weights: Shape,
        indices: Shape,
        segment_ids: Shape,
        num_segments: PortSnapshot,
    ) -> Result<Shape, InferenceError> {
        let ports = [
            PortSnapshot::with_shape(weights),
            PortSnapshot::with_shape(indices),
            PortSnapshot::with_shape(segment_ids),
            num_segments,
        ];
        let inputs = OpInputs::new("seg", EmbeddingBagKind::SegmentsSum.contract(), &ports);
        SegmentsSum.derive_shape(&inputs)
    }

    #[test]
    fn test_segments_sum() {
        #[derive(Debug)]
        struct Case {
            weights: Shape,
            indices: Shape,
            segment_ids: Shape,
            num_segments: Constant,
            expected: Shape,
        }

        let cases = [
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(10),
                num_segments: Constant::Scalar(5),
                expected: shape!(5, 64),
            },
            // Single-element vector constant
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(10),
                num_segments: Constant::Vector(vec![3]),
                expected: shape!(3, 64),
            },
            // Unknown index count
            Case {
                weights: shape!(1000, ?),
                indices: shape!(?),
                segment_ids: shape!(?),
                num_segments: Constant::Scalar(0),
                expected: shape!(0, ?),
            },
        ];

        cases.test_each(|case| {
            let out = derive(
                case.weights.clone(),
                case.indices.clone(),
                case.segment_ids.clone(),
                PortSnapshot::with_constant(case.num_segments.clone()),
            )
            .unwrap();
            assert_eq!(out, case.expected);
        });
    }

    #[test]
    fn test_segments_sum_invalid() {
        #[derive(Debug)]
        struct Case {
            weights: Shape,
            indices: Shape,
            segment_ids: Shape,
            num_segments: PortSnapshot,
            expected: InferenceErrorKind,
        }

        let cases = [
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(9),
                num_segments: PortSnapshot::with_constant(5i64),
                expected: InferenceErrorKind::ShapeMismatch,
            },
            // Unknown length does not match a known one
            Case {
                weights: shape!(1000, 64),
                indices: shape!(?),
                segment_ids: shape!(10),
                num_segments: PortSnapshot::with_constant(5i64),
                expected: InferenceErrorKind::ShapeMismatch,
            },
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(?),
                num_segments: PortSnapshot::with_constant(5i64),
                expected: InferenceErrorKind::ShapeMismatch,
            },
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10, 1),
                segment_ids: shape!(10, 1),
                num_segments: PortSnapshot::with_constant(5i64),
                expected: InferenceErrorKind::ShapeMismatch,
            },
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(10, 1),
                num_segments: PortSnapshot::with_constant(5i64),
                expected: InferenceErrorKind::ShapeMismatch,
            },
            Case {
                weights: shape!(1000),
                indices: shape!(10),
                segment_ids: shape!(10),
                num_segments: PortSnapshot::with_constant(5i64),
                expected: InferenceErrorKind::RankTooLow,
            },
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(10),
                num_segments: PortSnapshot::with_shape(Shape::scalar()),
                expected: InferenceErrorKind::RequiresConstant,
            },
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(10),
                num_segments: PortSnapshot::with_constant(-1i64),
                expected: InferenceErrorKind::InvalidConstant,
            },
            Case {
                weights: shape!(1000, 64),
                indices: shape!(10),
                segment_ids: shape!(10),
                num_segments: PortSnapshot::with_constant(vec![2i64, 3]),
                expected: InferenceErrorKind::InvalidConstant,
            },
        ];

        cases.test_each(|case| {
            let err = derive(
                case.weights.clone(),
                case.indices.clone(),
                case.segment_ids.clone(),
                case.num_segments.clone(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), case.expected);
        });
    }

    #[test]
    fn test_segments_sum_mismatch_payload() {
        let err = derive(
            shape!(1000, 64),
            shape!(10),
            shape!(9),
            PortSnapshot::with_constant(5i64),
        )
        .unwrap_err();
        assert_eq!(
            err,
            InferenceError::ShapeMismatch {
                node: "seg".into(),
                lhs: "indices",
                rhs: "segment_ids",
            }
        );
    }
}
