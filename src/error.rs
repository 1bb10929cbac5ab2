use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::port_set::PortSet;
use crate::shape::ShapeError;

/// Errors that occur when inferring the output shape of a node.
///
/// Each error carries the diagnostic name of the node it relates to, along
/// with the offending port names, so that callers can format messages
/// without parsing strings.
#[derive(Clone, Debug, PartialEq)]
pub enum InferenceError {
    /// The node's operator type is not one of the supported variants.
    UnknownVariant { node: String, op_type: String },

    /// One or more mandatory input ports are disconnected.
    MissingRequiredInput { node: String, missing: PortSet },

    /// Fewer input ports are connected than the operator requires.
    TooFewInputs {
        node: String,
        connected: usize,
        required: usize,
    },

    /// An input is connected to a port the operator does not declare.
    UnexpectedInput { node: String, port: usize },

    /// An input has fewer dimensions than the operator requires.
    RankTooLow { node: String, port: &'static str },

    /// The offsets input is missing a shape or is not a vector.
    InvalidOffsetsRank { node: String, rank: Option<usize> },

    /// Two inputs which must have the same shape do not.
    ShapeMismatch {
        node: String,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// An input must be a constant, but no value was available.
    RequiresConstant { node: String, port: &'static str },

    /// A constant input has a value that is not valid for the operator.
    InvalidConstant { node: String, port: &'static str },

    /// An input's shape has not been inferred.
    MissingShape { node: String, port: &'static str },

    /// Slicing a shape failed.
    Shape(ShapeError),
}

/// The category of an [`InferenceError`]. See [`InferenceError::kind`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InferenceErrorKind {
    UnknownVariant,
    MissingRequiredInput,
    TooFewInputs,
    UnexpectedInput,
    RankTooLow,
    InvalidOffsetsRank,
    ShapeMismatch,
    RequiresConstant,
    InvalidConstant,
    MissingShape,
    Shape,
}

impl InferenceError {
    /// Return the general category of error.
    pub fn kind(&self) -> InferenceErrorKind {
        match self {
            Self::UnknownVariant { .. } => InferenceErrorKind::UnknownVariant,
            Self::MissingRequiredInput { .. } => InferenceErrorKind::MissingRequiredInput,
            Self::TooFewInputs { .. } => InferenceErrorKind::TooFewInputs,
            Self::UnexpectedInput { .. } => InferenceErrorKind::UnexpectedInput,
            Self::RankTooLow { .. } => InferenceErrorKind::RankTooLow,
            Self::InvalidOffsetsRank { .. } => InferenceErrorKind::InvalidOffsetsRank,
            Self::ShapeMismatch { .. } => InferenceErrorKind::ShapeMismatch,
            Self::RequiresConstant { .. } => InferenceErrorKind::RequiresConstant,
            Self::InvalidConstant { .. } => InferenceErrorKind::InvalidConstant,
            Self::MissingShape { .. } => InferenceErrorKind::MissingShape,
            Self::Shape(_) => InferenceErrorKind::Shape,
        }
    }

    /// Return the diagnostic name of the node this error relates to.
    ///
    /// Returns `None` for low-level shape errors, which are not associated
    /// with a node.
    pub fn node_name(&self) -> Option<&str> {
        match self {
            Self::UnknownVariant { node, .. }
            | Self::MissingRequiredInput { node, .. }
            | Self::TooFewInputs { node, .. }
            | Self::UnexpectedInput { node, .. }
            | Self::RankTooLow { node, .. }
            | Self::InvalidOffsetsRank { node, .. }
            | Self::ShapeMismatch { node, .. }
            | Self::RequiresConstant { node, .. }
            | Self::InvalidConstant { node, .. }
            | Self::MissingShape { node, .. } => Some(node),
            Self::Shape(_) => None,
        }
    }
}

impl Display for InferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariant { node, op_type } => {
                write!(f, "unsupported operator type \"{}\" for node `{}`", op_type, node)
            }
            Self::MissingRequiredInput { node, missing } => {
                write!(
                    f,
                    "required input ports {} are not connected for node `{}`",
                    missing, node
                )
            }
            Self::TooFewInputs {
                node,
                connected,
                required,
            } => write!(
                f,
                "node `{}` should have at least {} connected input ports, but has {}",
                node, required, connected
            ),
            Self::UnexpectedInput { node, port } => {
                write!(f, "unexpected input at port {} for node `{}`", port, node)
            }
            Self::RankTooLow { node, port } => {
                write!(f, "input \"{}\" should be at least 2D for node `{}`", port, node)
            }
            Self::InvalidOffsetsRank { node, rank } => match rank {
                Some(rank) => write!(
                    f,
                    "offsets should have rank 1 but have rank {} for node `{}`",
                    rank, node
                ),
                None => write!(f, "offsets have an unknown shape for node `{}`", node),
            },
            Self::ShapeMismatch { node, lhs, rhs } => write!(
                f,
                "inputs \"{}\" and \"{}\" should be vectors with the same shape for node `{}`",
                lhs, rhs, node
            ),
            Self::RequiresConstant { node, port } => {
                write!(f, "input \"{}\" should be a constant for node `{}`", port, node)
            }
            Self::InvalidConstant { node, port } => write!(
                f,
                "input \"{}\" should be a non-negative scalar for node `{}`",
                port, node
            ),
            Self::MissingShape { node, port } => {
                write!(f, "shape of input \"{}\" is unknown for node `{}`", port, node)
            }
            Self::Shape(err) => write!(f, "shape error: {}", err),
        }
    }
}

impl Error for InferenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShapeError> for InferenceError {
    fn from(err: ShapeError) -> Self {
        Self::Shape(err)
    }
}
