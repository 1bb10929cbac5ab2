//! The closed set of supported operators and their port contracts.

use std::fmt;
use std::str::FromStr;

use crate::port_set::PortSet;

/// Static description of an operator's input ports.
///
/// The port counts and op type names are part of the contract with the IR
/// format and must not change without a new operator version.
#[derive(Debug, PartialEq)]
pub struct OpContract {
    /// Operator type name in the IR.
    pub op_type: &'static str,

    /// Operator set version in which this operator was introduced.
    pub version: &'static str,

    /// Diagnostic names of each input port. The length of this slice is the
    /// number of declared input ports.
    pub port_names: &'static [&'static str],

    /// Ports which must be connected.
    pub mandatory_ports: PortSet,

    /// Minimum number of connected ports.
    ///
    /// This may exceed the number of mandatory ports for operators that
    /// require "at least K of N" optional inputs.
    pub min_connected: usize,

    /// Number of output ports.
    pub output_ports: usize,
}

impl OpContract {
    /// Return the total number of declared input ports.
    pub fn total_ports(&self) -> usize {
        self.port_names.len()
    }

    /// Return the diagnostic name of input port `index`.
    pub fn port_name(&self, index: usize) -> Option<&'static str> {
        self.port_names.get(index).copied()
    }
}

static OFFSETS_SUM: OpContract = OpContract {
    op_type: "EmbeddingBagOffsetsSum",
    version: "opset3",
    port_names: &[
        "weights",
        "indices",
        "offsets",
        "default_index",
        "per_sample_weights",
    ],
    mandatory_ports: PortSet::from_indices(&[0, 1, 2]),
    min_connected: 3,
    output_ports: 1,
};

static PACKED_SUM: OpContract = OpContract {
    op_type: "EmbeddingBagPackedSum",
    version: "opset3",
    port_names: &["weights", "indices", "per_sample_weights"],
    mandatory_ports: PortSet::from_indices(&[0, 1]),
    min_connected: 2,
    output_ports: 1,
};

static SEGMENTS_SUM: OpContract = OpContract {
    op_type: "EmbeddingSegmentsSum",
    version: "opset3",
    port_names: &[
        "weights",
        "indices",
        "segment_ids",
        "num_segments",
        "default_index",
        "per_sample_weights",
    ],
    mandatory_ports: PortSet::from_indices(&[0, 1, 2, 3]),
    min_connected: 4,
    output_ports: 1,
};

/// Embedding-bag operator variants.
///
/// Each variant gathers rows from an embedding table and sums them into bags,
/// differing in how indices are grouped into bags.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum EmbeddingBagKind {
    /// Bags are contiguous runs of a flat indices vector, with start positions
    /// given by an offsets vector.
    OffsetsSum,
    /// Indices are a 2D `(bags, bag_size)` tensor.
    PackedSum,
    /// Each index is labeled with the segment it belongs to.
    SegmentsSum,
}

impl EmbeddingBagKind {
    pub const ALL: [EmbeddingBagKind; 3] = [Self::OffsetsSum, Self::PackedSum, Self::SegmentsSum];

    /// Resolve an IR operator type name.
    pub fn from_op_type(op_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.contract().op_type == op_type)
    }

    pub fn contract(&self) -> &'static OpContract {
        match self {
            Self::OffsetsSum => &OFFSETS_SUM,
            Self::PackedSum => &PACKED_SUM,
            Self::SegmentsSum => &SEGMENTS_SUM,
        }
    }

    pub fn op_type(&self) -> &'static str {
        self.contract().op_type
    }

    pub fn version(&self) -> &'static str {
        self.contract().version
    }
}

/// Error returned when parsing an unsupported operator type name.
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownOpType(pub String);

impl fmt::Display for UnknownOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown embedding bag operator \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownOpType {}

impl FromStr for EmbeddingBagKind {
    type Err = UnknownOpType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_op_type(s).ok_or_else(|| UnknownOpType(s.to_string()))
    }
}

impl fmt::Display for EmbeddingBagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op_type())
    }
}
