//! Dispatch of shape inference to operator rules.

use rayon::prelude::*;

use crate::diagnostics::{DiagnosticLevel, Diagnostics};
use crate::env::{DIAGNOSTICS_VAR, STRICT_INDICES_VAR, flag_value, parse_value};
use crate::error::InferenceError;
use crate::node::InferenceNode;
use crate::op_kind::EmbeddingBagKind;
use crate::ops::{DeriveShape, OffsetsSum, OpInputs, PackedSum, SegmentsSum};
use crate::port::PortSnapshot;
use crate::port_set::PortSet;
use crate::shape::Shape;

/// Options that control shape inference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InferOptions {
    /// Verbosity of diagnostics reported during inference.
    pub diagnostics: DiagnosticLevel,

    /// Require the indices of `EmbeddingBagPackedSum` to be at least 2D.
    ///
    /// By default only the leading dimension of the indices is checked.
    pub strict_indices_rank: bool,
}

impl InferOptions {
    /// Read options from the `BAGSHAPE_DIAGNOSTICS` and
    /// `BAGSHAPE_STRICT_INDICES` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read options using `lookup` to get the value of each variable.
    ///
    /// Unset variables use the default option values. Invalid values are
    /// reported to stderr and also use the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let diagnostics = lookup(DIAGNOSTICS_VAR);
        let strict_indices = lookup(STRICT_INDICES_VAR);
        Self {
            diagnostics: parse_value(
                DIAGNOSTICS_VAR,
                diagnostics.as_deref(),
                DiagnosticLevel::Off,
            ),
            strict_indices_rank: flag_value(strict_indices.as_deref(), false),
        }
    }
}

/// Infer the output shape of `node` using default options.
///
/// See [`Inferencer::infer`].
pub fn infer<N: InferenceNode + ?Sized>(node: &mut N) -> Result<Shape, InferenceError> {
    Inferencer::new(InferOptions::default()).infer(node)
}

/// Runs shape inference for nodes, reporting diagnostics.
pub struct Inferencer {
    options: InferOptions,
    diagnostics: Diagnostics,
}

impl Default for Inferencer {
    fn default() -> Self {
        Self::new(InferOptions::default())
    }
}

impl Inferencer {
    pub fn new(options: InferOptions) -> Self {
        let diagnostics = Diagnostics::with_level(options.diagnostics);
        Self {
            options,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Infer the output shape of `node` and write it to the node's output
    /// port.
    ///
    /// This resolves the operator from the node's type, checks that the
    /// ports required by the operator are connected and then derives the
    /// output shape. On failure the node's output is left unchanged.
    ///
    /// Inference is a pure function of the node's input ports, so calling
    /// this repeatedly with the same inputs produces the same result.
    pub fn infer<N: InferenceNode + ?Sized>(&self, node: &mut N) -> Result<Shape, InferenceError> {
        match self.derive(&*node) {
            Ok(shape) => {
                self.diagnostics.info(
                    &node.name_or_id(),
                    format_args!("inferred {} output shape {}", node.op_type(), shape),
                );
                node.set_output_shape(shape.clone());
                Ok(shape)
            }
            Err(err) => {
                self.diagnostics
                    .warn(node.id(), &node.name_or_id(), format_args!("{}", err));
                Err(err)
            }
        }
    }

    /// Infer output shapes for a batch of nodes in parallel.
    ///
    /// The nodes must be independent of each other, ie. no node may consume
    /// the output of another node in the batch. The result for each node is
    /// returned in the same order as `nodes`.
    pub fn infer_parallel<N: InferenceNode + Send>(
        &self,
        nodes: &mut [N],
    ) -> Vec<Result<Shape, InferenceError>> {
        nodes.par_iter_mut().map(|node| self.infer(node)).collect()
    }

    fn derive<N: InferenceNode + ?Sized>(&self, node: &N) -> Result<Shape, InferenceError> {
        let node_name = node.name_or_id();

        let kind = EmbeddingBagKind::from_op_type(node.op_type()).ok_or_else(|| {
            InferenceError::UnknownVariant {
                node: node_name.to_string(),
                op_type: node.op_type().to_string(),
            }
        })?;
        let contract = kind.contract();

        let ports: Vec<PortSnapshot> = (0..node.num_input_ports())
            .map(|idx| node.input_port(idx))
            .collect();

        let mut connected = PortSet::empty();
        for (idx, port) in ports.iter().enumerate() {
            if !port.is_connected() {
                continue;
            }
            if idx >= contract.total_ports() {
                return Err(InferenceError::UnexpectedInput {
                    node: node_name.to_string(),
                    port: idx,
                });
            }
            connected.insert(idx);
        }

        if !contract.mandatory_ports.is_subset(&connected) {
            return Err(InferenceError::MissingRequiredInput {
                node: node_name.to_string(),
                missing: contract.mandatory_ports.difference(&connected),
            });
        }

        if connected.len() < contract.min_connected {
            return Err(InferenceError::TooFewInputs {
                node: node_name.to_string(),
                connected: connected.len(),
                required: contract.min_connected,
            });
        }

        let inputs = OpInputs::new(&node_name, contract, &ports);
        match kind {
            EmbeddingBagKind::OffsetsSum => OffsetsSum.derive_shape(&inputs),
            EmbeddingBagKind::PackedSum => PackedSum {
                strict_indices_rank: self.options.strict_indices_rank,
            }
            .derive_shape(&inputs),
            EmbeddingBagKind::SegmentsSum => SegmentsSum.derive_shape(&inputs),
        }
    }
}
