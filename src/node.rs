//! Interface between shape inference and the host graph.

use std::borrow::Cow;

use crate::port::PortSnapshot;
use crate::shape::Shape;

/// A node in the host IR graph whose output shape can be inferred.
///
/// Shape inference only reads the node's input ports and writes the shape of
/// its single output port. The host graph owns all other node state.
pub trait InferenceNode {
    /// Return the operator type name, eg. `"EmbeddingBagOffsetsSum"`.
    fn op_type(&self) -> &str;

    /// Return the debug name of this node, if it has one.
    fn name(&self) -> Option<&str>;

    /// Return the ID of this node within the graph.
    fn id(&self) -> usize;

    /// Return the number of input ports this node has.
    fn num_input_ports(&self) -> usize;

    /// Return a snapshot of input port `index`.
    ///
    /// Returns a disconnected snapshot if `index >= num_input_ports()`.
    fn input_port(&self, index: usize) -> PortSnapshot;

    /// Set the shape of the node's output port.
    fn set_output_shape(&mut self, shape: Shape);

    /// Return the name used for this node in diagnostics.
    ///
    /// This is the node's name if it has one, or its ID otherwise.
    fn name_or_id(&self) -> Cow<'_, str> {
        match self.name() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.id().to_string()),
        }
    }
}

/// A standalone node which owns snapshots of its input ports.
///
/// This is useful when the host graph cannot hand out mutable access to
/// several nodes at once, for example to infer independent nodes in
/// parallel. The host copies the inputs in, runs inference, then reads
/// [`output_shape`](SnapshotNode::output_shape) back.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotNode {
    id: usize,
    name: Option<String>,
    op_type: String,
    inputs: Vec<PortSnapshot>,
    output_shape: Option<Shape>,
}

impl SnapshotNode {
    pub fn new(id: usize, op_type: impl Into<String>, inputs: Vec<PortSnapshot>) -> Self {
        Self {
            id,
            name: None,
            op_type: op_type.into(),
            inputs,
            output_shape: None,
        }
    }

    /// Set the debug name of this node.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Return the shape written to the output port, if inference succeeded.
    pub fn output_shape(&self) -> Option<&Shape> {
        self.output_shape.as_ref()
    }

    /// Replace the snapshot of input port `index`, growing the port list with
    /// disconnected ports if needed.
    pub fn set_input(&mut self, index: usize, port: PortSnapshot) {
        if index >= self.inputs.len() {
            self.inputs.resize(index + 1, PortSnapshot::disconnected());
        }
        self.inputs[index] = port;
    }
}

impl InferenceNode for SnapshotNode {
    fn op_type(&self) -> &str {
        &self.op_type
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn id(&self) -> usize {
        self.id
    }

    fn num_input_ports(&self) -> usize {
        self.inputs.len()
    }

    fn input_port(&self, index: usize) -> PortSnapshot {
        self.inputs.get(index).cloned().unwrap_or_default()
    }

    fn set_output_shape(&mut self, shape: Shape) {
        self.output_shape = Some(shape);
    }
}
