//! A minimal IR graph which hosts embedding-bag operators.
//!
//! The graph consists of values, which have an optional shape and optional
//! constant value, and operator nodes, which consume values through input
//! ports and produce a single output value. It is used to run shape inference
//! over a whole model in one pass.

use std::error::Error;
use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;

use crate::error::InferenceError;
use crate::infer::Inferencer;
use crate::node::InferenceNode;
use crate::port::{Constant, PortSnapshot};
use crate::shape::Shape;


/// ID of an operator node in a [`Graph`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(usize);

/// ID of a value in a [`Graph`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ValueId(usize);

#[derive(Debug)]
struct Value {
    name: Option<String>,
    shape: Option<Shape>,
    constant: Option<Constant>,
}

#[derive(Debug)]
struct OperatorNode {
    name: Option<String>,
    op_type: String,
    /// Value connected to each input port, or `None` if disconnected.
    inputs: Vec<Option<ValueId>>,
    output: ValueId,
}

/// Errors that occur when running shape inference over a graph.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphError {
    /// A node or value ID is not valid for this graph.
    InvalidNodeId,

    /// Shape inference for a node failed.
    Inference { node: NodeId, error: InferenceError },
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNodeId => write!(f, "invalid node ID"),
            Self::Inference { error, .. } => write!(f, "shape inference failed: {}", error),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNodeId => None,
            Self::Inference { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Default)]
pub struct Graph {
    values: Vec<Value>,
    nodes: Vec<OperatorNode>,
    node_names: FxHashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value with an optional shape, such as a model input.
    pub fn add_value(&mut self, name: Option<&str>, shape: Option<Shape>) -> ValueId {
        self.push_value(Value {
            name: name.map(|n| n.to_string()),
            shape,
            constant: None,
        })
    }

    /// Add a constant-folded value.
    pub fn add_constant(&mut self, name: Option<&str>, value: impl Into<Constant>) -> ValueId {
        let value = value.into();
        self.push_value(Value {
            name: name.map(|n| n.to_string()),
            shape: Some(value.shape()),
            constant: Some(value),
        })
    }

    /// Add an operator node and return its ID and the ID of its output value.
    ///
    /// `inputs` lists the value connected to each input port, with `None`
    /// for disconnected ports. Nodes must be added in topological order, ie.
    /// after the nodes which produce their inputs.
    pub fn add_op(
        &mut self,
        name: Option<&str>,
        op_type: &str,
        inputs: &[Option<ValueId>],
    ) -> (NodeId, ValueId) {
        let output = self.push_value(Value {
            name: name.map(|n| format!("{}_output", n)),
            shape: None,
            constant: None,
        });
        let id = NodeId(self.nodes.len());
        self.nodes.push(OperatorNode {
            name: name.map(|n| n.to_string()),
            op_type: op_type.to_string(),
            inputs: inputs.to_vec(),
            output,
        });
        if let Some(name) = name {
            self.node_names.insert(name.to_string(), id);
        }
        (id, output)
    }

    /// Return the number of operator nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find an operator node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    /// Return the value produced by an operator node.
    pub fn node_output(&self, id: NodeId) -> Option<ValueId> {
        self.nodes.get(id.0).map(|n| n.output)
    }

    /// Return the shape of a value, if known.
    pub fn value_shape(&self, id: ValueId) -> Option<&Shape> {
        self.values.get(id.0).and_then(|v| v.shape.as_ref())
    }

    /// Return the name of a value, if it has one.
    pub fn value_name(&self, id: ValueId) -> Option<&str> {
        self.values.get(id.0).and_then(|v| v.name.as_deref())
    }

    /// Return a handle to an operator node for running shape inference.
    pub fn node_mut(&mut self, id: NodeId) -> Option<GraphNode<'_>> {
        if id.0 >= self.nodes.len() {
            return None;
        }
        Some(GraphNode { graph: self, id })
    }

    /// Infer the output shape of a single operator node.
    pub fn infer_node(&mut self, id: NodeId, inferencer: &Inferencer) -> Result<Shape, GraphError> {
        let mut node = self.node_mut(id).ok_or(GraphError::InvalidNodeId)?;
        inferencer
            .infer(&mut node)
            .map_err(|error| GraphError::Inference { node: id, error })
    }

    /// Infer the output shapes of all operator nodes, in the order they were
    /// added.
    ///
    /// Stops at the first node for which inference fails. Output shapes of
    /// nodes before that point remain set.
    pub fn infer_shapes(&mut self, inferencer: &Inferencer) -> Result<(), GraphError> {
        for idx in 0..self.nodes.len() {
            self.infer_node(NodeId(idx), inferencer)?;
        }
        Ok(())
    }

    fn push_value(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(value);
        id
    }
}

/// Mutable handle to an operator node in a [`Graph`].
pub struct GraphNode<'a> {
    graph: &'a mut Graph,
    id: NodeId,
}

impl GraphNode<'_> {
    fn op(&self) -> &OperatorNode {
        &self.graph.nodes[self.id.0]
    }
}

impl InferenceNode for GraphNode<'_> {
    fn op_type(&self) -> &str {
        &self.op().op_type
    }

    fn name(&self) -> Option<&str> {
        self.op().name.as_deref()
    }

    fn id(&self) -> usize {
        self.id.0
    }

    fn num_input_ports(&self) -> usize {
        self.op().inputs.len()
    }

    fn input_port(&self, index: usize) -> PortSnapshot {
        let Some(Some(value_id)) = self.op().inputs.get(index) else {
            return PortSnapshot::disconnected();
        };
        let Some(value) = self.graph.values.get(value_id.0) else {
            return PortSnapshot::disconnected();
        };
        match (&value.constant, &value.shape) {
            (Some(constant), _) => PortSnapshot::with_constant(constant.clone()),
            (None, Some(shape)) => PortSnapshot::with_shape(shape.clone()),
            (None, None) => PortSnapshot::without_shape(),
        }
    }

    fn set_output_shape(&mut self, shape: Shape) {
        let output = self.op().output;
        self.graph.values[output.0].shape = Some(shape);
    }
}
