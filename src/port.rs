//! Snapshots of operator input ports.

use std::fmt;

use crate::shape::Shape;

/// Integer scalar or vector produced by constant folding.
#[derive(Clone, Eq, Hash, PartialEq)]
pub enum Constant {
    Scalar(i64),
    Vector(Vec<i64>),
}

impl Constant {
    pub fn values(&self) -> &[i64] {
        match self {
            Self::Scalar(elem) => std::slice::from_ref(elem),
            Self::Vector(vec) => vec.as_slice(),
        }
    }

    /// Return the single value of a scalar or one-element vector.
    pub fn as_single(&self) -> Option<i64> {
        match self.values() {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Return the shape of this constant.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) => Shape::scalar(),
            Self::Vector(vec) => Shape::from_fixed(&[vec.len()]),
        }
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<i64>> for Constant {
    fn from(values: Vec<i64>) -> Self {
        Self::Vector(values)
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(val) => write!(f, "{}", val),
            Self::Vector(vec) => write!(f, "{:?}", vec),
        }
    }
}

/// Read-only view of one input port of a node.
///
/// A disconnected port has no shape or value. A connected port has a shape
/// once its producer has been inferred, and a value if its producer has been
/// constant-folded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortSnapshot {
    connected: bool,
    shape: Option<Shape>,
    constant: Option<Constant>,
}

impl PortSnapshot {
    /// Create a snapshot of a port with nothing connected to it.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Create a snapshot of a connected port whose shape has been inferred.
    pub fn with_shape(shape: impl Into<Shape>) -> Self {
        Self {
            connected: true,
            shape: Some(shape.into()),
            constant: None,
        }
    }

    /// Create a snapshot of a connected port whose shape is not yet known.
    pub fn without_shape() -> Self {
        Self {
            connected: true,
            shape: None,
            constant: None,
        }
    }

    /// Create a snapshot of a port fed by a constant-folded value.
    ///
    /// The port's shape is derived from the constant.
    pub fn with_constant(value: impl Into<Constant>) -> Self {
        let value = value.into();
        Self {
            connected: true,
            shape: Some(value.shape()),
            constant: Some(value),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn constant_value(&self) -> Option<&Constant> {
        self.constant.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::{Constant, PortSnapshot};
    use crate::shape::{Shape, shape};

    #[test]
    fn test_constant() {
        let scalar = Constant::from(5i64);
        assert_eq!(scalar.as_single(), Some(5));
        assert_eq!(scalar.shape(), Shape::scalar());

        let vec = Constant::from(vec![5i64]);
        assert_eq!(vec.as_single(), Some(5));
        assert_eq!(vec.shape(), shape!(1));

        let vec = Constant::from(vec![1i64, 2]);
        assert_eq!(vec.as_single(), None);
        assert_eq!(format!("{:?}", vec), "[1, 2]");
    }

    #[test]
    fn test_port_snapshot() {
        let port = PortSnapshot::disconnected();
        assert!(!port.is_connected());
        assert!(port.shape().is_none());

        let port = PortSnapshot::with_shape(shape!(1000, 64));
        assert!(port.is_connected());
        assert_eq!(port.shape(), Some(&shape!(1000, 64)));
        assert!(port.constant_value().is_none());

        let port = PortSnapshot::with_constant(5i64);
        assert_eq!(port.shape(), Some(&Shape::scalar()));
        assert_eq!(port.constant_value(), Some(&Constant::Scalar(5)));

        let port = PortSnapshot::without_shape();
        assert!(port.is_connected());
        assert!(port.shape().is_none());
    }
}
