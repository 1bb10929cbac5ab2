//! Tensor shapes whose dimensions may be unknown.

use std::error::Error;
use std::fmt;

use smallvec::SmallVec;

/// Size of a single dimension of a tensor.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Dimension {
    /// A dimension with a known size.
    Known(usize),
    /// A dimension whose size is not known at inference time, eg. because it
    /// depends on a model input or on a value that has not yet been
    /// constant-folded.
    Unknown,
}

impl Dimension {
    /// Return the size of this dimension, if known.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Known(size) => Some(*size),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl From<usize> for Dimension {
    fn from(size: usize) -> Self {
        Self::Known(size)
    }
}

impl From<Option<usize>> for Dimension {
    fn from(size: Option<usize>) -> Self {
        size.map(Self::Known).unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(size) => write!(f, "{}", size),
            Self::Unknown => write!(f, "?"),
        }
    }
}

/// Errors from slicing shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeError {
    /// A slice boundary was beyond the rank of the shape.
    IndexOutOfRange { index: usize, rank: usize },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, rank } => {
                write!(f, "index {} out of range for shape of rank {}", index, rank)
            }
        }
    }
}

impl Error for ShapeError {}

/// Shape of a tensor.
///
/// The rank of a shape is always known, but individual dimensions may be
/// [`Unknown`](Dimension::Unknown). Shapes are only ever rearranged, never
/// computed with, so unknown dimensions flow through to outputs unchanged.
///
/// ```
/// use bagshape::{Dimension, Shape};
///
/// let weights = Shape::from([1000, 64]);
/// let offsets = Shape::new([Dimension::Unknown]);
///
/// let out = offsets.slice_prefix(1).unwrap().concat(&weights.slice_suffix_from(1).unwrap());
/// assert_eq!(out, Shape::new([Dimension::Unknown, Dimension::Known(64)]));
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Shape(SmallVec<[Dimension; 4]>);

impl Shape {
    /// Create a shape from a sequence of dimensions.
    pub fn new(dims: impl IntoIterator<Item = Dimension>) -> Self {
        Self(dims.into_iter().collect())
    }

    /// Create a shape where every dimension is known.
    pub fn from_fixed(dims: &[usize]) -> Self {
        Self(dims.iter().copied().map(Dimension::Known).collect())
    }

    /// Create a scalar shape.
    pub fn scalar() -> Self {
        Self(SmallVec::new())
    }

    /// Return the number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.0
    }

    /// Return the size of the `index`th dimension, or `None` if `index` is
    /// out of range.
    pub fn dim(&self, index: usize) -> Option<Dimension> {
        self.0.get(index).copied()
    }

    /// Return a new shape with the dimensions of `self` followed by those of
    /// `other`.
    pub fn concat(&self, other: &Shape) -> Shape {
        let mut dims = self.0.clone();
        dims.extend_from_slice(&other.0);
        Shape(dims)
    }

    /// Return the first `k` dimensions.
    pub fn slice_prefix(&self, k: usize) -> Result<Shape, ShapeError> {
        self.check_index(k)?;
        Ok(Shape(self.0[..k].into()))
    }

    /// Return the dimensions from index `k` onwards.
    pub fn slice_suffix_from(&self, k: usize) -> Result<Shape, ShapeError> {
        self.check_index(k)?;
        Ok(Shape(self.0[k..].into()))
    }

    fn check_index(&self, index: usize) -> Result<(), ShapeError> {
        if index > self.rank() {
            return Err(ShapeError::IndexOutOfRange {
                index,
                rank: self.rank(),
            });
        }
        Ok(())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::from_fixed(&dims)
    }
}

impl From<Vec<Dimension>> for Shape {
    fn from(dims: Vec<Dimension>) -> Self {
        Self(dims.into())
    }
}

impl FromIterator<Dimension> for Shape {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
pub(crate) use tests::shape;

#[cfg(test)]
mod tests {
    use bagshape_testing::TestCases;

    use super::{Dimension, Shape, ShapeError};

    /// Create a [`Shape`] from a list of sizes, where `?` denotes an unknown
    /// dimension.
    macro_rules! shape {
        (@dim ?) => {
            $crate::shape::Dimension::Unknown
        };
        (@dim $x:literal) => {
            $crate::shape::Dimension::Known($x)
        };
        ($($x:tt),* $(,)?) => {
            $crate::shape::Shape::new([$($crate::shape::shape!(@dim $x)),*])
        };
    }

    pub(crate) use shape;

    #[test]
    fn test_dimension() {
        assert_eq!(Dimension::Known(3).size(), Some(3));
        assert_eq!(Dimension::Unknown.size(), None);
        assert_eq!(Dimension::from(None), Dimension::Unknown);
        assert_eq!(Dimension::from(Some(2)), Dimension::Known(2));
        assert!(!Dimension::Unknown.is_known());
    }

    #[test]
    fn test_concat() {
        #[derive(Debug)]
        struct Case {
            lhs: Shape,
            rhs: Shape,
            expected: Shape,
        }

        let cases = [
            Case {
                lhs: shape!(7),
                rhs: shape!(64),
                expected: shape!(7, 64),
            },
            Case {
                lhs: Shape::scalar(),
                rhs: shape!(2, 3),
                expected: shape!(2, 3),
            },
            Case {
                lhs: shape!(?),
                rhs: shape!(4, ?),
                expected: shape!(?, 4, ?),
            },
        ];

        cases.test_each(|case| {
            let out = case.lhs.concat(&case.rhs);
            assert_eq!(out.rank(), case.lhs.rank() + case.rhs.rank());
            assert_eq!(out, case.expected);
        });
    }

    #[test]
    fn test_slice() {
        let s = shape!(1000, ?, 64);

        assert_eq!(s.slice_prefix(0).unwrap(), Shape::scalar());
        assert_eq!(s.slice_prefix(1).unwrap(), shape!(1000));
        assert_eq!(s.slice_suffix_from(1).unwrap(), shape!(?, 64));
        assert_eq!(s.slice_suffix_from(3).unwrap(), Shape::scalar());

        assert_eq!(
            s.slice_prefix(4),
            Err(ShapeError::IndexOutOfRange { index: 4, rank: 3 })
        );
        assert_eq!(
            Shape::scalar().slice_suffix_from(1),
            Err(ShapeError::IndexOutOfRange { index: 1, rank: 0 })
        );
    }

    // Unknown dimensions are only equal to other unknown dimensions.
    #[test]
    fn test_eq_with_unknown_dims() {
        assert_eq!(shape!(?), shape!(?));
        assert_ne!(shape!(?), shape!(10));
        assert_ne!(shape!(10), shape!(10, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(shape!(4, ?, 64).to_string(), "[4, ?, 64]");
        assert_eq!(Shape::scalar().to_string(), "[]");
    }
}
