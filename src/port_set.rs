use std::fmt;

/// Set of input port indices of a node.
///
/// Operators in this crate have at most [`PortSet::MAX_PORTS`] input ports,
/// so the set is stored as a bit mask.
#[derive(Copy, Clone, Default, Eq, Hash, PartialEq)]
pub struct PortSet(u32);

impl PortSet {
    pub const MAX_PORTS: usize = u32::BITS as usize;

    /// Return an empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Return a set containing the given port indices.
    ///
    /// Panics if an index is `>= MAX_PORTS`.
    pub const fn from_indices(indices: &[usize]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < indices.len() {
            assert!(indices[i] < Self::MAX_PORTS, "port index out of range");
            bits |= 1 << indices[i];
            i += 1;
        }
        Self(bits)
    }

    /// Add port `index` to the set.
    ///
    /// Indices `>= MAX_PORTS` are ignored.
    pub fn insert(&mut self, index: usize) {
        if index < Self::MAX_PORTS {
            self.0 |= 1 << index;
        }
    }

    /// Return true if port `index` is in the set.
    pub fn contains(&self, index: usize) -> bool {
        index < Self::MAX_PORTS && self.0 & (1 << index) != 0
    }

    /// Return the number of ports in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Return true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Return the ports that are in `self` but not in `other`.
    pub fn difference(&self, other: &PortSet) -> PortSet {
        Self(self.0 & !other.0)
    }

    /// Return true if every port in `self` is also in `other`.
    pub fn is_subset(&self, other: &PortSet) -> bool {
        self.difference(other).is_empty()
    }

    /// Return an iterator over the port indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::MAX_PORTS).filter(|pos| self.contains(*pos))
    }
}

impl FromIterator<usize> for PortSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::empty();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

impl fmt::Debug for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::PortSet;

    #[test]
    fn test_port_set() {
        let mut set = PortSet::empty();
        assert!(set.is_empty());

        set.insert(0);
        set.insert(2);
        set.insert(2);
        assert_eq!(set.len(), 2);
        assert!(set.contains(0));
        assert!(!set.contains(1));
        assert!(set.contains(2));
        assert!(!set.contains(100));

        assert_eq!(set, PortSet::from_indices(&[2, 0]));
    }

    #[test]
    fn test_subset_and_difference() {
        let mandatory = PortSet::from_indices(&[0, 1, 2]);
        let connected: PortSet = [0, 2, 4].into_iter().collect();

        assert!(!mandatory.is_subset(&connected));
        assert_eq!(mandatory.difference(&connected), PortSet::from_indices(&[1]));

        let connected: PortSet = [0, 1, 2, 4].into_iter().collect();
        assert!(mandatory.is_subset(&connected));
        assert!(mandatory.difference(&connected).is_empty());
    }

    #[test]
    fn test_iter_and_format() {
        let set = PortSet::from_indices(&[3, 1, 5]);
        let ports: Vec<usize> = set.iter().collect();
        assert_eq!(ports, [1, 3, 5]);
        assert_eq!(format!("{:?}", set), "{1, 3, 5}");
    }
}
