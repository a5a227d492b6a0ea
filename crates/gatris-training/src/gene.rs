use std::fmt;

/// A unit of heredity: one scalar allele, or a fixed-length group of them.
///
/// Crossover treats both kinds uniformly by addressing a single scalar: the gene itself
/// when it is a scalar, or one of its sub-values when it is composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Gene {
    Scalar(f64),
    Composite(Vec<f64>),
}

impl Gene {
    /// Number of scalar alleles carried by this gene.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Composite(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// The scalar alleles in order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::Composite(values) => values,
        }
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        match self {
            Self::Scalar(value) => std::slice::from_mut(value),
            Self::Composite(values) => values,
        }
    }

    /// Whether `other` has the same kind and length, so alleles can be exchanged.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.is_composite() == other.is_composite() && self.len() == other.len()
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{value}"),
            Self::Composite(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}
