//! The closed set of node kinds and their parameters.

/// Univariate categorical distribution over one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    pub var: usize,
    /// Probability per category.
    pub probs: Vec<f64>,
}

impl Categorical {
    /// Probability of `value`; categories outside the vector have mass 0.
    pub fn prob(&self, value: usize) -> f64 {
        self.probs.get(value).copied().unwrap_or(0.0)
    }

    /// Total mass, i.e. the marginal when the variable is unobserved.
    pub fn mass(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Most probable category; the first one wins ties.
    pub fn mode(&self) -> (usize, f64) {
        let mut best = (0, f64::NEG_INFINITY);
        for (i, &p) in self.probs.iter().enumerate() {
            if p > best.1 {
                best = (i, p);
            }
        }
        best
    }
}

/// Fixed indicator of a `ProductIndicator`: passes the signal when `var == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub var: usize,
    pub value: usize,
}

impl Indicator {
    /// Open when the evidence agrees with the indicator or leaves `var` unobserved.
    pub fn is_open(&self, observed: Option<usize>) -> bool {
        observed.map_or(true, |v| v == self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(Categorical),
    /// Weights are parallel to the node's children.
    Sum { weights: Vec<f64> },
    Product,
    /// Child 0 is the gated subnetwork, child 1 the indicator leaf.
    ProductIndicator(Indicator),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Sum { .. } => "sum",
            Self::Product => "product",
            Self::ProductIndicator(_) => "product_indicator",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn is_sum(&self) -> bool {
        matches!(self, Self::Sum { .. })
    }

    pub fn weights(&self) -> Option<&[f64]> {
        match self {
            Self::Sum { weights } => Some(weights),
            _ => None,
        }
    }

    /// Maximum number of children, if bounded.
    pub fn child_limit(&self) -> Option<usize> {
        match self {
            Self::Leaf(_) => Some(0),
            Self::ProductIndicator(_) => Some(2),
            _ => None,
        }
    }
}
