//! Declarative variables, constraints, and evaluation.

use thiserror::Error;

/// Handle to a variable inside a [`Formulation`](super::Formulation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the formulation's variable list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// `0` or `1`.
    Bool,
    /// Any integer in `[min, max]`.
    Int {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
}

impl Domain {
    /// Whether `value` lies in the domain.
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        match self {
            Self::Bool => value == 0 || value == 1,
            Self::Int { min, max } => min <= value && value <= max,
        }
    }
}

/// A named decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Human-readable name, e.g. `assign[3][0]`.
    pub name: String,
    /// Permitted values.
    pub domain: Domain,
}

/// `Σ coefficient · variable + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// Weighted variables.
    pub terms: Vec<(VarId, i64)>,
    /// Constant offset.
    pub constant: i64,
}

impl LinearExpr {
    /// An expression with no terms.
    #[must_use]
    pub const fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Sum of the given variables with unit coefficients.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|var| (var, 1)).collect(),
            constant: 0,
        }
    }

    /// Append a weighted term.
    #[must_use]
    pub fn plus(mut self, var: VarId, coefficient: i64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    /// Append every term of `other` scaled by `factor`.
    #[must_use]
    pub fn plus_scaled(mut self, other: &Self, factor: i64) -> Self {
        self.terms
            .extend(other.terms.iter().map(|&(var, c)| (var, c * factor)));
        self.constant += other.constant * factor;
        self
    }

    /// Evaluate against a valuation.
    ///
    /// # Errors
    /// Returns [`FormulationViolation::MissingValue`] for an unknown variable.
    pub fn eval(&self, values: &Valuation) -> Result<i64, FormulationViolation> {
        self.terms.iter().try_fold(self.constant, |acc, &(var, c)| {
            Ok(acc + c * values.value(var)?)
        })
    }
}

/// Relation used by [`Constraint::Linear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `expr <= rhs`
    LessEq,
    /// `expr == rhs`
    Eq,
    /// `expr >= rhs`
    GreaterEq,
}

impl Comparison {
    const fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::LessEq => lhs <= rhs,
            Self::Eq => lhs == rhs,
            Self::GreaterEq => lhs >= rhs,
        }
    }
}

/// Which extremum a [`Constraint::MaskedExtremum`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// Smallest gated value.
    Min,
    /// Largest gated value.
    Max,
}

/// An interval `[start, start + duration)` that exists only when `presence` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalInterval {
    /// Start-time variable.
    pub start: VarId,
    /// Fixed length.
    pub duration: i64,
    /// Boolean presence literal.
    pub presence: VarId,
}

/// A declarative constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `expr (cmp) rhs`, enforced only when `enforce` is absent or true.
    Linear {
        /// Identifying name used in violation reports.
        name: String,
        /// Left-hand side.
        expr: LinearExpr,
        /// Relation.
        cmp: Comparison,
        /// Right-hand side.
        rhs: i64,
        /// Optional enforcement literal.
        enforce: Option<VarId>,
    },
    /// `premise ⇒ conclusion` over boolean variables.
    Implies {
        /// Identifying name used in violation reports.
        name: String,
        /// Antecedent literal.
        premise: VarId,
        /// Consequent literal.
        conclusion: VarId,
    },
    /// `target` equals the min or max of the values whose mask is true, or
    /// `neutral` when every mask is false.
    MaskedExtremum {
        /// Identifying name used in violation reports.
        name: String,
        /// Aggregation kind.
        kind: Extremum,
        /// Variable receiving the aggregate.
        target: VarId,
        /// `(mask, value)` pairs.
        items: Vec<(VarId, i64)>,
        /// Value taken when no mask is set.
        neutral: i64,
    },
    /// Present intervals are pairwise disjoint.
    NoOverlap {
        /// Identifying name used in violation reports.
        name: String,
        /// Candidate intervals.
        intervals: Vec<OptionalInterval>,
    },
}

impl Constraint {
    /// Name of the constraint.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Linear { name, .. }
            | Self::Implies { name, .. }
            | Self::MaskedExtremum { name, .. }
            | Self::NoOverlap { name, .. } => name,
        }
    }

    /// Whether the constraint holds under `values`.
    ///
    /// # Errors
    /// Returns [`FormulationViolation::MissingValue`] for an unknown variable.
    pub fn is_satisfied(&self, values: &Valuation) -> Result<bool, FormulationViolation> {
        match self {
            Self::Linear {
                expr,
                cmp,
                rhs,
                enforce,
                ..
            } => {
                if let Some(literal) = enforce
                    && values.value(*literal)? == 0
                {
                    return Ok(true);
                }
                Ok(cmp.holds(expr.eval(values)?, *rhs))
            }
            Self::Implies {
                premise,
                conclusion,
                ..
            } => Ok(values.value(*premise)? == 0 || values.value(*conclusion)? != 0),
            Self::MaskedExtremum {
                kind,
                target,
                items,
                neutral,
                ..
            } => {
                let mut gated = Vec::with_capacity(items.len());
                for &(mask, value) in items {
                    if values.value(mask)? != 0 {
                        gated.push(value);
                    }
                }
                let expected = match kind {
                    Extremum::Min => gated.into_iter().min(),
                    Extremum::Max => gated.into_iter().max(),
                }
                .unwrap_or(*neutral);
                Ok(values.value(*target)? == expected)
            }
            Self::NoOverlap { intervals, .. } => {
                let mut present = Vec::with_capacity(intervals.len());
                for interval in intervals {
                    if values.value(interval.presence)? != 0 {
                        let start = values.value(interval.start)?;
                        present.push((start, start + interval.duration));
                    }
                }
                present.sort_unstable();
                Ok(present
                    .windows(2)
                    .all(|pair| match pair {
                        [(_, end), (next_start, next_end)] => {
                            end <= next_start || next_start == next_end
                        }
                        _ => true,
                    }))
            }
        }
    }
}

/// Concrete value of every variable, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation {
    values: Vec<i64>,
}

impl Valuation {
    /// Wrap raw values in variable order.
    #[must_use]
    pub const fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Value of `var`.
    ///
    /// # Errors
    /// Returns [`FormulationViolation::MissingValue`] when `var` is out of range.
    pub fn value(&self, var: VarId) -> Result<i64, FormulationViolation> {
        self.values
            .get(var.0)
            .copied()
            .ok_or(FormulationViolation::MissingValue { variable: var.0 })
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the valuation is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn set(&mut self, var: VarId, value: i64) {
        if let Some(slot) = self.values.get_mut(var.0) {
            *slot = value;
        }
    }
}

/// Reasons a valuation fails to satisfy a formulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulationViolation {
    /// A variable has no value.
    #[error("no value for variable #{variable}")]
    MissingValue {
        /// Variable index.
        variable: usize,
    },
    /// A value lies outside its variable's domain.
    #[error("{name} = {value} is outside its domain")]
    OutOfDomain {
        /// Variable name.
        name: String,
        /// Offending value.
        value: i64,
    },
    /// A constraint does not hold.
    #[error("constraint {name} is violated")]
    Violated {
        /// Constraint name.
        name: String,
    },
    /// The assignment does not fit the formulation's dimensions.
    #[error("assignment shape mismatch: {detail}")]
    Shape {
        /// Description of the mismatch.
        detail: String,
    },
}
