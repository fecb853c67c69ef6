//! Engine-agnostic optimisation model of an [`Instance`].
//!
//! A [`Formulation`] is a flat list of [`Variable`]s, declarative
//! [`Constraint`]s, and a linear objective. Search engines are free to solve
//! it however they like; whatever [`Assignment`] they return is lowered back
//! into a [`Valuation`] and checked with [`Formulation::evaluate`] before a
//! report is produced.

mod builder;
mod lower;
mod model;

pub use builder::{DEFAULT_TRIP_PENALTY, FormulationBuilder};
pub use model::{
    Comparison, Constraint, Domain, Extremum, FormulationViolation, LinearExpr, OptionalInterval,
    Valuation, VarId, Variable,
};

use crate::{Assignment, Instance};

/// Position of each variable family inside the flat variable list.
///
/// Families are stored contiguously in the order `assign`, `used`,
/// `vehicle_of`, `departure`, `min_arrival`, `max_arrival`,
/// `guest_departure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarLayout {
    num_guests: usize,
    num_slots: usize,
    num_vehicles: usize,
}

impl VarLayout {
    pub(crate) const fn new(num_guests: usize, num_slots: usize, num_vehicles: usize) -> Self {
        Self {
            num_guests,
            num_slots,
            num_vehicles,
        }
    }

    const fn used_base(self) -> usize {
        self.num_guests * self.num_slots
    }

    const fn vehicle_of_base(self) -> usize {
        self.used_base() + self.num_slots
    }

    const fn departure_base(self) -> usize {
        self.vehicle_of_base() + self.num_slots * self.num_vehicles
    }

    const fn min_arrival_base(self) -> usize {
        self.departure_base() + self.num_slots
    }

    const fn max_arrival_base(self) -> usize {
        self.min_arrival_base() + self.num_slots
    }

    const fn guest_departure_base(self) -> usize {
        self.max_arrival_base() + self.num_slots
    }

    /// Total number of variables.
    #[must_use]
    pub const fn len(self) -> usize {
        self.guest_departure_base() + self.num_guests
    }

    /// Whether the layout holds no variables.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Number of guests.
    #[must_use]
    pub const fn num_guests(self) -> usize {
        self.num_guests
    }

    /// Number of trip slots.
    #[must_use]
    pub const fn num_slots(self) -> usize {
        self.num_slots
    }

    /// Number of vehicles.
    #[must_use]
    pub const fn num_vehicles(self) -> usize {
        self.num_vehicles
    }

    /// `assign[guest][slot]`.
    #[must_use]
    pub const fn assign(self, guest: usize, slot: usize) -> VarId {
        VarId(guest * self.num_slots + slot)
    }

    /// `used[slot]`.
    #[must_use]
    pub const fn used(self, slot: usize) -> VarId {
        VarId(self.used_base() + slot)
    }

    /// `vehicle_of[slot][vehicle]`.
    #[must_use]
    pub const fn vehicle_of(self, slot: usize, vehicle: usize) -> VarId {
        VarId(self.vehicle_of_base() + slot * self.num_vehicles + vehicle)
    }

    /// `departure[slot]`.
    #[must_use]
    pub const fn departure(self, slot: usize) -> VarId {
        VarId(self.departure_base() + slot)
    }

    /// `min_arrival[slot]`.
    #[must_use]
    pub const fn min_arrival(self, slot: usize) -> VarId {
        VarId(self.min_arrival_base() + slot)
    }

    /// `max_arrival[slot]`.
    #[must_use]
    pub const fn max_arrival(self, slot: usize) -> VarId {
        VarId(self.max_arrival_base() + slot)
    }

    /// Departure of the trip carrying `guest`.
    #[must_use]
    pub const fn guest_departure(self, guest: usize) -> VarId {
        VarId(self.guest_departure_base() + guest)
    }
}

/// Variables, constraints, and objective for one instance.
#[derive(Debug, Clone)]
pub struct Formulation<'a> {
    instance: &'a Instance,
    trip_penalty: i64,
    layout: VarLayout,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    wait_term: LinearExpr,
    objective: LinearExpr,
}

impl<'a> Formulation<'a> {
    /// The instance this formulation models.
    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Weight applied to each used slot in the objective.
    #[must_use]
    pub const fn trip_penalty(&self) -> i64 {
        self.trip_penalty
    }

    /// Variable positions.
    #[must_use]
    pub const fn layout(&self) -> VarLayout {
        self.layout
    }

    /// All variables, indexed by [`VarId`].
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All constraints.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// `Σ wait(guest)`, the part of the objective measured in minutes.
    #[must_use]
    pub const fn wait_term(&self) -> &LinearExpr {
        &self.wait_term
    }

    /// Expression to minimise.
    #[must_use]
    pub const fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Check every domain and constraint, returning the objective value.
    ///
    /// # Errors
    /// Returns the first [`FormulationViolation`] encountered.
    pub fn evaluate(&self, values: &Valuation) -> Result<i64, FormulationViolation> {
        if values.len() != self.variables.len() {
            return Err(FormulationViolation::Shape {
                detail: format!(
                    "expected {} values, got {}",
                    self.variables.len(),
                    values.len()
                ),
            });
        }
        for (index, variable) in self.variables.iter().enumerate() {
            let value = values.value(VarId(index))?;
            if !variable.domain.contains(value) {
                return Err(FormulationViolation::OutOfDomain {
                    name: variable.name.clone(),
                    value,
                });
            }
        }
        for constraint in &self.constraints {
            if !constraint.is_satisfied(values)? {
                return Err(FormulationViolation::Violated {
                    name: constraint.name().to_owned(),
                });
            }
        }
        self.objective.eval(values)
    }

    /// Lower `assignment` and evaluate it.
    ///
    /// Returns the objective value together with the wait term.
    ///
    /// # Errors
    /// Returns a [`FormulationViolation`] if the assignment has the wrong
    /// shape or breaks any constraint.
    pub fn certify(&self, assignment: &Assignment) -> Result<(i64, i64), FormulationViolation> {
        let values = self.lower(assignment)?;
        let objective = self.evaluate(&values)?;
        let wait = self.wait_term.eval(&values)?;
        Ok((objective, wait))
    }
}
