//! Translate an [`Instance`] into a [`Formulation`].

use super::{
    Comparison, Constraint, Domain, Extremum, Formulation, LinearExpr, OptionalInterval, VarLayout,
    Variable,
};
use crate::Instance;

/// Trip penalty used when none is configured.
pub const DEFAULT_TRIP_PENALTY: i64 = 1;

/// Builds the slot model for an instance.
///
/// # Examples
/// ```
/// use shuttle_core::{FormulationBuilder, Guest, Instance, SolveRequest};
///
/// # fn main() -> Result<(), shuttle_core::ValidationError> {
/// let request = SolveRequest::new(vec![Guest::new("g1", "Ada", 0)], 1, 2, 5);
/// let instance = Instance::from_request(&request)?;
/// let formulation = FormulationBuilder::new(&instance).with_trip_penalty(3).build();
/// assert_eq!(formulation.trip_penalty(), 3);
/// assert_eq!(formulation.layout().num_slots(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FormulationBuilder<'a> {
    instance: &'a Instance,
    trip_penalty: i64,
}

impl<'a> FormulationBuilder<'a> {
    /// Start a builder with the default trip penalty.
    #[must_use]
    pub const fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            trip_penalty: DEFAULT_TRIP_PENALTY,
        }
    }

    /// Set the per-trip objective weight.
    #[must_use]
    pub const fn with_trip_penalty(mut self, trip_penalty: i64) -> Self {
        self.trip_penalty = trip_penalty;
        self
    }

    /// Emit variables, constraints, and objective.
    #[must_use]
    pub fn build(self) -> Formulation<'a> {
        let instance = self.instance;
        let num_guests = instance.num_guests();
        let num_slots = instance.num_slots();
        let layout = VarLayout::new(num_guests, num_slots, instance.num_vehicles());
        let mut emitter = Emitter {
            instance,
            layout,
            constraints: Vec::new(),
        };

        emitter.partition();
        emitter.usage();
        emitter.vehicle_choice();
        emitter.capacity();
        emitter.reach();
        emitter.wait_bound();
        emitter.departures();
        emitter.incompatibility();
        emitter.grouping();
        emitter.non_overlap();

        let arrivals: i64 = instance.guests().iter().map(|g| g.arrival_min).sum();
        let wait_term = LinearExpr {
            terms: (0..num_guests)
                .map(|g| (layout.guest_departure(g), 1))
                .collect(),
            constant: -arrivals,
        };
        let trips_used = LinearExpr::sum((0..num_slots).map(|s| layout.used(s)));
        let objective = LinearExpr::default()
            .plus_scaled(&wait_term, 1)
            .plus_scaled(&trips_used, self.trip_penalty);

        log::debug!(
            "formulation: {} variables, {} constraints, trip penalty {}",
            layout.len(),
            emitter.constraints.len(),
            self.trip_penalty
        );

        Formulation {
            instance,
            trip_penalty: self.trip_penalty,
            layout,
            variables: variables(instance, layout),
            constraints: emitter.constraints,
            wait_term,
            objective,
        }
    }
}

fn variables(instance: &Instance, layout: VarLayout) -> Vec<Variable> {
    let min_a = instance.min_arrival().unwrap_or(0);
    let max_a = instance.max_arrival().unwrap_or(0);
    let horizon = instance.horizon_min();
    let time = Domain::Int {
        min: min_a,
        max: horizon,
    };
    let reach = Domain::Int {
        min: min_a,
        max: max_a,
    };
    let (n, m, k) = (
        layout.num_guests(),
        layout.num_slots(),
        layout.num_vehicles(),
    );

    let mut vars = Vec::with_capacity(layout.len());
    let mut push = |name: String, domain| vars.push(Variable { name, domain });
    for g in 0..n {
        for s in 0..m {
            push(format!("assign[{g}][{s}]"), Domain::Bool);
        }
    }
    for s in 0..m {
        push(format!("used[{s}]"), Domain::Bool);
    }
    for s in 0..m {
        for v in 0..k {
            push(format!("vehicle_of[{s}][{v}]"), Domain::Bool);
        }
    }
    for s in 0..m {
        push(format!("departure[{s}]"), time);
    }
    for s in 0..m {
        push(format!("min_arrival[{s}]"), reach);
    }
    for s in 0..m {
        push(format!("max_arrival[{s}]"), reach);
    }
    for g in 0..n {
        push(format!("guest_departure[{g}]"), time);
    }
    vars
}

struct Emitter<'a> {
    instance: &'a Instance,
    layout: VarLayout,
    constraints: Vec<Constraint>,
}

impl Emitter<'_> {
    fn linear(
        &mut self,
        name: String,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: i64,
        enforce: Option<super::VarId>,
    ) {
        self.constraints.push(Constraint::Linear {
            name,
            expr,
            cmp,
            rhs,
            enforce,
        });
    }

    fn slots(&self) -> std::ops::Range<usize> {
        0..self.layout.num_slots()
    }

    fn guests(&self) -> std::ops::Range<usize> {
        0..self.layout.num_guests()
    }

    fn slot_members(&self, slot: usize) -> LinearExpr {
        LinearExpr::sum(self.guests().map(|g| self.layout.assign(g, slot)))
    }

    fn partition(&mut self) {
        for g in self.guests() {
            let expr = LinearExpr::sum(self.slots().map(|s| self.layout.assign(g, s)));
            self.linear(format!("partition[{g}]"), expr, Comparison::Eq, 1, None);
        }
    }

    /// `used[s] ⇔ Σ assign[·][s] ≥ 1`.
    fn usage(&mut self) {
        for s in self.slots() {
            for g in self.guests() {
                self.constraints.push(Constraint::Implies {
                    name: format!("usage[{g}][{s}]"),
                    premise: self.layout.assign(g, s),
                    conclusion: self.layout.used(s),
                });
            }
            let members = self.slot_members(s);
            let used = self.layout.used(s);
            self.linear(
                format!("occupied[{s}]"),
                members,
                Comparison::GreaterEq,
                1,
                Some(used),
            );
        }
    }

    /// `Σ vehicle_of[s][·] = used[s]`.
    fn vehicle_choice(&mut self) {
        for s in self.slots() {
            let choices = (0..self.layout.num_vehicles()).map(|k| self.layout.vehicle_of(s, k));
            let expr = LinearExpr::sum(choices).plus(self.layout.used(s), -1);
            self.linear(format!("vehicle_choice[{s}]"), expr, Comparison::Eq, 0, None);
        }
    }

    fn capacity(&mut self) {
        for s in self.slots() {
            let mut expr = self.slot_members(s);
            for (k, vehicle) in self.instance.vehicles().iter().enumerate() {
                let capacity = i64::try_from(vehicle.capacity).unwrap_or(i64::MAX);
                expr = expr.plus(self.layout.vehicle_of(s, k), -capacity);
            }
            self.linear(format!("capacity[{s}]"), expr, Comparison::LessEq, 0, None);
        }
    }

    /// Masked min/max of member arrivals; empty slots collapse to the
    /// earliest arrival so they constrain nothing.
    fn reach(&mut self) {
        let neutral = self.instance.min_arrival().unwrap_or(0);
        for s in self.slots() {
            let items: Vec<_> = self
                .instance
                .guests()
                .iter()
                .enumerate()
                .map(|(g, guest)| (self.layout.assign(g, s), guest.arrival_min))
                .collect();
            self.constraints.push(Constraint::MaskedExtremum {
                name: format!("min_arrival[{s}]"),
                kind: Extremum::Min,
                target: self.layout.min_arrival(s),
                items: items.clone(),
                neutral,
            });
            self.constraints.push(Constraint::MaskedExtremum {
                name: format!("max_arrival[{s}]"),
                kind: Extremum::Max,
                target: self.layout.max_arrival(s),
                items,
                neutral,
            });
        }
    }

    fn wait_bound(&mut self) {
        let max_wait = self.instance.max_wait_min();
        for s in self.slots() {
            let expr = LinearExpr::default()
                .plus(self.layout.max_arrival(s), 1)
                .plus(self.layout.min_arrival(s), -1);
            let used = self.layout.used(s);
            self.linear(
                format!("wait_bound[{s}]"),
                expr,
                Comparison::LessEq,
                max_wait,
                Some(used),
            );
        }
    }

    /// `departure[s] = max_arrival[s]` and each guest inherits its slot's
    /// departure.
    fn departures(&mut self) {
        for s in self.slots() {
            let expr = LinearExpr::default()
                .plus(self.layout.departure(s), 1)
                .plus(self.layout.max_arrival(s), -1);
            self.linear(format!("departure[{s}]"), expr, Comparison::Eq, 0, None);
        }
        for g in self.guests() {
            for s in self.slots() {
                let expr = LinearExpr::default()
                    .plus(self.layout.guest_departure(g), 1)
                    .plus(self.layout.departure(s), -1);
                let assign = self.layout.assign(g, s);
                self.linear(
                    format!("guest_departure[{g}][{s}]"),
                    expr,
                    Comparison::Eq,
                    0,
                    Some(assign),
                );
            }
        }
    }

    fn incompatibility(&mut self) {
        let pairs: Vec<_> = self.instance.incompatible_pairs().collect();
        for (a, b) in pairs {
            for s in self.slots() {
                let expr = LinearExpr::sum([self.layout.assign(a, s), self.layout.assign(b, s)]);
                self.linear(
                    format!("incompatible[{a}][{b}][{s}]"),
                    expr,
                    Comparison::LessEq,
                    1,
                    None,
                );
            }
        }
    }

    fn grouping(&mut self) {
        let Some(grouping) = self.instance.grouping() else {
            return;
        };
        let (a, b, k0) = (grouping.first, grouping.second, grouping.vehicle);
        for s in self.slots() {
            let expr = LinearExpr::default()
                .plus(self.layout.assign(a, s), 1)
                .plus(self.layout.assign(b, s), -1);
            self.linear(format!("together[{s}]"), expr, Comparison::Eq, 0, None);
            self.constraints.push(Constraint::Implies {
                name: format!("pinned[{s}]"),
                premise: self.layout.assign(a, s),
                conclusion: self.layout.vehicle_of(s, k0),
            });
        }
    }

    fn non_overlap(&mut self) {
        let duration = self.instance.round_trip_min();
        for k in 0..self.layout.num_vehicles() {
            let intervals = self
                .slots()
                .map(|s| OptionalInterval {
                    start: self.layout.departure(s),
                    duration,
                    presence: self.layout.vehicle_of(s, k),
                })
                .collect();
            self.constraints.push(Constraint::NoOverlap {
                name: format!("no_overlap[{k}]"),
                intervals,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Guest, GroupingRule, SolveRequest};
    use rstest::{fixture, rstest};

    #[fixture]
    fn instance() -> Instance {
        let request = SolveRequest::new(
            vec![
                Guest::new("a", "A", 0),
                Guest::new("b", "B", 5),
                Guest::new("c", "C", 10),
            ],
            2,
            3,
            15,
        )
        .with_round_trip_min(60)
        .with_incompatible_pair("a", "c")
        .with_grouping(GroupingRule::new("a", "b", 1));
        Instance::from_request(&request).expect("valid request")
    }

    #[rstest]
    fn emits_one_variable_per_layout_position(instance: Instance) {
        let formulation = FormulationBuilder::new(&instance).build();
        assert_eq!(formulation.variables().len(), formulation.layout().len());
        assert_eq!(formulation.trip_penalty(), DEFAULT_TRIP_PENALTY);
    }

    #[rstest]
    #[case::partition("partition[2]")]
    #[case::incompatible("incompatible[0][2][1]")]
    #[case::grouping("pinned[0]")]
    #[case::overlap("no_overlap[1]")]
    fn names_every_family(instance: Instance, #[case] name: &str) {
        let formulation = FormulationBuilder::new(&instance).build();
        assert!(
            formulation.constraints().iter().any(|c| c.name() == name),
            "missing {name}"
        );
    }

    #[rstest]
    fn departure_domain_spans_to_horizon(instance: Instance) {
        let formulation = FormulationBuilder::new(&instance).build();
        let layout = formulation.layout();
        let departure = formulation
            .variables()
            .get(layout.departure(0).index())
            .map(|v| v.domain);
        assert_eq!(departure, Some(Domain::Int { min: 0, max: 85 }));
    }
}
