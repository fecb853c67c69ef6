//! Lowering of slot assignments into full valuations.

use super::{Formulation, FormulationViolation, Valuation};
use crate::Assignment;

impl Formulation<'_> {
    /// Expand `assignment` into a value for every variable.
    ///
    /// Departures are copied from the slot plans rather than recomputed, so a
    /// plan that departs before its last rider is caught by
    /// [`Formulation::evaluate`]. Unused slots take the neutral values the
    /// formulation expects.
    ///
    /// # Errors
    /// Returns [`FormulationViolation::Shape`] when the assignment does not
    /// match the formulation's guest, slot, or vehicle counts.
    pub fn lower(&self, assignment: &Assignment) -> Result<Valuation, FormulationViolation> {
        let layout = self.layout;
        let instance = self.instance;
        check_shape(
            "guests",
            assignment.guest_slots().len(),
            layout.num_guests(),
        )?;
        check_shape("slots", assignment.slots().len(), layout.num_slots())?;

        let neutral = instance.min_arrival().unwrap_or(0);
        let mut values = Valuation::new(vec![0; layout.len()]);

        for (guest, &slot) in assignment.guest_slots().iter().enumerate() {
            if slot >= layout.num_slots() {
                return Err(FormulationViolation::Shape {
                    detail: format!("guest {guest} mapped to missing slot {slot}"),
                });
            }
            values.set(layout.assign(guest, slot), 1);
            let departure = assignment.plan(slot).map_or(neutral, |plan| plan.departure_min);
            values.set(layout.guest_departure(guest), departure);
        }

        for (slot, plan) in assignment.slots().iter().enumerate() {
            let arrivals: Vec<i64> = assignment
                .members(slot)
                .filter_map(|guest| instance.arrival(guest))
                .collect();
            values.set(
                layout.min_arrival(slot),
                arrivals.iter().copied().min().unwrap_or(neutral),
            );
            values.set(
                layout.max_arrival(slot),
                arrivals.iter().copied().max().unwrap_or(neutral),
            );
            let Some(plan) = plan else {
                values.set(layout.departure(slot), neutral);
                continue;
            };
            if plan.vehicle >= layout.num_vehicles() {
                return Err(FormulationViolation::Shape {
                    detail: format!("slot {slot} uses missing vehicle {}", plan.vehicle),
                });
            }
            values.set(layout.used(slot), 1);
            values.set(layout.vehicle_of(slot, plan.vehicle), 1);
            values.set(layout.departure(slot), plan.departure_min);
        }
        Ok(values)
    }
}

fn check_shape(what: &str, actual: usize, expected: usize) -> Result<(), FormulationViolation> {
    if actual == expected {
        Ok(())
    } else {
        Err(FormulationViolation::Shape {
            detail: format!("expected {expected} {what}, got {actual}"),
        })
    }
}
