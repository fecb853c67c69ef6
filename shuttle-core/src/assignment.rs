//! Concrete assignments produced by a search engine.

/// Vehicle and departure chosen for a used trip slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPlan {
    /// Vehicle serving the slot.
    pub vehicle: usize,
    /// Departure minute of the slot.
    pub departure_min: i64,
}

/// A complete solution in slot terms.
///
/// Every guest maps to exactly one slot; a slot carries a [`SlotPlan`] if and
/// only if at least one guest maps to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    guest_slots: Vec<usize>,
    slots: Vec<Option<SlotPlan>>,
}

impl Assignment {
    /// Construct an assignment from per-guest slots and per-slot plans.
    #[must_use]
    pub const fn new(guest_slots: Vec<usize>, slots: Vec<Option<SlotPlan>>) -> Self {
        Self { guest_slots, slots }
    }

    /// Slot of each guest, by guest index.
    #[must_use]
    pub fn guest_slots(&self) -> &[usize] {
        &self.guest_slots
    }

    /// Slot of guest `guest`, if the guest exists.
    #[must_use]
    pub fn slot_of(&self, guest: usize) -> Option<usize> {
        self.guest_slots.get(guest).copied()
    }

    /// Plan of every slot, by slot index.
    #[must_use]
    pub fn slots(&self) -> &[Option<SlotPlan>] {
        &self.slots
    }

    /// Plan of slot `slot`, if it is used.
    #[must_use]
    pub fn plan(&self, slot: usize) -> Option<SlotPlan> {
        self.slots.get(slot).copied().flatten()
    }

    /// Guests assigned to `slot`, in guest-index order.
    pub fn members(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        self.guest_slots
            .iter()
            .enumerate()
            .filter(move |&(_, &s)| s == slot)
            .map(|(guest, _)| guest)
    }

    /// Number of used slots.
    #[must_use]
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|plan| plan.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn members_follow_guest_slots() {
        let assignment = Assignment::new(
            vec![1, 0, 1],
            vec![
                Some(SlotPlan {
                    vehicle: 0,
                    departure_min: 5,
                }),
                Some(SlotPlan {
                    vehicle: 0,
                    departure_min: 70,
                }),
                None,
            ],
        );
        assert_eq!(assignment.members(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(assignment.used_slots(), 2);
        assert_eq!(assignment.plan(2), None);
        assert_eq!(assignment.slot_of(1), Some(0));
    }
}
