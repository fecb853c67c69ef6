//! Read-only view of an instance in branching order.

use shuttle_core::{Formulation, Instance};

/// Grouping rule expressed in branching positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PinnedPair {
    /// Position branched first.
    pub(crate) first: usize,
    /// Position branched second; equal to `first` for a single pinned guest.
    pub(crate) second: usize,
    /// Vehicle both must ride.
    pub(crate) vehicle: usize,
}

impl PinnedPair {
    pub(crate) const fn is_pair(self) -> bool {
        self.first != self.second
    }
}

/// Instance data re-indexed by branching position.
///
/// Guests are branched in ascending `(arrival_min, guest_id)` order, so
/// position `p` always has the `p`-th earliest arrival.
#[derive(Debug)]
pub(crate) struct SearchContext {
    /// Instance guest index at each position.
    pub(crate) guest_at: Vec<usize>,
    /// Arrival at each position, non-decreasing.
    pub(crate) arrivals: Vec<i64>,
    /// `arrival_prefix[p]` is the sum of the first `p` arrivals.
    pub(crate) arrival_prefix: Vec<i64>,
    /// `window_cover[p]` is the fewest wait windows that cover every arrival
    /// from position `p` on.
    window_cover: Vec<usize>,
    /// Incompatible positions for each position, sorted.
    pub(crate) conflicts: Vec<Vec<usize>>,
    pub(crate) capacities: Vec<usize>,
    /// Symmetry class of each vehicle; unused vehicles in the same class are
    /// interchangeable.
    pub(crate) vehicle_class: Vec<usize>,
    pub(crate) max_wait: i64,
    pub(crate) round_trip: i64,
    pub(crate) horizon: i64,
    pub(crate) trip_penalty: i64,
    pub(crate) pinned: Option<PinnedPair>,
}

impl SearchContext {
    pub(crate) fn new(formulation: &Formulation<'_>) -> Self {
        let instance = formulation.instance();
        let mut keyed: Vec<(i64, &str, usize)> = instance
            .guests()
            .iter()
            .enumerate()
            .map(|(index, guest)| (guest.arrival_min, guest.guest_id.as_str(), index))
            .collect();
        keyed.sort_unstable();
        let guest_at: Vec<usize> = keyed.into_iter().map(|(_, _, index)| index).collect();
        let mut position_of = vec![0; guest_at.len()];
        for (position, &guest) in guest_at.iter().enumerate() {
            if let Some(slot) = position_of.get_mut(guest) {
                *slot = position;
            }
        }

        let arrivals: Vec<i64> = guest_at
            .iter()
            .filter_map(|&guest| instance.arrival(guest))
            .collect();
        let arrival_prefix = std::iter::once(0)
            .chain(arrivals.iter().scan(0_i64, |acc, &a| {
                *acc += a;
                Some(*acc)
            }))
            .collect();

        let window_cover = window_cover(&arrivals, instance.max_wait_min());

        let mut conflicts = vec![Vec::new(); guest_at.len()];
        for (a, b) in instance.incompatible_pairs() {
            let (pa, pb) = (position(&position_of, a), position(&position_of, b));
            if let Some(list) = conflicts.get_mut(pa) {
                list.push(pb);
            }
            if let Some(list) = conflicts.get_mut(pb) {
                list.push(pa);
            }
        }
        for list in &mut conflicts {
            list.sort_unstable();
        }

        let pinned = instance.grouping().map(|grouping| {
            let (pa, pb) = (
                position(&position_of, grouping.first),
                position(&position_of, grouping.second),
            );
            PinnedPair {
                first: pa.min(pb),
                second: pa.max(pb),
                vehicle: grouping.vehicle,
            }
        });

        Self {
            guest_at,
            arrivals,
            arrival_prefix,
            window_cover,
            conflicts,
            capacities: instance.capacities(),
            vehicle_class: vehicle_classes(instance, pinned),
            max_wait: instance.max_wait_min(),
            round_trip: instance.round_trip_min(),
            horizon: instance.horizon_min(),
            trip_penalty: formulation.trip_penalty(),
            pinned,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub(crate) fn arrival(&self, position: usize) -> i64 {
        self.arrivals.get(position).copied().unwrap_or(i64::MAX)
    }

    pub(crate) fn capacity(&self, vehicle: usize) -> usize {
        self.capacities.get(vehicle).copied().unwrap_or(0)
    }

    pub(crate) fn prefix(&self, count: usize) -> i64 {
        self.arrival_prefix.get(count).copied().unwrap_or(0)
    }

    /// Lower bound on the trips still needed by guests from `position` on
    /// when none of them can join a trip that is already open.
    pub(crate) fn trips_needed_from(&self, position: usize) -> usize {
        self.window_cover.get(position).copied().unwrap_or(0)
    }

    pub(crate) fn conflicts(&self, a: usize, b: usize) -> bool {
        self.conflicts
            .get(a)
            .is_some_and(|list| list.binary_search(&b).is_ok())
    }

    /// Whether two departures on one vehicle overlap.
    pub(crate) const fn clash(&self, a: i64, b: i64) -> bool {
        (a - b).abs() < self.round_trip
    }
}

/// Greedy interval cover of sorted arrivals by windows `[a, a + max_wait]`,
/// computed for every suffix.
fn window_cover(arrivals: &[i64], max_wait: i64) -> Vec<usize> {
    let mut cover = vec![0; arrivals.len() + 1];
    for (position, &arrival) in arrivals.iter().enumerate().rev() {
        let next = arrivals.partition_point(|&a| a <= arrival + max_wait);
        let rest = cover.get(next).copied().unwrap_or(0);
        if let Some(slot) = cover.get_mut(position) {
            *slot = rest + 1;
        }
    }
    cover
}

fn position(position_of: &[usize], guest: usize) -> usize {
    position_of.get(guest).copied().unwrap_or(usize::MAX)
}

/// Vehicles share a class when they have equal capacity; the pinned vehicle
/// always has a class of its own.
fn vehicle_classes(instance: &Instance, pinned: Option<PinnedPair>) -> Vec<usize> {
    let pinned_vehicle = pinned.map(|p| p.vehicle);
    let mut representatives: Vec<(usize, bool)> = Vec::new();
    instance
        .vehicles()
        .iter()
        .enumerate()
        .map(|(position, vehicle)| {
            let key = (vehicle.capacity, pinned_vehicle == Some(position));
            if key.1 {
                representatives.push(key);
                return representatives.len() - 1;
            }
            representatives
                .iter()
                .position(|&existing| existing == key)
                .unwrap_or_else(|| {
                    representatives.push(key);
                    representatives.len() - 1
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shuttle_core::test_support::guests_at;
    use shuttle_core::{FormulationBuilder, GroupingRule, SolveRequest};

    fn context_for(request: &SolveRequest) -> SearchContext {
        let instance = Instance::from_request(request).expect("valid request");
        let formulation = FormulationBuilder::new(&instance).build();
        SearchContext::new(&formulation)
    }

    #[rstest]
    fn orders_positions_by_arrival_then_id() {
        let request = SolveRequest::new(guests_at(&[10, 0, 0]), 1, 3, 15);
        let context = context_for(&request);
        assert_eq!(context.guest_at, vec![1, 2, 0]);
        assert_eq!(context.arrivals, vec![0, 0, 10]);
        assert_eq!(context.prefix(3), 10);
    }

    #[rstest]
    fn maps_conflicts_and_pins_to_positions() {
        let request = SolveRequest::new(guests_at(&[20, 5, 0]), 2, 3, 15)
            .with_incompatible_pair("g1", "g3")
            .with_grouping(GroupingRule::new("g1", "g2", 1));
        let context = context_for(&request);
        assert!(context.conflicts(0, 2));
        assert!(context.conflicts(2, 0));
        assert!(!context.conflicts(0, 1));
        assert_eq!(
            context.pinned,
            Some(PinnedPair {
                first: 1,
                second: 2,
                vehicle: 1,
            })
        );
    }

    #[rstest]
    fn pinned_vehicle_gets_its_own_class() {
        let request = SolveRequest::new(guests_at(&[0, 0]), 3, 2, 0)
            .with_grouping(GroupingRule::new("g1", "g2", 1));
        let context = context_for(&request);
        assert_eq!(context.vehicle_class, vec![0, 1, 0]);
    }

    #[rstest]
    fn window_cover_counts_trips_per_suffix() {
        let request = SolveRequest::new(guests_at(&[0, 5, 10, 11, 30, 31]), 1, 6, 10);
        let context = context_for(&request);
        // {0,5,10} {11} {30,31}, then {5,10,11} {30,31}, and so on.
        let cover: Vec<_> = (0..=7).map(|p| context.trips_needed_from(p)).collect();
        assert_eq!(cover, vec![3, 2, 2, 2, 1, 1, 0, 0]);
    }

    #[rstest]
    #[case(0, 60, false)]
    #[case(0, 59, true)]
    #[case(59, 0, true)]
    fn clash_is_symmetric_open_interval(#[case] a: i64, #[case] b: i64, #[case] expected: bool) {
        let request = SolveRequest::new(guests_at(&[0]), 1, 1, 0).with_round_trip_min(60);
        assert_eq!(context_for(&request).clash(a, b), expected);
    }
}
