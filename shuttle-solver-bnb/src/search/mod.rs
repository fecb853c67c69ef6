//! Depth-first branch and bound over guests in arrival order.
//!
//! Each worker assigns one guest per level, either joining an open trip or
//! opening a trip on some vehicle. Because guests arrive in order, a trip's
//! latest rider is always its most recent one, and a trip whose window has
//! passed the next arrival can be closed with its departure fixed. Closing
//! is where vehicle overlaps are detected; open trips are checked for at
//! least one departure that avoids every closed trip on their vehicle.

mod context;

pub(crate) use context::SearchContext;

use std::time::Instant;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use shuttle_core::{Assignment, SlotPlan};

use crate::incumbent::SharedIncumbent;

/// Value ordering used by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueOrder {
    /// Join open trips, cheapest first, before opening new ones.
    JoinFirst,
    /// Every move ranked by its immediate cost.
    Cheapest,
    /// Moves in random order.
    Shuffled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Join(usize),
    Open(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone)]
struct Trip {
    vehicle: usize,
    min_arrival: i64,
    max_arrival: i64,
    members: Vec<usize>,
    closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Undo {
    mv: Move,
    previous_max: i64,
    closed_mark: usize,
}

/// Counters returned by a finished worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WorkerReport {
    pub(crate) nodes: u64,
    pub(crate) completed: bool,
}

/// Per-thread search state.
pub(crate) struct Worker<'a> {
    context: &'a SearchContext,
    shared: &'a SharedIncumbent,
    deadline: Option<Instant>,
    check_interval: u64,
    since_check: u64,
    order: ValueOrder,
    rng: ChaCha8Rng,
    trips: Vec<Trip>,
    slot_of: Vec<usize>,
    closed_departures: Vec<Vec<i64>>,
    trips_on: Vec<usize>,
    closed_log: Vec<usize>,
    closed_mass: i64,
    nodes: u64,
}

fn weight(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[expect(
    clippy::indexing_slicing,
    reason = "positions, slots, and vehicles are bounded by the search context"
)]
impl<'a> Worker<'a> {
    pub(crate) fn new(
        context: &'a SearchContext,
        shared: &'a SharedIncumbent,
        deadline: Option<Instant>,
        check_interval: u64,
        order: ValueOrder,
        rng: ChaCha8Rng,
    ) -> Self {
        let vehicles = context.capacities.len();
        Self {
            context,
            shared,
            deadline,
            check_interval: check_interval.max(1),
            since_check: 0,
            order,
            rng,
            trips: Vec::with_capacity(context.len()),
            slot_of: vec![0; context.len()],
            closed_departures: vec![Vec::new(); vehicles],
            trips_on: vec![0; vehicles],
            closed_log: Vec::with_capacity(context.len()),
            closed_mass: 0,
            nodes: 0,
        }
    }

    /// Explore the whole tree or until told to stop.
    ///
    /// A worker that finishes its tree has proven the shared incumbent
    /// optimal (or the instance infeasible) and ends the search for everyone.
    pub(crate) fn run(mut self) -> WorkerReport {
        let completed = self.descend(0) == Flow::Continue;
        if completed {
            self.shared.mark_exhausted();
        }
        WorkerReport {
            nodes: self.nodes,
            completed,
        }
    }

    fn descend(&mut self, position: usize) -> Flow {
        if position == self.context.len() {
            self.offer();
            return Flow::Continue;
        }
        self.nodes += 1;
        if self.out_of_time() {
            return Flow::Stop;
        }

        for mv in self.moves(position) {
            let undo = self.apply(position, mv);
            let promising = self
                .propagate(position)
                .is_some_and(|bound| bound < self.shared.peek());
            let flow = if promising {
                self.descend(position + 1)
            } else {
                Flow::Continue
            };
            self.revert(undo);
            if flow == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn out_of_time(&mut self) -> bool {
        if self.shared.should_stop() {
            return true;
        }
        self.since_check += 1;
        if self.since_check < self.check_interval {
            return false;
        }
        self.since_check = 0;
        let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if expired {
            self.shared.request_stop();
        }
        expired
    }

    fn moves(&mut self, position: usize) -> Vec<Move> {
        let context = self.context;
        let mut moves = Vec::new();

        if let Some(pin) = context.pinned
            && pin.is_pair()
            && position == pin.second
        {
            let slot = self.slot_of[pin.first];
            if self.can_join(slot, position) {
                moves.push(Move::Join(slot));
            }
            return moves;
        }

        for slot in 0..self.trips.len() {
            if self.can_join(slot, position) {
                moves.push(Move::Join(slot));
            }
        }

        let mut seen_classes = Vec::new();
        for vehicle in 0..context.capacities.len() {
            if let Some(pin) = context.pinned
                && position == pin.first
                && (vehicle != pin.vehicle || (pin.is_pair() && context.capacity(vehicle) < 2))
            {
                continue;
            }
            if self.trips_on[vehicle] == 0 {
                let class = context.vehicle_class[vehicle];
                if seen_classes.contains(&class) {
                    continue;
                }
                seen_classes.push(class);
            }
            moves.push(Move::Open(vehicle));
        }

        self.order_moves(position, &mut moves);
        moves
    }

    fn can_join(&self, slot: usize, position: usize) -> bool {
        let context = self.context;
        let trip = &self.trips[slot];
        let capacity = context.capacity(trip.vehicle);
        let count = trip.members.len();
        if trip.closed
            || count >= capacity
            || context.arrival(position) > trip.min_arrival + context.max_wait
            || trip.members.iter().any(|&m| context.conflicts(m, position))
        {
            return false;
        }
        match context.pinned {
            Some(pin) if position == pin.first => {
                trip.vehicle == pin.vehicle
                    && (!pin.is_pair()
                        || (count + 2 <= capacity
                            && !trip.members.iter().any(|&m| context.conflicts(m, pin.second))))
            }
            Some(pin)
                if pin.is_pair() && position < pin.second && trip.members.contains(&pin.first) =>
            {
                count + 2 <= capacity && !context.conflicts(position, pin.second)
            }
            _ => true,
        }
    }

    fn cost(&self, position: usize, mv: Move) -> (i64, bool) {
        match mv {
            Move::Join(slot) => {
                let trip = &self.trips[slot];
                let delay = self.context.arrival(position) - trip.max_arrival;
                (weight(trip.members.len()) * delay, false)
            }
            Move::Open(_) => (self.context.trip_penalty, true),
        }
    }

    fn order_moves(&mut self, position: usize, moves: &mut [Move]) {
        match self.order {
            ValueOrder::JoinFirst => moves.sort_by_key(|&mv| {
                let (cost, opens) = self.cost(position, mv);
                (opens, cost)
            }),
            ValueOrder::Cheapest => moves.sort_by_key(|&mv| self.cost(position, mv)),
            ValueOrder::Shuffled => moves.shuffle(&mut self.rng),
        }
    }

    fn apply(&mut self, position: usize, mv: Move) -> Undo {
        let arrival = self.context.arrival(position);
        let closed_mark = self.closed_log.len();
        let (slot, previous_max) = match mv {
            Move::Join(slot) => {
                let trip = &mut self.trips[slot];
                let previous = trip.max_arrival;
                trip.max_arrival = arrival;
                trip.members.push(position);
                (slot, previous)
            }
            Move::Open(vehicle) => {
                self.trips.push(Trip {
                    vehicle,
                    min_arrival: arrival,
                    max_arrival: arrival,
                    members: vec![position],
                    closed: false,
                });
                self.trips_on[vehicle] += 1;
                (self.trips.len() - 1, arrival)
            }
        };
        self.slot_of[position] = slot;
        Undo {
            mv,
            previous_max,
            closed_mark,
        }
    }

    fn revert(&mut self, undo: Undo) {
        while self.closed_log.len() > undo.closed_mark {
            let Some(slot) = self.closed_log.pop() else {
                break;
            };
            let trip = &mut self.trips[slot];
            trip.closed = false;
            self.closed_mass -= weight(trip.members.len()) * trip.max_arrival;
            self.closed_departures[trip.vehicle].pop();
        }
        match undo.mv {
            Move::Join(slot) => {
                let trip = &mut self.trips[slot];
                trip.members.pop();
                trip.max_arrival = undo.previous_max;
            }
            Move::Open(vehicle) => {
                self.trips.pop();
                self.trips_on[vehicle] -= 1;
            }
        }
    }

    /// Close settled trips and return a lower bound on the objective, or
    /// `None` if the partial assignment cannot be completed.
    fn propagate(&mut self, position: usize) -> Option<i64> {
        let context = self.context;
        let next = context.arrivals.get(position + 1).copied();
        let mut reach = i64::MIN;
        for slot in 0..self.trips.len() {
            let trip = &self.trips[slot];
            if trip.closed {
                continue;
            }
            let full = trip.members.len() >= context.capacity(trip.vehicle);
            let expired = next.is_none_or(|a| a > trip.min_arrival + context.max_wait);
            if (full || expired) && !self.close(slot, position) {
                return None;
            }
            let trip = &self.trips[slot];
            if !trip.closed {
                reach = reach.max(trip.min_arrival + context.max_wait);
            }
        }

        // Guests past every open window must ride trips not yet opened.
        let stranded = context
            .arrivals
            .partition_point(|&a| a <= reach)
            .max(position + 1);
        let trips = self.trips.len() + context.trips_needed_from(stranded);
        let mut bound = self.closed_mass - context.prefix(position + 1)
            + context.trip_penalty * weight(trips);
        for slot in 0..self.trips.len() {
            if self.trips[slot].closed {
                continue;
            }
            let departure = self.earliest_departure(slot, position)?;
            bound += weight(self.trips[slot].members.len()) * departure;
        }
        Some(bound)
    }

    fn close(&mut self, slot: usize, position: usize) -> bool {
        let context = self.context;
        let trip = &mut self.trips[slot];
        trip.closed = true;
        let departure = trip.max_arrival;
        self.closed_log.push(slot);
        self.closed_mass += weight(trip.members.len()) * departure;

        let strands_partner = context.pinned.is_some_and(|pin| {
            pin.is_pair() && position < pin.second && trip.members.contains(&pin.first)
        });
        let finals = &mut self.closed_departures[trip.vehicle];
        let clashes = finals.iter().any(|&other| context.clash(other, departure));
        finals.push(departure);
        !(clashes || strands_partner)
    }

    /// Smallest departure an open trip could still take without clashing
    /// with a closed trip on its vehicle.
    fn earliest_departure(&self, slot: usize, position: usize) -> Option<i64> {
        let context = self.context;
        let trip = &self.trips[slot];
        let finals = &self.closed_departures[trip.vehicle];
        let free = |departure: i64| !finals.iter().any(|&other| context.clash(other, departure));
        if free(trip.max_arrival) {
            return Some(trip.max_arrival);
        }
        let limit = trip.min_arrival + context.max_wait;
        context
            .arrivals
            .iter()
            .skip(position + 1)
            .take_while(|&&arrival| arrival <= limit)
            .copied()
            .find(|&arrival| free(arrival))
    }

    fn offer(&self) {
        let context = self.context;
        let objective = self.closed_mass - context.prefix(context.len())
            + context.trip_penalty * weight(self.trips.len());
        self.shared.try_update(objective, || self.assignment());
    }

    fn assignment(&self) -> Assignment {
        let context = self.context;
        let mut guest_slots = vec![0; context.len()];
        for (position, &slot) in self.slot_of.iter().enumerate() {
            guest_slots[context.guest_at[position]] = slot;
        }
        let mut slots = vec![None; context.len()];
        for (slot, trip) in self.trips.iter().enumerate() {
            slots[slot] = Some(SlotPlan {
                vehicle: trip.vehicle,
                departure_min: trip.max_arrival,
            });
        }
        Assignment::new(guest_slots, slots)
    }
}
