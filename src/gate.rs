use parking_lot::{Condvar, Mutex};

/// Counting gate limiting how many backend calls run at once.
///
/// Owned by whoever builds the dispatcher; two scans with two gates never
/// share slots.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    in_flight: Mutex<usize>,
    released: Condvar,
}

/// One held slot. Dropping it releases the slot.
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
    held: usize,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), in_flight: Mutex::new(0), released: Condvar::new() }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock()
    }

    /// Block until a slot is free.
    pub fn acquire(&self) -> Permit<'_> {
        let mut in_flight = self.in_flight.lock();
        while *in_flight >= self.capacity {
            self.released.wait(&mut in_flight);
        }
        *in_flight += 1;
        Permit { gate: self, held: *in_flight }
    }

    fn release(&self) {
        let mut in_flight = self.in_flight.lock();
        *in_flight -= 1;
        drop(in_flight);
        self.released.notify_one();
    }
}

impl Permit<'_> {
    /// Slots in use at the moment this one was granted, itself included.
    pub fn held_at_grant(&self) -> usize {
        self.held
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
