//! State shared between the interrupt handlers and the main loop.
//!
//! # Execution contexts
//!
//! Highest priority first:
//!
//! 1. zero-cross handler, once per detected AC zero crossing
//! 2. slice handler, every slice between zero crossings
//! 3. main loop: dial sampling, sync line I/O
//!
//! The handlers own the run state and never wait on anything. Everything the main loop
//! needs to see or change goes through [`SharedState`], where each accessor is one short
//! critical section. The zero-cross handler may preempt the slice handler, so handlers also
//! go through these accessors and leave the state consistent at every step.

use core::cell::{Cell, RefCell};
use critical_section::Mutex;
use heapless::Deque;

use crate::types::SyncEvent;

/// Pending sync events in one direction. Two slots cover a `Restart` immediately followed
/// by a `Step` before the consumer gets to run.
pub const EVENT_QUEUE_CAPACITY: usize = 2;

type EventQueue = Deque<SyncEvent, EVENT_QUEUE_CAPACITY>;

/// Handler/main-loop shared state. Place one in a `static`.
pub struct SharedState {
    outbound: Mutex<RefCell<EventQueue>>,
    inbound: Mutex<RefCell<EventQueue>>,
    speed: Mutex<Cell<u16>>,
    resync: Mutex<Cell<bool>>,
    dropped: Mutex<Cell<u32>>,
}

impl SharedState {
    /// Creates the shared state with an initial speed parameter.
    pub const fn new(speed: u16) -> Self {
        Self {
            outbound: Mutex::new(RefCell::new(Deque::new())),
            inbound: Mutex::new(RefCell::new(Deque::new())),
            speed: Mutex::new(Cell::new(speed)),
            resync: Mutex::new(Cell::new(false)),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Queues an event for the master's protocol emitter. Zero-cross handler side.
    ///
    /// Returns false, and counts a drop, if the emitter has fallen behind.
    pub fn post_outbound(&self, event: SyncEvent) -> bool {
        self.push(&self.outbound, event)
    }

    /// Takes the oldest event for the protocol emitter. Main loop side.
    pub fn take_outbound(&self) -> Option<SyncEvent> {
        critical_section::with(|cs| self.outbound.borrow_ref_mut(cs).pop_front())
    }

    /// Queues an event received from the master. Main loop side.
    pub fn post_inbound(&self, event: SyncEvent) -> bool {
        self.push(&self.inbound, event)
    }

    /// Takes the oldest received event. Zero-cross handler side.
    pub fn take_inbound(&self) -> Option<SyncEvent> {
        critical_section::with(|cs| self.inbound.borrow_ref_mut(cs).pop_front())
    }

    fn push(&self, queue: &Mutex<RefCell<EventQueue>>, event: SyncEvent) -> bool {
        critical_section::with(|cs| {
            if queue.borrow_ref_mut(cs).push_back(event).is_ok() {
                return true;
            }
            let dropped = self.dropped.borrow(cs);
            dropped.set(dropped.get().wrapping_add(1));
            false
        })
    }

    /// Current speed parameter.
    pub fn speed(&self) -> u16 {
        critical_section::with(|cs| self.speed.borrow(cs).get())
    }

    /// Sets the speed parameter.
    pub fn set_speed(&self, speed: u16) {
        critical_section::with(|cs| self.speed.borrow(cs).set(speed));
    }

    /// Sets the speed parameter and returns the previous one.
    pub fn swap_speed(&self, speed: u16) -> u16 {
        critical_section::with(|cs| self.speed.borrow(cs).replace(speed))
    }

    /// Asks the scheduler to restart the current step's timing at the next zero cross.
    pub fn request_resync(&self) {
        critical_section::with(|cs| self.resync.borrow(cs).set(true));
    }

    /// Takes a pending resync request.
    pub fn take_resync(&self) -> bool {
        critical_section::with(|cs| self.resync.borrow(cs).replace(false))
    }

    /// Events dropped because a queue was full.
    pub fn dropped_events(&self) -> u32 {
        critical_section::with(|cs| self.dropped.borrow(cs).get())
    }
}
