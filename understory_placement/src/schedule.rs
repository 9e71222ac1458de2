// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred execution and update handles.
//!
//! ## Overview
//!
//! [`Instance::update`](crate::instance::Instance::update) never runs a pass inline. It hands a
//! [`Task`] to the instance's [`Scheduler`] and returns an [`UpdateHandle`]. Requests made before
//! that task runs share the task and the handle, so a burst of requests costs one pass and every
//! requester sees the same [`Snapshot`].
//!
//! [`TaskQueue`] is the bundled scheduler: a FIFO the host drains at a point of its choosing
//! (after an event dispatch, once per frame), much like a microtask checkpoint.
//!
//! ```
//! use understory_placement::schedule::{Scheduler, TaskQueue};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let queue = TaskQueue::new();
//! let hits = Rc::new(Cell::new(0));
//! let h = hits.clone();
//! queue.schedule(Box::new(move || h.set(h.get() + 1)));
//! assert_eq!(hits.get(), 0, "nothing runs until the queue is drained");
//! assert_eq!(queue.run_pending(), 1);
//! assert_eq!(hits.get(), 1);
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::error::PlacementError;
use crate::state::Snapshot;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks later, on the same thread.
pub trait Scheduler {
    /// Queue `task`. Implementations must not run it before returning.
    fn schedule(&self, task: Task);
}

/// FIFO scheduler drained explicitly by the host.
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl TaskQueue {
    /// An empty queue, ready to be shared with instances.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run queued tasks until the queue is empty, including tasks queued while draining.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop before running so a task may schedule more work.
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

struct Slot {
    result: Option<Result<Snapshot, PlacementError>>,
    wakers: Vec<Waker>,
}

/// Shared completion of one coalesced update.
///
/// Clones observe the same completion. Poll it as a [`Future`], or check [`result`](Self::result)
/// after draining the scheduler.
#[derive(Clone)]
pub struct UpdateHandle {
    slot: Rc<RefCell<Slot>>,
}

impl fmt::Debug for UpdateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl UpdateHandle {
    pub(crate) fn pending() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                result: None,
                wakers: Vec::new(),
            })),
        }
    }

    pub(crate) fn resolved(result: Result<Snapshot, PlacementError>) -> Self {
        let handle = Self::pending();
        handle.resolve(result);
        handle
    }

    /// Complete the handle; the first completion wins.
    pub(crate) fn resolve(&self, result: Result<Snapshot, PlacementError>) {
        let wakers = {
            let mut slot = self.slot.borrow_mut();
            if slot.result.is_some() {
                return;
            }
            slot.result = Some(result);
            core::mem::take(&mut slot.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// The outcome, once the update has run.
    pub fn result(&self) -> Option<Result<Snapshot, PlacementError>> {
        self.slot.borrow().result.clone()
    }

    /// True once the update has run (or was abandoned).
    pub fn is_ready(&self) -> bool {
        self.slot.borrow().result.is_some()
    }

    /// True when both handles belong to the same coalesced update.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl Future for UpdateHandle {
    type Output = Result<Snapshot, PlacementError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        if let Some(result) = &slot.result {
            return Poll::Ready(result.clone());
        }
        if !slot.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            slot.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
