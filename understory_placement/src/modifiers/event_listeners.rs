// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keep the placement fresh while ancestors scroll or the viewport resizes.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::modifier::{ModifierDescriptor, Phase};
use crate::platform::ListenFlags;

use super::names;

/// Options for [`event_listeners`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EventListenersOptions {
    /// Update when any scroll ancestor of the reference or popper scrolls.
    pub scroll: bool,
    /// Update when the viewport resizes.
    pub resize: bool,
}

impl Default for EventListenersOptions {
    fn default() -> Self {
        Self {
            scroll: true,
            resize: true,
        }
    }
}

impl EventListenersOptions {
    /// The subscription set these options describe.
    pub fn flags(&self) -> ListenFlags {
        let mut flags = ListenFlags::empty();
        flags.set(ListenFlags::SCROLL, self.scroll);
        flags.set(ListenFlags::RESIZE, self.resize);
        flags
    }
}

/// Subscribes to scroll and resize events with one observer call; every event requests a
/// coalesced update. Has no per-pass work.
pub fn event_listeners(options: EventListenersOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::EVENT_LISTENERS, Phase::Write).with_effect(
        move |state, args| {
            let events = options.flags();
            if events.is_empty() {
                return None;
            }
            let mut targets = Vec::new();
            if options.scroll {
                for &target in state
                    .scroll_parents
                    .reference
                    .iter()
                    .chain(&state.scroll_parents.popper)
                {
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }
            log::debug!("subscribing to {events:?} on {} targets", targets.len());
            let requester = args.requester.clone();
            Some(args.platform.observer.subscribe(
                &targets,
                events,
                Rc::new(move || {
                    let _ = requester.request();
                }),
            ))
        },
    )
}
