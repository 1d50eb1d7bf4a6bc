// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod bus;
mod events;

pub use bus::EventBus;
pub use events::{topics, Event, EventListener, GraphEvent, RuntimeEvent};
