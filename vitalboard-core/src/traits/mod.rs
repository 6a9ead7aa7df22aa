//! Core Traits and Abstractions
//!
//! The core never owns a platform resource. Everything it needs from the
//! outside world comes in through one of three seams:
//!
//! - [`bus`] - register-level I2C access ([`BusTransport`], [`HalBus`])
//! - [`store`] - append + prune persistence ([`RetentionStore`])
//! - [`time`] - the clock records are stamped with ([`TimeSource`])
//!
//! Drivers and the board orchestrator are generic over these traits and
//! borrow implementations per call, so there is no ambient bus handle or
//! global connection anywhere in the crate.

pub mod bus;
pub mod store;
pub mod time;

pub use bus::{BusTransport, HalBus};
pub use store::RetentionStore;
pub use time::TimeSource;
