//! Deep-link availability resolution

mod resolver;

pub use resolver::{Availability, AvailabilityResolver};
