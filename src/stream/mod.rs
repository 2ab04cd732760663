//! Stream combinators used by connection subscriptions

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
