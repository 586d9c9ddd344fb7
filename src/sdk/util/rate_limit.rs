use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

// Mapbox Isochrone API default allowance
pub const ISOCHRONE_REQUESTS_PER_MINUTE: u32 = 300;
pub const PARCEL_REQUESTS_PER_MINUTE: u32 = 60;

pub fn per_minute(requests: u32) -> Limiter {
    let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

pub fn isochrone_limiter() -> Limiter {
    per_minute(ISOCHRONE_REQUESTS_PER_MINUTE)
}

pub fn parcel_limiter() -> Limiter {
    per_minute(PARCEL_REQUESTS_PER_MINUTE)
}

/// Blocks the calling thread until the limiter admits one more request.
pub fn wait(limiter: &Limiter) {
    while let Err(not_until) = limiter.check() {
        let delay = not_until.wait_time_from(DefaultClock::default().now());
        log::debug!("Rate limited, sleeping {:?}", delay);
        std::thread::sleep(delay);
    }
}
