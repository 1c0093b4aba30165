mod clock;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use window::{Boundary, CurfewStatus, CurfewWindow};
