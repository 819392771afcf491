mod clock;
mod controller;
mod presenter;
mod source;
mod state;

pub use clock::{Clock, ClockEvent};
pub use controller::ReviewController;
pub use presenter::{format_time, ReviewPanel};
pub use source::ReviewStatusSource;
pub use state::{FailureKind, ReviewAction, ReviewError, ReviewState, ReviewView};
