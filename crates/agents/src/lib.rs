pub mod booking;
pub mod planner;
pub mod progress;
pub mod session;

pub use booking::{create_booking, Booking, BookingError, BookingStatus};
pub use planner::{PlannerAgent, PlanningError, PlanningStrategy};
pub use progress::{PlanningProgress, PlanningStage, ProgressTracker};
pub use session::TripSession;
