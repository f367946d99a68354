// Library surface for the binary and for headless integration tests.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod hits;
pub mod remote;
pub mod runtime;
pub mod session;
pub mod surface;
pub mod util;
pub mod validation;
pub mod workout;

pub use controller::{PollOutcome, SessionController};
pub use error::{ClassificationError, RemoteError, ValidationError, WorkoutError};
pub use session::Phase;
