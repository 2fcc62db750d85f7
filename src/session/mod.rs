pub mod session;

pub use session::{DrawingSession, Frame, PadEvent};
