mod event;
mod projection;
mod trajectory;

pub use event::EventMarker;
pub use projection::{project_onto_segment, SegmentProjection};
pub use trajectory::Trajectory;
