mod error;
mod player;
mod sink;

pub use error::PlaybackError;
pub use player::{Player, PlayerMode, PlayerStatus};
pub use sink::{LogSink, PlaybackSink};
