//! System launcher adapters.

mod recording;

pub use recording::RecordingLauncher;
