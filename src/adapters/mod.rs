// Adapters layer: concrete implementations of the ports (workspace, encoder, job queue).

pub mod ffmpeg;
pub mod queue;
pub mod workspace;

pub use ffmpeg::FfmpegEncoder;
pub use queue::InMemoryJobQueue;
pub use workspace::LocalWorkspace;
