// Network adapter modules split by the pilot TCP socket vs the HTTP viewer routes.

pub mod framing;
pub mod pilot;
pub mod publish;
pub mod viewer;

pub use framing::{FrameError, FrameReader, MAX_FRAME_LEN, write_message};
pub use pilot::serve_pilots;
pub use publish::snapshot_serializer;
pub use viewer::router;
