mod renderer;
pub mod row;
pub mod scroll;
mod view;

pub use renderer::{HEADER_TITLE, TranscriptRenderer};
pub use row::{Badge, BubbleStyle, Edge, Politeness, TranscriptRow, build_rows, sanitize_body};
pub use scroll::{ScrollBehavior, ScrollController, ScrollRequest, Viewport};
pub use view::TranscriptView;
