pub mod banner;
pub mod control_bar;
pub mod header;
pub mod stage;

pub use banner::{BANNER_TEXT, PreConnectBanner};
pub use control_bar::ControlBar;
pub use header::Header;
pub use stage::Stage;
