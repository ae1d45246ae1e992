mod composer;
mod exit;

pub use composer::ChatComposer;
pub use exit::ExitState;
