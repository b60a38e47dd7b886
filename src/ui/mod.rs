pub mod app;
pub mod context;
pub mod field;
pub mod popup;

pub use app::App;
pub use context::{Context, Mode, Theme};
pub use field::{StatusLine, TextField};
pub use popup::Popup;
