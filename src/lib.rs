pub mod calendar;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod locale;
pub mod observer;
pub mod picker;
pub mod ui;
pub mod zone;

pub use error::{Error, ErrorKind, Result};
pub use observer::{DatePickerEvent, DatePickerEventKind, DatePickerObserver};
pub use picker::{DatePicker, Navigation, PickerOptions};
