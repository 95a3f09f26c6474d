pub mod app;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod settings;
pub mod ui;

pub use error::GanttError;
pub use model::{GanttBoard, ScheduleBackend, ScheduleSnapshot};
pub use settings::GanttSettings;
