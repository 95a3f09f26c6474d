pub mod board;
pub mod commit;
pub mod filter;
pub mod interaction;
pub mod item;
pub mod layout;
pub mod palette;
pub mod scroll;
pub mod timeline;

pub use board::{GanttBoard, Notice, RowFlash};
pub use commit::{BackendError, CommitRejection, DateUpdate, Pending, Poll, Resolver, ScheduleBackend};
pub use filter::TaskFilters;
pub use interaction::{CommitRequest, DateSpan, DragController, DragKind, DragState, InteractionError};
pub use item::{Priority, ProjectRecord, ScheduleItem, ScheduleSnapshot, Status, TaskRecord};
pub use layout::{DisplayMode, GroupKey, GroupSummary, LayoutRow, RowKey, RowKind, ScheduleLayout};
pub use scroll::{Pane, ScrollSync};
pub use timeline::{DateRange, ViewConfig, ViewMode};
