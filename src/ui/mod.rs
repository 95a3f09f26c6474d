pub mod compact_list;
pub mod filter_bar;
pub mod gantt_chart;
pub mod header;
pub mod label_column;
pub mod notifications;
pub mod project_bar;
pub mod task_bar;
pub mod theme;
pub mod toolbar;
