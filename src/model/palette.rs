//! Colors assigned to projects by their position in the project list.

use egui::Color32;

pub const PROJECT_COLORS: &[Color32] = &[
    Color32::from_rgb(59, 130, 246),  // blue-500
    Color32::from_rgb(16, 185, 129),  // emerald-500
    Color32::from_rgb(245, 158, 11),  // amber-500
    Color32::from_rgb(139, 92, 246),  // violet-500
    Color32::from_rgb(236, 72, 153),  // pink-500
    Color32::from_rgb(20, 184, 166),  // teal-500
    Color32::from_rgb(249, 115, 22),  // orange-500
    Color32::from_rgb(99, 102, 241),  // indigo-500
];

/// Bars and headers of tasks without a (known) project.
pub const UNASSIGNED_COLOR: Color32 = Color32::from_rgb(107, 114, 128);

/// Color for the project at `index` in the authoritative project list.
pub fn project_color(index: usize) -> Color32 {
    PROJECT_COLORS[index % PROJECT_COLORS.len()]
}
