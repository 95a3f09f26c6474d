#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use gantt_timeline::app::GanttApp;

fn main() -> eframe::Result<()> {
    if let Err(e) = gantt_timeline::logging::init_logging() {
        eprintln!("logging disabled: {e}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([480.0, 400.0])
            .with_title("Gantt Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Timeline",
        options,
        Box::new(|cc| Ok(Box::new(GanttApp::new(cc)))),
    )
}
