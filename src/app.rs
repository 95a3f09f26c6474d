use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::io::{sample_snapshot, LocalBackend};
use crate::model::{DisplayMode, GanttBoard, TaskFilters, ViewMode};
use crate::settings::GanttSettings;
use crate::ui;

/// Main application state.
pub struct GanttApp {
    pub board: GanttBoard,
    pub backend: LocalBackend,
    pub settings: GanttSettings,
    settings_path: PathBuf,

    // Filter row; pushed into the board whenever it changes
    pub filters: TaskFilters,
    pub show_filters: bool,

    pub status_message: String,
    // Scroll to today once the first snapshot arrives
    reveal_today: bool,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let settings_path = GanttSettings::default_path();
        let settings = GanttSettings::load_or_default(&settings_path);
        let mut status_message = "Ready".to_string();

        let backend = match settings.snapshot_path.clone() {
            Some(path) => match LocalBackend::open(path.clone(), settings.backend_latency()) {
                Ok(backend) => backend,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "falling back to the sample schedule");
                    status_message = format!("Could not open {}: {}", path.display(), e);
                    LocalBackend::new(sample_snapshot(today()), settings.backend_latency())
                }
            },
            None => LocalBackend::new(sample_snapshot(today()), settings.backend_latency()),
        };

        let mut app = Self {
            board: GanttBoard::new(&settings, today()),
            backend,
            settings,
            settings_path,
            filters: TaskFilters::default(),
            show_filters: false,
            status_message,
            reveal_today: true,
        };
        app.board.refresh(&mut app.backend);
        app
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.board.view_mode() == mode {
            return;
        }
        self.board.set_view_mode(mode);
        self.settings.view_mode = mode;
        self.reveal_today = true;
        self.save_settings();
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.board.display_mode() == mode {
            return;
        }
        self.board.set_display_mode(mode);
        self.settings.display_mode = mode;
        if mode == DisplayMode::Projects {
            self.show_filters = false;
        }
        self.reveal_today = true;
        self.save_settings();
    }

    pub fn refresh(&mut self) {
        if self.board.refresh(&mut self.backend) {
            self.status_message = "Refreshing...".to_string();
        } else {
            self.status_message = "Refresh queued until the current change settles".to_string();
        }
    }

    pub fn open_schedule(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Schedule", &["json"])
            .pick_file()
        else {
            return;
        };
        match LocalBackend::open(path.clone(), self.settings.backend_latency()) {
            Ok(backend) => {
                self.backend = backend;
                self.settings.snapshot_path = Some(path.clone());
                self.save_settings();
                self.reveal_today = true;
                self.status_message = format!("Opened {}", path.display());
                self.board.refresh(&mut self.backend);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open schedule");
                self.status_message = format!("Error loading: {}", e);
            }
        }
    }

    pub fn use_sample_schedule(&mut self) {
        self.backend = LocalBackend::new(sample_snapshot(today()), self.settings.backend_latency());
        self.settings.snapshot_path = None;
        self.save_settings();
        self.reveal_today = true;
        self.status_message = "Using the sample schedule".to_string();
        self.board.refresh(&mut self.backend);
    }

    pub fn go_to_today(&mut self) {
        let x = self.board.config().unit_position(self.board.today(), self.board.range().start);
        self.board.scroll.reveal_x(x);
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            warn!(path = %self.settings_path.display(), error = %e, "could not save settings");
        }
    }

    fn show_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal_centered(|ui| {
            ui.label(
                egui::RichText::new(&self.status_message)
                    .size(11.0)
                    .color(ui::theme::TEXT_SECONDARY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let snapshot = self.board.snapshot();
                ui.label(
                    egui::RichText::new(format!(
                        "Projects: {}  |  Tasks: {}  |  {}",
                        snapshot.projects.len(),
                        snapshot.tasks.len(),
                        self.board.view_mode().label()
                    ))
                    .size(10.5)
                    .color(ui::theme::TEXT_DIM),
                );
                let pending = self.board.commits_in_flight();
                if pending > 0 {
                    ui.label(
                        egui::RichText::new(format!("Saving {pending} change(s)..."))
                            .size(10.5)
                            .color(ui::theme::ACCENT),
                    );
                }
            });
        });
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        let now = Instant::now();

        self.board.set_today(today());
        self.board.poll(&mut self.backend, now);

        if self.reveal_today && self.board.is_loaded() {
            self.go_to_today();
            self.reveal_today = false;
            info!(items = self.board.items().len(), "schedule shown");
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        if self.show_filters && self.board.display_mode() == DisplayMode::Tasks {
            egui::TopBottomPanel::top("filters").show(ctx, |ui| {
                ui.add_space(2.0);
                if ui::filter_bar::show_filter_bar(&mut self.filters, self.board.snapshot(), self.board.today(), ui) {
                    self.board.set_filters(self.filters.clone());
                }
                ui.add_space(2.0);
            });
        }

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| self.show_status_bar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(ui::theme::BG_DARK))
            .show(ctx, |ui| {
                if !self.board.is_loaded() {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                } else if ui.available_width() < self.settings.narrow_width {
                    ui::compact_list::show_compact_list(&self.board, ui);
                } else {
                    ui::gantt_chart::show_gantt_chart(
                        ui,
                        &mut self.board,
                        &mut self.backend,
                        self.settings.label_column_width,
                        now,
                    );
                }
            });

        ui::notifications::show_notifications(ctx, &mut self.board, now);

        if let Some(after) = self.board.next_wakeup(Instant::now()) {
            ctx.request_repaint_after(after);
        }
    }
}
