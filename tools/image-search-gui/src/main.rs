use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui::{self, CentralPanel, ComboBox, ScrollArea, TextEdit};
use eframe::{App, CreationContext, Frame, NativeOptions};
use egui_extras::{Column, TableBuilder};
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use history_store::{default_history_path, HistoryStore};
use image_model::{
    normalize_query_text, FileAction, ImageRecord, SearchMode, SearchQuery, SkippedFile,
};
use search_service::{apply_file_action, search, ActionOutcome};

const THUMB_SIZE: u32 = 160;
const DETAIL_PREVIEW_SIZE: u32 = 560;
const GRID_COLUMNS: usize = 6;
const CONFIG_FILE_NAME: &str = "image-search-gui.json";

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let options = NativeOptions::default();
    eframe::run_native(
        "Image Metadata Search",
        options,
        Box::new(|cc| Box::new(AppState::new(cc))),
    )
}

/// Settings that can be saved to / loaded from a JSON file via the dialogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppConfig {
    image_folder: String,
    history_file: String,
    mode: String,
}

/// State of the detail popup for one selected result.
struct DetailView {
    index: usize,
    record: ImageRecord,
    texture: Option<egui::TextureHandle>,
    error: Option<String>,
}

struct AppState {
    // Inputs
    folder_input: String,
    keywords_input: String,
    mode: SearchMode,

    // Query history, persisted through an explicit store handle
    history_store: HistoryStore,
    history: Vec<String>,
    history_choice: String,

    // Last search
    results: Vec<ImageRecord>,
    thumbnails: Vec<Option<egui::TextureHandle>>,
    skipped: Vec<SkippedFile>,
    scanned: usize,
    show_skipped: bool,

    // Popup + feedback
    detail: Option<DetailView>,
    status: String,
    error: Option<String>,
}

impl AppState {
    fn new(cc: &CreationContext<'_>) -> Self {
        install_cjk_fallback_fonts(&cc.egui_ctx);
        let history_store = HistoryStore::new(default_history_path());
        let history = history_store.load();
        let history_choice = history.first().cloned().unwrap_or_default();
        Self {
            folder_input: default_image_folder().display().to_string(),
            keywords_input: String::new(),
            mode: SearchMode::And,
            history_store,
            history,
            history_choice,
            results: Vec::new(),
            thumbnails: Vec::new(),
            skipped: Vec::new(),
            scanned: 0,
            show_skipped: false,
            detail: None,
            status: String::new(),
            error: None,
        }
    }

    fn do_search_now(&mut self, ctx: &egui::Context) {
        self.error = None;
        let folder = PathBuf::from(self.folder_input.trim());
        if !folder.is_dir() {
            self.error = Some(format!("Folder does not exist: {}", folder.display()));
            return;
        }
        let raw = normalize_query_text(&self.keywords_input);
        let Some(query) = SearchQuery::parse(&raw, self.mode) else {
            self.error = Some("Enter at least one keyword (comma separated)".to_string());
            return;
        };

        // Record the query before scanning so the history survives a long search.
        match self.history_store.save(&raw) {
            Ok(entries) => {
                self.history = entries;
                self.history_choice = raw.clone();
            }
            Err(error) => tracing::warn!("query history not recorded: {error}"),
        }

        match search(&folder, &query) {
            Ok(outcome) => {
                self.detail = None;
                self.show_skipped = false;
                self.results = outcome.matches;
                self.skipped = outcome.skipped;
                self.scanned = outcome.scanned;
                self.thumbnails = self
                    .results
                    .iter()
                    .enumerate()
                    .map(|(index, record)| {
                        load_texture(ctx, &record.path, THUMB_SIZE, &format!("thumb-{index}"))
                    })
                    .collect();
                let failed = self.thumbnails.iter().filter(|t| t.is_none()).count();
                let mut status = format!(
                    "{} matches out of {} entries, {} skipped",
                    self.results.len(),
                    self.scanned,
                    self.skipped.len()
                );
                if failed > 0 {
                    status.push_str(&format!(", {failed} previews unavailable"));
                }
                self.status = status;
            }
            Err(error) => {
                self.results.clear();
                self.thumbnails.clear();
                self.skipped.clear();
                self.scanned = 0;
                self.error = Some(error.to_string());
            }
        }
    }

    fn open_detail(&mut self, ctx: &egui::Context, index: usize) {
        let Some(record) = self.results.get(index).cloned() else {
            return;
        };
        let texture = load_texture(ctx, &record.path, DETAIL_PREVIEW_SIZE, "detail-preview");
        self.detail = Some(DetailView {
            index,
            record,
            texture,
            error: None,
        });
    }

    fn save_config_via_dialog(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(CONFIG_FILE_NAME)
            .save_file()
        else {
            return;
        };
        let config = AppConfig {
            image_folder: self.folder_input.trim().to_string(),
            history_file: self.history_store.path().display().to_string(),
            mode: self.mode.as_str().to_string(),
        };
        match serde_json::to_string_pretty(&config) {
            Ok(body) => match fs::write(&path, body) {
                Ok(()) => self.status = format!("Saved config to {}", path.display()),
                Err(error) => self.status = format!("Save config failed: {error}"),
            },
            Err(error) => self.status = format!("Save config failed: {error}"),
        }
    }

    fn load_config_via_dialog(&mut self) {
        let Some(path) = FileDialog::new().add_filter("JSON", &["json"]).pick_file() else {
            return;
        };
        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<AppConfig>(&text) {
                Ok(config) => {
                    self.apply_config(config);
                    self.status = format!("Loaded config from {}", path.display());
                }
                Err(_) => {
                    self.status = "Load config failed: invalid JSON structure".to_string();
                }
            },
            Err(error) => self.status = format!("Load config failed: {error}"),
        }
    }

    fn apply_config(&mut self, config: AppConfig) {
        self.folder_input = config.image_folder;
        if let Some(mode) = SearchMode::parse(&config.mode) {
            self.mode = mode;
        }
        let history_file = config.history_file.trim();
        if !history_file.is_empty() {
            self.history_store = HistoryStore::new(history_file);
            self.history = self.history_store.load();
            self.history_choice = self.history.first().cloned().unwrap_or_default();
        }
    }
}

impl App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        CentralPanel::default().show(ctx, |ui| {
            ui.heading("Image Metadata Search");
            self.ui_inputs(ui, ctx);
            ui.separator();
            self.ui_results(ui, ctx);
            ui.separator();
            if let Some(error) = &self.error {
                ui.colored_label(egui::Color32::RED, error);
            }
            if !self.status.is_empty() {
                ui.label(&self.status);
            }
        });
        self.ui_detail_window(ctx);
        self.ui_skipped_window(ctx);
    }
}

impl AppState {
    fn ui_inputs(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.label("Folder");
            ui.add(
                TextEdit::singleline(&mut self.folder_input)
                    .desired_width(400.0)
                    .id_source("folder_input"),
            );
            if ui.button("Browse...").clicked() {
                if let Some(folder) = FileDialog::new().pick_folder() {
                    self.folder_input = folder.display().to_string();
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Keywords");
            ui.add(
                TextEdit::singleline(&mut self.keywords_input)
                    .desired_width(400.0)
                    .id_source("keywords_input"),
            );
            ui.label("comma separated");
        });

        ui.horizontal(|ui| {
            ui.label("History");
            let mut chosen: Option<String> = None;
            ComboBox::from_id_source("history_combo")
                .width(400.0)
                .selected_text(truncate_for_menu(&self.history_choice, 48))
                .show_ui(ui, |ui| {
                    for entry in &self.history {
                        if ui
                            .selectable_label(self.history_choice == *entry, entry)
                            .clicked()
                        {
                            chosen = Some(entry.clone());
                        }
                    }
                });
            if let Some(entry) = chosen {
                self.keywords_input = entry.clone();
                self.history_choice = entry;
            }
        });

        ui.horizontal(|ui| {
            ui.label("Mode");
            ui.selectable_value(&mut self.mode, SearchMode::And, "AND");
            ui.selectable_value(&mut self.mode, SearchMode::Or, "OR");
        });

        ui.horizontal(|ui| {
            if ui.button("Search").clicked() {
                self.do_search_now(ctx);
            }
            if ui.button("Save config").clicked() {
                self.save_config_via_dialog();
            }
            if ui.button("Load config").clicked() {
                self.load_config_via_dialog();
            }
            if !self.skipped.is_empty() {
                let label = format!("Skipped files ({})", self.skipped.len());
                if ui.selectable_label(self.show_skipped, label).clicked() {
                    self.show_skipped = !self.show_skipped;
                }
            }
        });
    }

    fn ui_results(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if self.results.is_empty() {
            ui.label("No results. Pick a folder, enter keywords, then press Search.");
            return;
        }
        let mut open_detail: Option<usize> = None;
        ScrollArea::vertical()
            .id_source("results_scroll")
            .show(ui, |ui| {
                egui::Grid::new("thumb_grid")
                    .spacing([8.0, 8.0])
                    .show(ui, |ui| {
                        for (index, record) in self.results.iter().enumerate() {
                            let clicked = match &self.thumbnails[index] {
                                Some(texture) => ui
                                    .add(egui::ImageButton::new((
                                        texture.id(),
                                        texture.size_vec2(),
                                    )))
                                    .on_hover_text(&record.file_name)
                                    .clicked(),
                                None => ui.button(&record.file_name).clicked(),
                            };
                            if clicked {
                                open_detail = Some(index);
                            }
                            if (index + 1) % GRID_COLUMNS == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });
        if let Some(index) = open_detail {
            self.open_detail(ctx, index);
        }
    }

    fn ui_detail_window(&mut self, ctx: &egui::Context) {
        if self.detail.is_some() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.detail = None;
        }
        let Some(detail) = &mut self.detail else {
            return;
        };
        let mut keep_open = true;
        let mut status: Option<String> = None;
        let mut remove_index: Option<usize> = None;
        egui::Window::new("Image detail")
            .open(&mut keep_open)
            .resizable(true)
            .show(ctx, |ui| {
                if let Some(texture) = &detail.texture {
                    ui.image((texture.id(), texture.size_vec2()));
                } else {
                    ui.label("(preview unavailable)");
                }
                ui.label(format!("Path: {}", detail.record.path.display()));
                ui.label(format!("Size: {}", format_bytes(detail.record.size_bytes)));
                if let Some(modified) = detail.record.modified_at {
                    ui.label(format!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S")));
                }
                ui.separator();
                ui.label("Metadata:");
                ScrollArea::vertical()
                    .max_height(160.0)
                    .id_source("detail_metadata")
                    .show(ui, |ui| {
                        let mut text = detail.record.metadata.clone();
                        ui.add(
                            TextEdit::multiline(&mut text)
                                .desired_rows(6)
                                .desired_width(520.0),
                        );
                    });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Copy to...").clicked() {
                        if let Some(dest_dir) = FileDialog::new().pick_folder() {
                            let action = FileAction::Copy {
                                source: detail.record.path.clone(),
                                dest_dir,
                            };
                            match apply_file_action(&action) {
                                Ok(ActionOutcome::Copied { dest }) => {
                                    status = Some(format!("Copied to {}", dest.display()));
                                    detail.error = None;
                                }
                                Ok(_) => {}
                                Err(error) => detail.error = Some(error.to_string()),
                            }
                        }
                    }
                    if ui.button("Move to...").clicked() {
                        if let Some(dest_dir) = FileDialog::new().pick_folder() {
                            let action = FileAction::Move {
                                source: detail.record.path.clone(),
                                dest_dir,
                            };
                            match apply_file_action(&action) {
                                Ok(ActionOutcome::Moved { dest }) => {
                                    status = Some(format!("Moved to {}", dest.display()));
                                    remove_index = Some(detail.index);
                                }
                                Ok(_) => {}
                                Err(error) => detail.error = Some(error.to_string()),
                            }
                        }
                    }
                    if ui.button("Open in viewer").clicked() {
                        let action = FileAction::OpenExternal {
                            path: detail.record.path.clone(),
                        };
                        match apply_file_action(&action) {
                            Ok(_) => {
                                status = Some(format!("Opened {}", detail.record.file_name));
                                detail.error = None;
                            }
                            Err(error) => detail.error = Some(error.to_string()),
                        }
                    }
                });
                if let Some(error) = &detail.error {
                    ui.colored_label(egui::Color32::RED, error);
                }
            });
        if let Some(message) = status {
            self.status = message;
        }
        if let Some(index) = remove_index {
            if index < self.results.len() {
                self.results.remove(index);
                self.thumbnails.remove(index);
            }
            keep_open = false;
        }
        if !keep_open {
            self.detail = None;
        }
    }

    fn ui_skipped_window(&mut self, ctx: &egui::Context) {
        if !self.show_skipped {
            return;
        }
        let mut keep_open = true;
        egui::Window::new("Skipped files")
            .open(&mut keep_open)
            .resizable(true)
            .show(ctx, |ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .column(Column::initial(320.0))
                    .column(Column::remainder())
                    .header(20.0, |mut header| {
                        header.col(|ui| {
                            ui.label("File");
                        });
                        header.col(|ui| {
                            ui.label("Reason");
                        });
                    })
                    .body(|mut body| {
                        for skip in &self.skipped {
                            body.row(18.0, |mut row| {
                                row.col(|ui| {
                                    ui.label(display_file_name(&skip.path));
                                });
                                row.col(|ui| {
                                    ui.label(skip.reason.to_string());
                                });
                            });
                        }
                    });
            });
        self.show_skipped = keep_open;
    }
}

// --- helpers ---

fn default_image_folder() -> PathBuf {
    std::env::current_dir()
        .map(|dir| dir.join("images"))
        .unwrap_or_else(|_| PathBuf::from("images"))
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_texture(
    ctx: &egui::Context,
    path: &Path,
    max_side: u32,
    name: &str,
) -> Option<egui::TextureHandle> {
    let image = match image::open(path) {
        Ok(image) => image,
        Err(error) => {
            tracing::warn!("preview decode failed for {}: {error}", path.display());
            return None;
        }
    };
    let thumb = image.thumbnail(max_side, max_side).to_rgba8();
    let size = [thumb.width() as usize, thumb.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, thumb.as_raw());
    Some(ctx.load_texture(name.to_string(), color, egui::TextureOptions::LINEAR))
}

fn truncate_for_menu(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Adds a CJK-capable fallback font so metadata written in Japanese or
/// Chinese renders instead of showing tofu boxes.
fn install_cjk_fallback_fonts(ctx: &egui::Context) {
    let Some(font_data) = load_cjk_font_data() else {
        tracing::warn!("no CJK fallback font found, non-Latin metadata may not render");
        return;
    };
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk_fallback".to_owned(), egui::FontData::from_owned(font_data));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            list.insert(0, "cjk_fallback".to_owned());
        }
    }
    ctx.set_fonts(fonts);
}

fn load_cjk_font_data() -> Option<Vec<u8>> {
    for path in candidate_font_paths() {
        if let Ok(bytes) = fs::read(&path) {
            return Some(bytes);
        }
    }
    None
}

fn candidate_font_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(custom) = std::env::var("IMAGE_SEARCH_FONT") {
        paths.push(PathBuf::from(custom));
    }
    if let Ok(windir) = std::env::var("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        for name in ["YuGothM.ttc", "YuGothB.ttc", "meiryo.ttc", "msgothic.ttc"] {
            paths.push(fonts.join(name));
        }
    }
    paths.push(PathBuf::from(
        "/System/Library/Fonts/Hiragino Sans GB.ttc",
    ));
    paths.push(PathBuf::from(
        "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    ));
    paths.push(PathBuf::from(
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ));
    paths.push(PathBuf::from(
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    ));
    paths.push(PathBuf::from("fonts/NotoSansJP-Regular.otf"));
    paths
}
