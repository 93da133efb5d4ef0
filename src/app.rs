use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{
    api::ApiClient,
    config::AppConfig,
    forms::{NucleotideForm, ProteinForm},
    job_watch::JobWatcher,
    poller::{spawn_repeating, PollOutcome, PollerHandle},
    ui_state::{UiEvent, UiState},
    validate::{validate_nucleotide_form, validate_protein_form, ValidationIssue},
};
use eframe::egui::{self, Ui};

/// Cluster-type checkboxes offered by the nucleotide form; index 0 is the
/// "all" box whose state propagates to the rest.
const CLUSTER_TYPES: [&str; 6] = [
    "all", "polyketide", "nrps", "terpene", "lantibiotic", "bacteriocin",
];

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

struct JobPanel {
    job_id: String,
    watcher: JobWatcher,
    poller: PollerHandle,
}

pub struct SmashDeskApp {
    config: AppConfig,
    client: ApiClient,
    events: Receiver<UiEvent>,
    sender: Sender<UiEvent>,
    ui_state: UiState,
    nucleotide: NucleotideForm,
    protein: ProteinForm,
    active_issue: Option<ValidationIssue>,
    submit_note: Option<String>,
    job: Option<JobPanel>,
    job_id_input: String,
    _status_poller: PollerHandle,
    update_has_run_before: bool,
}

impl SmashDeskApp {
    pub fn new(config: AppConfig, job_id: Option<&str>) -> Self {
        let client = ApiClient::new();
        let (sender, events) = channel();

        let status_poller = Self::spawn_status_poller(&config, &client, &sender);
        Self::fetch_notices_once(&config, &client, &sender);

        let mut ret = Self {
            client,
            events,
            sender,
            ui_state: UiState::default(),
            nucleotide: NucleotideForm::with_cluster_count(CLUSTER_TYPES.len()),
            protein: ProteinForm::default(),
            active_issue: None,
            submit_note: None,
            job: None,
            job_id_input: String::new(),
            _status_poller: status_poller,
            update_has_run_before: false,
            config,
        };
        if let Some(job_id) = job_id {
            ret.watch_job(job_id);
        }
        ret
    }

    fn spawn_status_poller(
        config: &AppConfig,
        client: &ApiClient,
        sender: &Sender<UiEvent>,
    ) -> PollerHandle {
        let url = config.server_status_url();
        let client = client.clone();
        let sender = sender.clone();
        let interval = Duration::from_millis(config.poll_interval_ms);
        spawn_repeating("server-status", interval, move || {
            match client.server_status(&url) {
                Ok(status) => {
                    let _ = sender.send(UiEvent::Server(status));
                }
                // A failed fetch skips this cycle; the next tick tries again.
                Err(e) => tracing::warn!(error = %e, "server status fetch failed"),
            }
            PollOutcome::Continue
        })
    }

    fn fetch_notices_once(config: &AppConfig, client: &ApiClient, sender: &Sender<UiEvent>) {
        let url = config.notices_url();
        let client = client.clone();
        let sender = sender.clone();
        std::thread::spawn(move || match client.notices(&url) {
            Ok(notices) => {
                let _ = sender.send(UiEvent::Notices(notices));
            }
            Err(e) => tracing::warn!(error = %e, "notice fetch failed"),
        });
    }

    /// Start polling one job. Replaces any job already being watched.
    pub fn watch_job(&mut self, job_id: &str) {
        let url = self.config.job_status_url(job_id);
        let client = self.client.clone();
        let sender = self.sender.clone();
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let poller = spawn_repeating("job-status", interval, move || {
            match client.job_status(&url) {
                Ok(job) => {
                    let _ = sender.send(UiEvent::Job(job));
                }
                Err(e) => tracing::warn!(error = %e, "job status fetch failed"),
            }
            PollOutcome::Continue
        });
        self.job = Some(JobPanel {
            job_id: job_id.to_string(),
            watcher: JobWatcher::new(self.config.redirect_delay_ms),
            poller,
        });
        tracing::info!(job_id, "watching job");
    }

    fn drain_events(&mut self) {
        let events: Vec<UiEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                UiEvent::Server(status) => self.ui_state.set_server(status),
                UiEvent::Notices(notices) => self.ui_state.append_notices(notices),
                UiEvent::Job(status) => {
                    if let Some(panel) = self.job.as_mut() {
                        panel.watcher.observe(now_ms(), &status);
                    }
                }
            }
        }
    }

    /// Terminal jobs stop their poller; an armed redirect still fires.
    fn drive_job_timers(&mut self, ctx: &egui::Context) {
        let Some(panel) = self.job.as_mut() else {
            return;
        };
        if panel.watcher.is_terminal() && !panel.poller.is_stopped() {
            tracing::info!(job_id = %panel.job_id, "job reached terminal state");
            panel.poller.signal_stop();
        }
        if let Some(url) = panel.watcher.take_navigation(now_ms()) {
            tracing::info!(url = %url, "opening job results");
            ctx.open_url(egui::OpenUrl::new_tab(url));
        }
    }

    fn render_server_status(&self, ui: &mut Ui) {
        ui.horizontal(|ui| match self.ui_state.server() {
            Some(server) => {
                ui.label("Server status:");
                ui.strong(&server.status);
                ui.separator();
                ui.label(format!("{} jobs queued", server.queue_length));
                ui.separator();
                ui.label(format!("{} running", server.running));
            }
            None => {
                ui.label("Server status: unknown");
            }
        });
    }

    fn render_notices(&mut self, ui: &mut Ui) {
        for card in self.ui_state.notices_mut() {
            if card.dismissed {
                continue;
            }
            let fill = notice_fill_color(&card.notice.category);
            egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
                ui.horizontal(|ui| {
                    // Teaser and body are plain labels: notice content is
                    // never interpreted as markup.
                    ui.strong(&card.notice.teaser);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        if ui.button("✖").clicked() {
                            card.dismissed = true;
                        }
                    });
                });
                ui.label(&card.notice.text);
            });
        }
    }

    fn render_job_panel(&mut self, ui: &mut Ui) {
        let Some(panel) = self.job.as_ref() else {
            return;
        };
        let render = panel.watcher.render();
        ui.heading(format!("Job {}", panel.job_id));
        ui.horizontal(|ui| {
            if let Some(icon_file) = render.icon_file.as_deref() {
                let uri = format!("file://{}/{}", self.config.image_dir, icon_file);
                ui.add(egui::Image::from_uri(uri).max_height(24.0));
            }
            ui.vertical(|ui| {
                // Newlines in the status text become line breaks here.
                ui.label(&render.status_text);
                if !render.last_changed.is_empty() {
                    ui.weak(format!("Last changed: {}", render.last_changed));
                }
            });
        });
        if let Some(url) = render.result_url.as_deref() {
            ui.horizontal(|ui| {
                ui.label("See the ");
                ui.hyperlink_to("result", url.to_string());
            });
        }
    }

    fn render_nucleotide_form(&mut self, ui: &mut Ui) {
        ui.heading("Nucleotide input");

        ui.horizontal(|ui| {
            if ui.button("Select file…").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_file() {
                    self.nucleotide.upload_filename = path.display().to_string();
                    self.nucleotide.on_sequence_field_changed();
                }
            }
            if self.nucleotide.upload_filename.is_empty() {
                ui.weak("no file selected");
            } else {
                ui.monospace(&self.nucleotide.upload_filename);
            }
            if ui.button("Clear").clicked() {
                self.nucleotide.clear_upload();
            }
        });

        ui.horizontal(|ui| {
            ui.label("NCBI accession:");
            ui.text_edit_singleline(&mut self.nucleotide.ncbi);
            if ui.button("Clear").clicked() {
                self.nucleotide.clear_ncbi_field();
            }
        });

        if ui
            .checkbox(&mut self.nucleotide.eukaryotic, "Eukaryotic sequence")
            .changed()
        {
            self.nucleotide.refresh_glimmer_visibility();
        }

        if ui
            .checkbox(&mut self.nucleotide.region, "Restrict to region")
            .changed()
        {
            self.nucleotide.toggle_region_input();
        }
        if animated_open(ui, "region-input", self.nucleotide.region_visible) {
            ui.horizontal(|ui| {
                ui.label("From:");
                ui.add(egui::TextEdit::singleline(&mut self.nucleotide.from).desired_width(80.0));
                ui.label("To:");
                ui.add(egui::TextEdit::singleline(&mut self.nucleotide.to).desired_width(80.0));
            });
        }

        if animated_open(ui, "glimmer-panel", self.nucleotide.glimmer_visible) {
            ui.group(|ui| {
                ui.label("Gene finding settings (prokaryotic DNA only)");
                ui.horizontal_wrapped(|ui| {
                    let mut propagate = false;
                    for (idx, cluster) in self.nucleotide.clusters.iter_mut().enumerate() {
                        let label = CLUSTER_TYPES.get(idx).copied().unwrap_or("cluster");
                        let response = ui.add_enabled(
                            cluster.enabled,
                            egui::Checkbox::new(&mut cluster.checked, label),
                        );
                        if idx == 0 && response.changed() {
                            propagate = true;
                        }
                    }
                    if propagate {
                        self.nucleotide.toggle_clusters();
                    }
                });
                ui.horizontal(|ui| {
                    let sub = &mut self.nucleotide.subclusterblast;
                    ui.add_enabled(
                        sub.enabled,
                        egui::Checkbox::new(&mut sub.checked, "SubClusterBlast"),
                    );
                    let inclusive = &mut self.nucleotide.inclusive;
                    ui.add_enabled(
                        inclusive.enabled,
                        egui::Checkbox::new(&mut inclusive.checked, "Inclusive cluster detection"),
                    );
                });
            });
        }

        if ui
            .checkbox(&mut self.nucleotide.legacy, "Legacy mode")
            .changed()
        {
            self.nucleotide.toggle_legacy_mode();
        }

        if ui.button("Submit nucleotide job").clicked() {
            match validate_nucleotide_form(&self.nucleotide) {
                Ok(()) => {
                    self.submit_note = Some("Nucleotide input looks good.".to_string());
                    tracing::info!("nucleotide form validated");
                }
                Err(issue) => self.active_issue = Some(issue),
            }
        }
    }

    fn render_protein_form(&mut self, ui: &mut Ui) {
        ui.heading("Protein input");

        ui.label("Protein sequence:");
        ui.add(
            egui::TextEdit::multiline(&mut self.protein.sequence)
                .desired_rows(4)
                .hint_text("Paste a protein FASTA sequence"),
        );
        if ui.button("Clear sequence").clicked() {
            self.protein.clear_sequence_field();
        }

        ui.horizontal(|ui| {
            ui.label("NCBI protein IDs (comma separated):");
            ui.text_edit_singleline(&mut self.protein.ncbi);
            if ui.button("Clear").clicked() {
                self.protein.clear_protein_ncbi_field();
            }
        });

        if ui.button("Submit protein job").clicked() {
            match validate_protein_form(&self.protein) {
                Ok(()) => {
                    self.submit_note = Some("Protein input looks good.".to_string());
                    tracing::info!("protein form validated");
                }
                Err(issue) => self.active_issue = Some(issue),
            }
        }
    }

    fn render_issue_popup(&mut self, ctx: &egui::Context) {
        let Some(issue) = self.active_issue else {
            return;
        };
        let mut close = false;
        egui::Window::new("Problem with your input")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(issue.to_string());
                if ui.button("OK").clicked() {
                    close = true;
                }
            });
        if close {
            self.active_issue = None;
        }
    }

    fn render_watch_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Monitor job:");
            ui.add(
                egui::TextEdit::singleline(&mut self.job_id_input)
                    .hint_text("job id")
                    .desired_width(200.0),
            );
            if ui.button("Watch").clicked() && !self.job_id_input.trim().is_empty() {
                let job_id = self.job_id_input.trim().to_string();
                self.watch_job(&job_id);
            }
        });
    }
}

impl eframe::App for SmashDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.update_has_run_before {
            egui_extras::install_image_loaders(ctx);
            self.update_has_run_before = true;
        }

        self.drain_events();
        self.drive_job_timers(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            self.render_server_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_notices(ui);
                if self.ui_state.visible_notice_count() > 0 {
                    ui.separator();
                }

                self.render_watch_controls(ui);
                if self.job.is_some() {
                    ui.separator();
                    self.render_job_panel(ui);
                }

                ui.separator();
                self.render_nucleotide_form(ui);
                ui.separator();
                self.render_protein_form(ui);

                if let Some(note) = self.submit_note.as_deref() {
                    ui.separator();
                    ui.weak(note);
                }
            });
        });

        self.render_issue_popup(ctx);

        // Keep frames coming so poll events and the redirect timer are
        // picked up without user interaction.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/// The "fast" show/hide transition: a ~200 ms fade driven by egui's
/// animation clock. Returns whether the section should be drawn at all.
fn animated_open(ui: &mut Ui, id: &str, visible: bool) -> bool {
    let openness = ui
        .ctx()
        .animate_bool_with_time(egui::Id::new(id), visible, 0.2);
    openness > 0.0
}

fn notice_fill_color(category: &str) -> egui::Color32 {
    match category {
        "error" | "danger" => egui::Color32::from_rgb(80, 30, 30),
        "warning" => egui::Color32::from_rgb(80, 65, 25),
        _ => egui::Color32::from_rgb(25, 50, 80),
    }
}
