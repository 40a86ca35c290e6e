//! Board window: renders the view state and turns widget interactions into
//! board events. All requests go through the backend command queue.

use std::time::Duration;

use client_core::{
    controller::{CardList, LOADING_TEXT, LOAD_FAILED_TEXT},
    view::{
        ActivityCard, ParticipantsSection, RemovalTarget, NO_PARTICIPANTS_TEXT,
        PARTICIPANTS_TITLE, SELECT_PLACEHOLDER,
    },
    Event, Phase, Tone, ViewState,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
};

const OK_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 125, 50);
const ERR_COLOR: egui::Color32 = egui::Color32::from_rgb(198, 40, 40);
const BADGE_COLOR: egui::Color32 = egui::Color32::from_rgb(21, 101, 192);

pub struct BoardApp {
    state: ViewState,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    last_error: Option<UiError>,
}

impl BoardApp {
    /// Creates the app and queues the initial activities load.
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            state: ViewState::new(),
            cmd_tx,
            ui_rx,
            status: "Starting...".to_string(),
            last_error: None,
        };
        app.apply(Event::LoadRequested);
        app
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn apply(&mut self, event: Event) {
        let name = event.name();
        let effects = self.state.apply(event);
        tracing::debug!(event = name, effects = effects.len(), "applied board event");
        for effect in effects {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::Execute(effect),
                &mut self.status,
            );
        }
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Board(event) => self.apply(event),
                UiEvent::Info(message) => {
                    self.status = message;
                    self.last_error = None;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "{}",
                        err.message()
                    );
                    self.status = err.summary();
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Mergington High School");
            ui.label("Extracurricular Activities");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.apply(Event::LoadRequested);
                }
                if self.last_error.is_some() {
                    ui.colored_label(ERR_COLOR, self.status.as_str());
                } else {
                    ui.weak(self.status.as_str());
                }
            });
        });
    }

    fn show_signup_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Sign Up for an Activity");
        ui.add_space(8.0);

        ui.label("Student Email:");
        let mut email = self.state.form.email.clone();
        let email_response = ui.add(
            egui::TextEdit::singleline(&mut email)
                .hint_text("your-email@mergington.edu")
                .desired_width(f32::INFINITY),
        );
        if email_response.changed() {
            self.apply(Event::EmailEdited(email));
        }
        let submit_on_enter =
            email_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(6.0);
        ui.label("Select Activity:");
        let mut selected = self.state.form.activity.clone();
        let selected_text = self
            .state
            .options()
            .iter()
            .find(|option| option.value == selected)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| SELECT_PLACEHOLDER.to_string());
        egui::ComboBox::from_id_salt("activity_select")
            .selected_text(selected_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for option in self.state.options() {
                    ui.selectable_value(&mut selected, option.value.clone(), option.label.as_str());
                }
            });
        if selected != self.state.form.activity {
            self.apply(Event::ActivitySelected(selected));
        }

        ui.add_space(8.0);
        if ui.button("Sign Up").clicked() || submit_on_enter {
            self.apply(Event::SignupSubmitted);
        }

        if let Some(message) = self.state.message() {
            ui.add_space(8.0);
            let color = match message.tone {
                Tone::Ok => OK_COLOR,
                Tone::Err => ERR_COLOR,
            };
            ui.colored_label(color, message.text.as_str());
        }
        if self.state.phase() == Phase::Submitting {
            ui.spinner();
        }
    }

    fn show_cards(&mut self, ui: &mut egui::Ui) {
        let mut requested = None;
        match self.state.cards() {
            CardList::Pending => {
                ui.label(LOADING_TEXT);
            }
            CardList::LoadFailed => {
                ui.colored_label(ERR_COLOR, LOAD_FAILED_TEXT);
            }
            CardList::Cards(cards) => {
                for card in cards {
                    if let Some(target) = show_card(ui, card) {
                        requested = Some(target);
                    }
                    ui.add_space(8.0);
                }
            }
        }
        if let Some(target) = requested {
            self.apply(Event::RemovalRequested(target));
        }
    }

    fn show_removal_confirmation(&mut self, ctx: &egui::Context) {
        let Some(target) = self.state.pending_removal() else {
            return;
        };
        let prompt = target.confirmation_prompt();
        let mut decision = None;
        egui::Window::new("Confirm removal")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.horizontal(|ui| {
                    if ui.button("Remove").clicked() {
                        decision = Some(Event::RemovalConfirmed);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(Event::RemovalDeclined);
                    }
                });
            });
        if let Some(event) = decision {
            self.apply(event);
        }
    }
}

/// Draws one card; returns the participant whose remove control was clicked.
fn show_card(ui: &mut egui::Ui, card: &ActivityCard) -> Option<RemovalTarget> {
    let mut requested = None;
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(card.name.as_str()).heading());
        if !card.description.is_empty() {
            ui.label(card.description.as_str());
        }
        ui.label(egui::RichText::new(card.schedule_line.as_str()).weak());
        if let Some(badge) = card.spots_badge() {
            ui.label(egui::RichText::new(badge).strong().color(BADGE_COLOR));
        }

        ui.add_space(4.0);
        ui.label(egui::RichText::new(PARTICIPANTS_TITLE).strong());
        match &card.participants {
            ParticipantsSection::Empty => {
                ui.label(egui::RichText::new(NO_PARTICIPANTS_TEXT).italics().weak());
            }
            ParticipantsSection::Rows(rows) => {
                for row in rows {
                    ui.horizontal(|ui| {
                        ui.label(row.email.as_str());
                        let remove = ui
                            .small_button("🗑")
                            .on_hover_text(row.remove_title.as_str());
                        remove.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Button,
                                true,
                                row.remove_label.as_str(),
                            )
                        });
                        if remove.clicked() {
                            requested = Some(row.target.clone());
                        }
                    });
                }
            }
        }
    });
    requested
}

impl Drop for BoardApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("board_header").show(ctx, |ui| self.show_header(ui));
        egui::SidePanel::right("signup_panel")
            .min_width(300.0)
            .show(ctx, |ui| self.show_signup_form(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Available Activities");
            ui.add_space(8.0);
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| self.show_cards(ui));
        });
        self.show_removal_confirmation(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
