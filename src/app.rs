use crate::images::{ImageCache, ImageState};
use crate::theme::Theme;
use eframe::egui::{self, Align, CornerRadius, Layout, RichText, ScrollArea};
use photochat::chat::session::PhotoOptions;
use photochat::chat::transcript::{PhotoSlotState, TranscriptEntry};
use photochat::{ChatBackend, ChatSession, Persona, Role, Transcript};
use std::sync::Arc;
use tokio::runtime::Handle;

const UNAVAILABLE_NOTICE: &str = "(image unavailable)";

pub struct PhotoChatApp {
    session: ChatSession<Transcript>,
    images: ImageCache,
    theme: Theme,
    input_buffer: String,
    last_revision: u64,
}

impl PhotoChatApp {
    pub fn new(
        ctx: &egui::Context,
        persona: Persona,
        backend: Arc<dyn ChatBackend>,
        runtime: Handle,
        photo_options: PhotoOptions,
    ) -> Self {
        let repaint_ctx = ctx.clone();
        let mut session = ChatSession::new(persona, backend, runtime.clone(), Transcript::new())
            .with_photo_options(photo_options)
            .with_notifier(move || repaint_ctx.request_repaint());
        session.start();

        let theme = Theme::default();
        theme.apply_visuals(ctx);

        Self {
            session,
            images: ImageCache::new(runtime),
            theme,
            input_buffer: String::new(),
            last_revision: 0,
        }
    }

    fn submit_prompt(&mut self) {
        if self.session.send_user_message(&self.input_buffer) {
            self.input_buffer.clear();
        }
    }

    fn render_top_bar(&self, ctx: &egui::Context) {
        let persona = self.session.persona();
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(persona.name.as_str());
                if self.session.pending_chats() > 0 {
                    ui.separator();
                    ui.label(
                        RichText::new(format!("{} is typing...", persona.name))
                            .italics()
                            .color(self.theme.text_muted),
                    );
                }
            });
        });
    }

    fn render_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_8);
            let mut send_now = false;
            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let button_width = 80.0;
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.input_buffer)
                            .desired_width(ui.available_width() - button_width)
                            .hint_text("Type a message..."),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                        response.request_focus();
                    }

                    send_now |= ui
                        .add_enabled(
                            !self.input_buffer.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                });
            });
            ui.add_space(self.theme.spacing_8);

            if send_now {
                self.submit_prompt();
            }
        });
    }

    fn render_transcript(&mut self, ctx: &egui::Context) {
        let revision = self.session.target().revision();
        let scroll_to_bottom = revision != self.last_revision;
        self.last_revision = revision;

        let Self {
            session,
            images,
            theme,
            ..
        } = self;
        let loading_text = session.persona().loading_text.as_str();

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for entry in session.target().entries() {
                        match entry {
                            TranscriptEntry::Text { role, text } => {
                                render_bubble(ui, theme, *role, text);
                            }
                            TranscriptEntry::Photo { role, state, .. } => {
                                render_photo(ui, ctx, theme, images, *role, state, loading_text);
                            }
                        }
                    }

                    if scroll_to_bottom {
                        ui.scroll_to_cursor(Some(Align::BOTTOM));
                    }
                });
        });
    }
}

fn role_layout(role: Role) -> Layout {
    match role {
        Role::User => Layout::top_down(Align::Max),
        Role::Assistant => Layout::top_down(Align::Min),
    }
}

fn render_bubble(ui: &mut egui::Ui, theme: &Theme, role: Role, text: &str) {
    ui.with_layout(role_layout(role), |ui| {
        let max_width = ui.available_width() * 0.75;
        theme.bubble_frame(role).show(ui, |ui| {
            ui.set_max_width(max_width);
            ui.label(RichText::new(text).color(theme.bubble_text_color(role)));
        });
    });
}

fn render_photo(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    theme: &Theme,
    images: &mut ImageCache,
    role: Role,
    state: &PhotoSlotState,
    loading_text: &str,
) {
    ui.with_layout(role_layout(role), |ui| match state {
        PhotoSlotState::Reserved | PhotoSlotState::Failed => {}
        PhotoSlotState::Loading => {
            ui.label(
                RichText::new(loading_text)
                    .small()
                    .italics()
                    .color(theme.text_muted),
            );
        }
        PhotoSlotState::Unavailable => {
            ui.label(RichText::new(UNAVAILABLE_NOTICE).small().color(theme.text_muted));
        }
        PhotoSlotState::Resolved { url } => match images.get(ctx, url) {
            ImageState::Loading => {
                ui.spinner();
            }
            ImageState::Ready(texture) => {
                let sized = egui::load::SizedTexture::from_handle(texture);
                ui.add(
                    egui::Image::from_texture(sized)
                        .max_width(theme.photo_max_width)
                        .corner_radius(CornerRadius::same(theme.radius_12)),
                )
                .on_hover_text(url.as_str());
            }
            ImageState::Failed => {
                ui.label(RichText::new(UNAVAILABLE_NOTICE).small().color(theme.danger));
            }
        },
    });
}

impl eframe::App for PhotoChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.drain_events();
        self.images.drain(ctx);
        self.render_top_bar(ctx);
        self.render_composer(ctx);
        self.render_transcript(ctx);
    }
}
