mod app;
mod images;
mod theme;

use app::PhotoChatApp;
use clap::Parser;
use eframe::egui;
use photochat::chat::session::PhotoOptions;
use photochat::{Config, HttpBackend, PersonaTable};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "photochat", about = "Chat with a persona that can send photos")]
struct Args {
    /// Configuration file (defaults to ./photochat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persona identifier, forwarded to the backend as `girl_id`
    #[arg(long)]
    persona: Option<String>,

    /// Backend base URL
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(persona) = args.persona {
        config.persona = Some(persona);
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let personas = match &config.personas_file {
        Some(path) => PersonaTable::load(path)?,
        None => PersonaTable::bundled()?,
    };
    let persona = personas.select(config.persona.as_deref());
    let backend = HttpBackend::new(&config)?;
    log::info!(
        "chatting as {:?} via {} and {}",
        persona.id.as_deref().unwrap_or("default"),
        backend.chat_url(),
        backend.photo_url()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("photochat-runtime")
        .build()?;
    let handle = runtime.handle().clone();
    let photo_options = PhotoOptions {
        style: config.photo_style.clone(),
        pose: config.photo_pose.clone(),
    };

    let title = persona.name.clone();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 720.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |creation_context| {
            Ok(Box::new(PhotoChatApp::new(
                &creation_context.egui_ctx,
                persona,
                Arc::new(backend),
                handle,
                photo_options,
            )))
        }),
    )?;

    drop(runtime);
    Ok(())
}
