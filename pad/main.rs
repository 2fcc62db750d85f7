/// ferrite-pad
///
/// Draw a digit in the browser and watch a pretrained model classify it.
/// Served by a synchronous tiny_http server; the page's script forwards
/// pointer events and swaps in the rendered probabilities.
///
/// Run with:
///   cargo run --bin pad --release -- --model-dir trained_models
/// Then open http://127.0.0.1:7878

mod handlers;
mod render;
mod routes;
mod state;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tiny_http::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ferrite_pad::{DrawingSession, PadConfig, PadError, PadResult, Variant};
use state::PadState;

#[derive(Parser, Debug)]
#[command(name = "pad", about = "Digit drawing pad with live classification")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    addr: Option<String>,

    /// Directory holding *.json models
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Model to load at startup (file stem)
    #[arg(long)]
    model: Option<String>,

    /// Input widget: canvas or checkbox
    #[arg(long)]
    variant: Option<Variant>,
}

impl Args {
    fn into_config(self) -> PadResult<PadConfig> {
        let mut config = match &self.config {
            Some(path) => PadConfig::load(path)?,
            None       => PadConfig::default(),
        };
        if let Some(addr) = self.addr { config.addr = addr; }
        if let Some(dir) = self.model_dir { config.model_dir = dir; }
        if let Some(model) = self.model { config.model = Some(model); }
        if let Some(variant) = self.variant { config.variant = variant; }
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "pad failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> PadResult<()> {
    let config = args.into_config()?;
    render::check_template()?;

    // Missing or malformed models are fatal here; there is nothing to draw against.
    let session = DrawingSession::from_config(&config)?;

    let server = Server::http(&config.addr).map_err(|e| PadError::Bind {
        addr: config.addr.clone(),
        reason: e.to_string(),
    })?;

    let shared_state = Arc::new(PadState::new(session, config));
    let models = shared_state.store.list();

    println!("╔══════════════════════════════════════════════╗");
    println!("║          ferrite-pad                         ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", shared_state.config.addr);
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Variant: {:<35}║", shared_state.config.variant);
    println!("║  Models ({:>2}):                                ║", models.len());
    for m in &models {
        println!("║    • {:<40}║", m);
    }
    println!("╚══════════════════════════════════════════════╝");

    info!(addr = %shared_state.config.addr, "listening");

    // One thread per request; the session mutex serializes the drawing work.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
