use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::info;

use watermark_remover_lib::config::Config;
use watermark_remover_lib::gui;
use watermark_remover_lib::parameters::RemovalMode;
use watermark_remover_lib::pipeline::{run_headless, ParamOverrides};
use watermark_remover_lib::removal::LogProgress;
use watermark_remover_lib::session::EditingSession;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Watermark Remover - mask and remove recurring watermarks from scanned documents")]
struct Args {
    /// Input PDF, page image, or directory of page images
    #[clap(short, long)]
    input: Option<String>,

    /// Output PDF or directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Watermark mask (single-channel image)
    #[clap(short, long)]
    mask: Option<String>,

    /// Removal strategy (overwrites config)
    #[clap(long)]
    mode: Option<ModeArg>,

    /// Sharpening weight, 0.0 to 2.5 (overwrites config)
    #[clap(long)]
    sharpen: Option<f32>,

    /// Resolution used for placeholder pages and PDF page size
    #[clap(long)]
    dpi: Option<u32>,

    /// Launch the interactive editor
    #[clap(long)]
    gui: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Fill,
    Inpaint,
}

impl From<ModeArg> for RemovalMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Fill => RemovalMode::Fill,
            ModeArg::Inpaint => RemovalMode::Inpaint,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = Config::from_file_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config))?;

    // Override config with command-line arguments
    if let Some(input) = args.input {
        config.input_path = input;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(mask) = args.mask {
        config.mask_path = Some(mask);
    }
    if let Some(dpi) = args.dpi {
        config.dpi = dpi;
    }
    if let Some(mode) = args.mode {
        config.default_parameters.mode = mode.into();
    }
    if let Some(weight) = args.sharpen {
        config.default_parameters.sharpen_weight = weight;
    }

    config.validate()?;

    let start_time = Instant::now();

    if args.gui {
        let session = EditingSession::from_config(config).context("starting editing session")?;
        let session = gui::run_gui(session)?;
        let bytes = session.save_output().context("saving output")?;
        info!("Wrote {} bytes to {}", bytes, session.config().output_path);
        return Ok(());
    }

    let Some(mask_path) = config.mask_path.clone().map(PathBuf::from) else {
        bail!("headless mode needs a mask: pass --mask or set mask_path, or use --gui");
    };

    let overrides = ParamOverrides {
        mode: args.mode.map(Into::into),
        sharpen_weight: args.sharpen,
    };
    let bytes = run_headless(&config, &mask_path, overrides, &mut LogProgress)
        .with_context(|| format!("removing watermark from {}", config.input_path))?;

    info!(
        "Wrote {} bytes to {} in {:.2} seconds",
        bytes,
        config.output_path,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
