/// Globe gallery viewer entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use clap::Parser;
    use globe_gallery::{AppConfig, DeviceClass, Manifest};

    #[derive(Parser)]
    #[command(author, version, about = "Browse a photo collection on a rotating globe", long_about = None)]
    struct Cli {
        /// Image folder or JSON manifest of {thumbnail, fullsize} entries
        source: PathBuf,
        /// Square drawing size in logical pixels
        #[arg(long)]
        size: Option<u32>,
        /// "desktop", "constrained", or a user-agent style hint to classify
        #[arg(long)]
        device: Option<String>,
        /// Config file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,
    }

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let (app_config, config_err) = match config_path.as_deref().map(AppConfig::load) {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) => (AppConfig::default(), Some(e)),
        None => (AppConfig::default(), None),
    };

    env_logger::Builder::new()
        .filter_level(app_config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if let Some(e) = config_err {
        log::warn!("Ignoring config {:?}: {}", config_path, e);
    }

    let mut app_config = app_config;
    let hint = match cli.device.as_deref() {
        Some("desktop") => {
            app_config.device = Some(DeviceClass::Desktop);
            String::new()
        }
        Some("constrained") => {
            app_config.device = Some(DeviceClass::Constrained);
            String::new()
        }
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let config = app_config.gallery_config(&hint);
    let size = cli.size.unwrap_or(app_config.surface_size).max(1);

    let manifest = match Manifest::from_path(&cli.source) {
        Ok(manifest) => manifest,
        Err(e) => {
            log::error!("Failed to load {:?}: {}", cli.source, e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Loaded {} photos from {:?} ({:?} profile)",
        manifest.len(),
        cli.source,
        config.device
    );

    if let Err(e) = globe_gallery::app::run(manifest.descriptors, config, size) {
        log::error!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
