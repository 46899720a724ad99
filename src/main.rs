use std::path::PathBuf;

use clap::Parser;
use windmill_ngin::{camera::ViewModel, config::SceneConfig, error::InitError, flow};

#[derive(Parser, Debug)]
#[command(name = "windmill")]
#[command(about = "A windmill with spinning blades, viewed through a free camera")]
struct Cli {
    /// Scene description (JSON). Built-in defaults are used without it.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// How the camera's view matrix is built
    #[arg(long, value_enum)]
    view_model: Option<ViewModel>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Directory mesh, texture and shader paths are resolved against
    #[arg(long)]
    assets: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<SceneConfig, InitError> {
        let mut config = match &self.scene {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        if let Some(view_model) = self.view_model {
            config.view_model = view_model;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(assets) = self.assets {
            config.asset_root = assets;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = Cli::parse()
        .into_config()
        .map_err(anyhow::Error::from)
        .and_then(flow::run);
    if let Err(e) = result {
        log::error!("{e:#}");
        let code = e.downcast_ref::<InitError>().map_or(1, InitError::exit_code);
        std::process::exit(code);
    }
}
