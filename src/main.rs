use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use image::buffer::ConvertBuffer;
use itertools::Itertools;
use softraster::renderer::{self, RenderMode, RendererOptions};
use softraster::scene::Scene;

#[derive(Parser, Debug)]
pub struct Args {
    /// Scene description file.
    scene: PathBuf,

    #[arg(short, long, default_value = "800x600")]
    /// Screen dimension in format `width`x`height`
    dimensions: Dimensions,

    #[arg(short, long, value_enum, default_value_t)]
    /// Shading mode selector
    mode: AvailableMode,

    #[arg(short, long, default_value = "output.png")]
    /// Output image path; the extension picks the format.
    output: PathBuf,

    #[arg(long)]
    /// Transform normals with the inverse-transpose of the model transform
    /// (matters under non-uniform scaling).
    correct_normals: bool,

    #[arg(long)]
    /// Antialias wireframe edges.
    antialias: bool,
}

#[derive(Default, Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum AvailableMode {
    #[default]
    Gouraud,
    Phong,
    Edges,
}

impl From<AvailableMode> for RenderMode {
    fn from(val: AvailableMode) -> Self {
        match val {
            AvailableMode::Gouraud => RenderMode::Gouraud,
            AvailableMode::Phong => RenderMode::Phong,
            AvailableMode::Edges => RenderMode::Edges,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Dimensions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split_it = s.split('x');
        let (Some(a), Some(b)) = (split_it.next(), split_it.next()) else {
            return Err(anyhow::anyhow!("Incorrect format, see help"));
        };
        let width: u32 = a.parse()?;
        let height: u32 = b.parse()?;

        Ok(Dimensions { width, height })
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}x{}", self.width, self.height))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("loading scene {}", args.scene.display());
    let scene = Scene::load(&args.scene)?;
    log::info!(
        "scene has {} light(s) and objects: {}",
        scene.lights.len(),
        scene.objects.iter().map(|o| o.name.as_str()).join(", ")
    );

    let options = RendererOptions {
        mode: args.mode.into(),
        correct_normals: args.correct_normals,
        antialias_edges: args.antialias,
    };
    log::info!("rendering at {}", args.dimensions);
    let framebuffer = renderer::render(
        &scene,
        args.dimensions.width,
        args.dimensions.height,
        &options,
    )?;

    let image: image::RgbImage = framebuffer.into_color().convert();
    image.save(&args.output)?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}
