use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use vecscene::{Color, RenderOpts, Renderer, Scene};

#[derive(Parser, Debug)]
#[command(name = "vecscene", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene document as a PNG.
    Render(RenderArgs),
    /// Print a summary of a scene document.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    out: PathBuf,

    /// Override the page width.
    #[arg(long)]
    width: Option<f64>,

    /// Override the page height.
    #[arg(long)]
    height: Option<f64>,

    /// Override the background color (any color the scene format accepts, or `none`).
    #[arg(long)]
    background: Option<String>,

    /// Coverage gamma.
    #[arg(long, default_value_t = 1.0)]
    gamma: f64,

    /// Deepest nesting drawn.
    #[arg(long, default_value_t = 256)]
    max_depth: u32,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input scene JSON.
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut scene = Scene::load(&args.in_path)?;

    if args.width.is_some() || args.height.is_some() {
        let page = scene.page_size();
        let w = args.width.unwrap_or(page.width);
        let h = args.height.unwrap_or(page.height);
        scene.set_page_size(w, h).context("page size")?;
    }
    if let Some(bg) = args.background.as_deref() {
        let color = match bg {
            "none" => None,
            text => Some(Color::parse(text).with_context(|| format!("background '{text}'"))?),
        };
        scene.set_background(color);
    }

    let opts = RenderOpts::default()
        .with_gamma(args.gamma)
        .with_max_depth(args.max_depth);
    let mut renderer = Renderer::new(opts);
    let canvas = renderer.render(&mut scene)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    canvas
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let mut scene = Scene::load(&args.in_path)?;
    let page = scene.page_size();
    println!("page: {} x {}", page.width, page.height);
    println!("nodes: {}", scene.len());
    println!("definitions: {}", scene.defs().len());
    let root = scene.root();
    match scene.bounds(root) {
        Some(b) => println!("bounds: {} {} {} {}", b.x0, b.y0, b.x1, b.y1),
        None => println!("bounds: none"),
    }
    Ok(())
}
