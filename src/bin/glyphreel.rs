use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use glyphreel::glyphs::render::{
    DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, DEFAULT_FONTS_DIR, glyph_dir,
};

#[derive(Parser, Debug)]
#[command(name = "glyphreel", version, about)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the character ramp of a font into `<code_point>.png` bitmaps.
    Glyphs(GlyphsArgs),
    /// Assemble a directory of PNG frames into an MP4 (requires `ffmpeg` on PATH).
    Video(VideoArgs),
    /// Print an image as text using a rendered glyph directory.
    Ascii(AsciiArgs),
    /// Show stream information for a video (requires `ffprobe` on PATH).
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct GlyphsArgs {
    /// Font name, resolved to `<fonts-dir>/<name>.ttf`.
    #[arg(default_value = DEFAULT_FONT_NAME)]
    font_name: String,

    /// Font size in pixels, also the side of each square image. Spaces are ignored.
    #[arg(default_value_t = DEFAULT_FONT_SIZE, value_parser = parse_font_size)]
    font_size: u32,

    /// Directory holding `<name>.ttf`; output goes to `<name>_chars/` inside it.
    #[arg(long, default_value = DEFAULT_FONTS_DIR)]
    fonts_dir: PathBuf,

    /// Font file to load instead of `<fonts-dir>/<name>.ttf`.
    #[arg(long)]
    font_path: Option<PathBuf>,

    /// Output directory (replaced wholesale).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Characters to render, in order.
    #[arg(long)]
    alphabet: Option<String>,

    /// Canvas side in pixels (defaults to the font size).
    #[arg(long)]
    canvas: Option<u32>,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Directory of `*.png` frames, encoded in file name order.
    #[arg(long, default_value = glyphreel::compose::DEFAULT_FRAMES_DIR)]
    frames: PathBuf,

    /// Output MP4 path (overwritten).
    #[arg(long, default_value = glyphreel::compose::DEFAULT_OUT_PATH)]
    out: PathBuf,

    /// Frame rate, whole (`24`) or rational (`30000/1001`).
    #[arg(long, default_value = "24")]
    fps: glyphreel::Fps,

    /// Four-character codec tag.
    #[arg(long, value_enum, default_value_t = glyphreel::VideoCodec::Mp4v)]
    codec: glyphreel::VideoCodec,
}

#[derive(Parser, Debug)]
struct AsciiArgs {
    /// Image to convert.
    image: PathBuf,

    /// Rendered glyph directory (defaults to the default font's `_chars` directory).
    #[arg(long)]
    glyphs: Option<PathBuf>,

    /// Resize the image so it spans this many glyph columns.
    #[arg(long)]
    columns: Option<u32>,
}

impl AsciiArgs {
    fn glyph_dir(&self) -> PathBuf {
        self.glyphs
            .clone()
            .unwrap_or_else(|| glyph_dir(Path::new(DEFAULT_FONTS_DIR), DEFAULT_FONT_NAME))
    }
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Video file.
    video: PathBuf,

    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Glyphs(args) => cmd_glyphs(args),
        Command::Video(args) => cmd_video(args),
        Command::Ascii(args) => cmd_ascii(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_font_size(s: &str) -> Result<u32, String> {
    let digits = s.replace(' ', "");
    let size = digits
        .parse::<u32>()
        .map_err(|e| format!("invalid font size '{s}': {e}"))?;
    if size == 0 {
        return Err("font size must be > 0".to_string());
    }
    Ok(size)
}

fn cmd_glyphs(args: GlyphsArgs) -> anyhow::Result<()> {
    let mut cfg = glyphreel::GlyphRenderConfig::from_font_name(
        &args.fonts_dir,
        &args.font_name,
        args.font_size,
    );
    if let Some(path) = args.font_path {
        cfg.font_path = path;
    }
    if let Some(dir) = args.out_dir {
        cfg.out_dir = dir;
    }
    if let Some(chars) = args.alphabet.as_deref() {
        cfg.alphabet = glyphreel::Alphabet::new(chars)?;
    }
    if let Some(canvas) = args.canvas {
        cfg.canvas_size = canvas;
    }

    let report = glyphreel::render_glyph_set(&cfg)?;
    if !report.missing.is_empty() {
        let missing: String = report.missing.iter().collect();
        eprintln!(
            "warning: {} has no glyph for {:?}; wrote empty images",
            report.family_name, missing
        );
    }
    eprintln!(
        "wrote {} glyphs to {}",
        report.written.len(),
        report.out_dir.display()
    );
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let cfg = glyphreel::ComposeConfig {
        frames_dir: args.frames,
        out_path: args.out,
        fps: args.fps,
        codec: args.codec,
    };
    let report = glyphreel::compose_video(&cfg)?;
    eprintln!(
        "wrote {} ({} frames, {}x{}, {:.2}s)",
        report.out_path.display(),
        report.frames,
        report.width,
        report.height,
        report.duration_secs()
    );
    Ok(())
}

fn cmd_ascii(args: AsciiArgs) -> anyhow::Result<()> {
    let set = glyphreel::GlyphSet::load(&args.glyph_dir())?;
    let mut img = image::open(&args.image)
        .with_context(|| format!("open image '{}'", args.image.display()))?
        .into_luma8();

    if let Some(columns) = args.columns {
        anyhow::ensure!(columns > 0, "--columns must be > 0");
        let (cell_w, _) = set.cell_size();
        let width = columns * cell_w;
        let height = ((u64::from(img.height()) * u64::from(width)) / u64::from(img.width().max(1)))
            .max(1) as u32;
        img = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
    }

    for row in set.image_to_ascii(&img)? {
        println!("{row}");
    }
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = glyphreel::probe_video(&args.video)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("path:     {}", info.path.display());
    println!("codec:    {}", info.codec_tag.as_deref().unwrap_or("?"));
    println!("size:     {}x{}", info.width, info.height);
    println!("fps:      {}/{}", info.fps_num, info.fps_den);
    match info.frame_count {
        Some(n) => println!("frames:   {n}"),
        None => println!("frames:   ?"),
    }
    println!("duration: {:.3}s", info.duration_sec);
    Ok(())
}
