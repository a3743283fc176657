use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};

use codeshot::codec::ImageFormat;
use codeshot::config::{Config, SettingError};
use codeshot::draw::{Color, FontDescriptor, color::{BLACK, WHITE}};
use codeshot::model::{ModelBuilder, StyledTextModel, TextStyle, UniformStyle};
use codeshot::shot::{ShotDependencies, ShotDestination, ShotRequest, file, perform_shot};

#[derive(Parser, Debug)]
#[command(name = "codeshot")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CODESHOT_GIT_HASH"), ")"),
    about = "Render styled source code selections to images"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a selection and save it and/or copy it to the clipboard
    Render(RenderArgs),
    /// List supported output formats in configuration order
    Formats,
    /// Write a documented default config to ~/.config/codeshot/config.toml
    InitConfig,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Styled text model as JSON ("-" for stdin)
    #[arg(long, value_name = "FILE", conflicts_with = "text", required_unless_present = "text")]
    model: Option<PathBuf>,

    /// Plain text rendered in a single style ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    text: Option<PathBuf>,

    /// Project root whose .codeshot.toml overrides the user config
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Output format (png, jpeg, bmp, svg)
    #[arg(long, short = 'f')]
    format: Option<ImageFormat>,

    /// Scale factor applied to all geometry
    #[arg(long, short = 's')]
    scale: Option<String>,

    /// Margin around the content in pixels
    #[arg(long, short = 'p')]
    padding: Option<u32>,

    /// Keep common leading indentation
    #[arg(long, action = ArgAction::SetTrue)]
    no_chop: bool,

    /// Leave caret marks out of the image
    #[arg(long, action = ArgAction::SetTrue)]
    remove_caret: bool,

    /// Draw line numbers in a gutter
    #[arg(long, action = ArgAction::SetTrue)]
    line_numbers: bool,

    /// Line number of the first input line, for --text input
    #[arg(long, value_name = "N", default_value_t = 1)]
    first_line: usize,

    /// Override any [render] or [output] setting
    #[arg(long = "set", value_name = "KEY=VALUE")]
    settings: Vec<String>,

    /// Directory to save into
    #[arg(long, short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Copy the image to the Wayland clipboard
    #[arg(long, short = 'c', action = ArgAction::SetTrue, conflicts_with = "no_clipboard")]
    clipboard: bool,

    /// Leave the clipboard untouched
    #[arg(long, action = ArgAction::SetTrue)]
    no_clipboard: bool,

    /// Do not write a file
    #[arg(long, action = ArgAction::SetTrue)]
    no_save: bool,

    /// Render even above the large-image threshold
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,

    /// Font family for --text input
    #[arg(long, default_value = "Monospace")]
    font: String,

    /// Font size in pixels for --text input
    #[arg(long, default_value_t = 14.0)]
    font_size: f64,

    /// Canvas color behind the text ("#rrggbb", white, black)
    #[arg(long, value_name = "COLOR")]
    background: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => run_render(args),
        Command::Formats => {
            for format in ImageFormat::ALL {
                println!(
                    "{}  {:<4}  {:<13}  .{}",
                    format.ordinal(),
                    format,
                    format.mime_type(),
                    format.extension()
                );
            }
            Ok(())
        }
        Command::InitConfig => {
            let path = Config::create_default_file()?;
            println!("Created {}", path.display());
            Ok(())
        }
    }
}

fn run_render(args: RenderArgs) -> Result<()> {
    let mut config = load_config(args.project.as_deref());
    apply_overrides(&mut config, &args)?;

    let model = read_model(&args)?;

    let configured = config.output.destination;
    let destination = ShotDestination::from_flags(
        configured.saves_file() && !args.no_save,
        (configured.copies_to_clipboard() || args.clipboard) && !args.no_clipboard,
    )
    .context("Nothing to do: both the file and the clipboard are disabled")?;

    if destination.copies_to_clipboard() && std::env::var("WAYLAND_DISPLAY").is_err() {
        log::warn!("WAYLAND_DISPLAY not set - clipboard copy will likely fail");
    }

    let mut request = ShotRequest::from_config(model, &config);
    request.destination = destination;
    if args.force {
        request.max_pixels = None;
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(perform_shot(
        request,
        Arc::new(ShotDependencies::default()),
    ))?;

    if let Some(path) = &result.saved_path {
        println!("{}", path.display());
    }
    if destination.copies_to_clipboard() {
        if result.copied_to_clipboard {
            eprintln!(
                "Copied {}x{} {} image to clipboard",
                result.width,
                result.height,
                result.image.format()
            );
        } else if result.saved_path.is_some() {
            eprintln!("Warning: clipboard copy failed; the image was only saved");
        } else {
            bail!("Clipboard copy failed");
        }
    }

    Ok(())
}

fn load_config(project: Option<&Path>) -> Config {
    let loaded = match project {
        Some(project) => Config::load_for_project(project),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|err| {
        log::warn!("{:#}; using default settings", err);
        Config::default()
    })
}

fn apply_overrides(config: &mut Config, args: &RenderArgs) -> Result<()> {
    for setting in &args.settings {
        let (key, value) = setting
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{setting}'"))?;
        let key = key.trim();
        let key = key
            .strip_prefix("render.")
            .or_else(|| key.strip_prefix("output."))
            .unwrap_or(key);
        match config.render.apply_setting(key, value) {
            Err(SettingError::UnknownKey(_)) => config.output.apply_setting(key, value)?,
            other => other?,
        }
    }

    if let Some(format) = args.format {
        config.render.format = format;
    }
    if let Some(scale) = &args.scale {
        config.render.apply_setting("scale", scale)?;
    }
    if let Some(padding) = args.padding {
        config.render.padding = padding;
    }
    if args.no_chop {
        config.render.chop_indentation = false;
    }
    if args.remove_caret {
        config.render.remove_caret = true;
    }
    if args.line_numbers {
        config.render.show_line_numbers = true;
    }
    if let Some(dir) = &args.output_dir {
        config.output.save_directory = Some(dir.to_string_lossy().into_owned());
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(file::expand_tilde(&path.to_string_lossy()))
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn read_model(args: &RenderArgs) -> Result<StyledTextModel> {
    let background = match &args.background {
        Some(raw) => Some(
            codeshot::util::parse_color(raw)
                .with_context(|| format!("Invalid color '{raw}'"))?,
        ),
        None => None,
    };

    if let Some(path) = &args.model {
        let json = read_input(path)?;
        let mut model: StyledTextModel = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse model from {}", path.display()))?;
        if background.is_some() {
            model.background = background;
        }
        return Ok(model);
    }

    let Some(path) = &args.text else {
        bail!("Either --model or --text is required");
    };
    let text = read_input(path)?;
    let lines: Vec<&str> = text.lines().collect();
    let font = FontDescriptor::new(args.font.clone(), args.font_size, false, false);
    let style = UniformStyle(TextStyle {
        font: font.clone(),
        foreground: foreground_for(background),
        background: None,
    });

    Ok(ModelBuilder::new()
        .default_font(font)
        .background(background)
        .first_line_number(args.first_line)
        .from_source(&lines, 0, &style)
        .build())
}

/// Black text, or white on a dark canvas.
fn foreground_for(background: Option<Color>) -> Color {
    match background {
        Some(bg) if 0.299 * bg.r + 0.587 * bg.g + 0.114 * bg.b < 0.5 => WHITE,
        _ => BLACK,
    }
}
