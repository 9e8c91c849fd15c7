use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use pancrop::{
    CropConfig, KeyframeTrack, OutputFormat, RoundingMode, SequenceCropper, load_frame,
    load_pan_specs, output_name, probe_size, resolve_anchors, save_frame,
};

#[derive(Parser, Debug)]
#[command(name = "pancrop", version, about = "Pan/zoom crop across an image sequence")]
struct Cli {
    /// Pan specification: a JSON object/array, or a file containing one.
    /// May be given multiple times; specs apply in order.
    #[arg(long = "pan", required = true)]
    pan: Vec<String>,

    /// Fixed output size WxH. When omitted, taken from the first frame's
    /// cropped size and enforced for the rest of the run.
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Directory for the cropped frames. Defaults to each input's directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Prefix for output file names.
    #[arg(long, default_value = "pan-")]
    prefix: String,

    /// Output image format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpeg)]
    format: FormatChoice,

    /// How fractional crop edges are rounded to pixel boundaries.
    #[arg(long, value_enum, default_value_t = RoundingChoice::Nearest)]
    rounding: RoundingChoice,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input frames, in sequence order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

impl From<FormatChoice> for OutputFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Png => Self::Png,
            FormatChoice::Jpeg => Self::Jpeg,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoundingChoice {
    Nearest,
    Floor,
    Ceil,
}

impl From<RoundingChoice> for RoundingMode {
    fn from(c: RoundingChoice) -> Self {
        match c {
            RoundingChoice::Nearest => Self::Nearest,
            RoundingChoice::Floor => Self::Floor,
            RoundingChoice::Ceil => Self::Ceil,
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X', ','])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if w == 0 || h == 0 {
        return Err("size must be non-zero in both dimensions".into());
    }
    Ok((w, h))
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut specs = Vec::new();
    for arg in &cli.pan {
        specs.extend(load_pan_specs(arg)?);
    }

    let names: Vec<String> = cli
        .frames
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let anchors = resolve_anchors(&specs, &names, |name| probe_size(Path::new(name)))?;
    let track = KeyframeTrack::new(anchors)?;
    tracing::info!(
        frames = cli.frames.len(),
        anchors = track.anchors().len(),
        "starting crop sequence"
    );

    let config = CropConfig {
        output_size: cli.size,
        rounding: cli.rounding.into(),
    };
    let format: OutputFormat = cli.format.into();

    let frames = cli.frames.iter().map(|p| load_frame(p));
    let mut written = 0u64;
    for result in SequenceCropper::process(frames, &track, config)? {
        let cropped = result?;
        let src = &cli.frames[cropped.index as usize];
        let name = output_name(src, &cli.prefix, cropped.index, format);
        let out_path = match &cli.out_dir {
            Some(dir) => dir.join(name),
            None => src.with_file_name(name),
        };
        tracing::debug!(frame = cropped.index, out = %out_path.display(), "saving");
        save_frame(&cropped.image, &out_path, format)?;
        written += 1;
    }
    tracing::info!(written, "crop sequence complete");
    Ok(())
}
