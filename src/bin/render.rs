use std::path::PathBuf;
use std::process;

use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use heatframes::{render_frames, ColormapKind, Origin, RenderConfig, SnapshotPattern};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "heatframes-render",
    about = "Render scalar-field snapshots to images on one shared colour scale"
)]
struct Opt {
    /// Directory holding the snapshot files; images are written next to them
    #[structopt(parse(from_os_str))]
    input_dir: PathBuf,

    /// Grid rows per snapshot
    width: usize,

    /// Grid columns per snapshot
    height: usize,

    /// Worker threads (0 runs on the main thread)
    #[structopt(short, long)]
    threads: Option<usize>,

    /// Snapshot file extension
    #[structopt(short, long, default_value = "csv")]
    extension: String,

    /// viridis, greyscale or rainbow
    #[structopt(short, long, default_value = "viridis")]
    colormap: ColormapKind,

    /// Where grid row 0 is drawn: lower or upper
    #[structopt(long, default_value = "lower")]
    origin: Origin,

    /// Pixels per grid cell edge
    #[structopt(long, default_value = "1")]
    cell_size: u32,

    /// Log filter, overrides RUST_LOG
    #[structopt(long)]
    log_level: Option<String>,
}

impl Opt {
    fn config(&self) -> RenderConfig {
        let mut config = RenderConfig::new(&self.input_dir, self.width, self.height)
            .pattern(SnapshotPattern::extension(&self.extension))
            .colormap(self.colormap)
            .origin(self.origin)
            .cell_size(self.cell_size);
        if let Some(threads) = self.threads {
            config = config.threads(threads);
        }
        config
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    let opt = Opt::from_args();
    init_logging(opt.log_level.as_deref());

    match render_frames(&opt.config()) {
        Ok(report) => {
            info!(
                bound = %report.bound,
                images = report.images.len(),
                "done"
            );
        }
        Err(e) => {
            error!(kind = e.kind(), "{}", e);
            process::exit(1);
        }
    }
}
