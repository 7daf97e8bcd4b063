use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use i8008_core_emulator::{Core, Ram};
use i8008_utils::{assemble, load_image};
use log::LevelFilter;

mod logger;
mod monitor;

use monitor::Monitor;

#[derive(Parser, Debug)]
#[command(name = "i8008")]
#[command(about = "Intel 8008 emulator with a front-panel monitor", long_about = None)]
struct Args {
    /// Raw memory image to load at address 0 before starting
    #[arg(long)]
    image: Option<PathBuf>,

    /// 8008 assembly source to assemble and load at address 0 before starting
    #[arg(long, conflicts_with = "image")]
    asm: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Run until HALT before showing the prompt
    #[arg(long)]
    run: bool,

    /// Most instructions executed by --run, the `run` command or a single `step`
    #[arg(long, default_value_t = 100_000)]
    max_steps: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level: LevelFilter = args
        .log_level
        .parse()
        .with_context(|| format!("invalid log level '{}'", args.log_level))?;
    logger::init(level).context("failed to install logger")?;

    let mut ram = Ram::new();
    if let Some(path) = &args.image {
        let loaded = load_image(path, ram.bytes_mut())
            .with_context(|| format!("couldn't open {}", path.display()))?;
        log::info!("loaded {loaded} bytes from {}", path.display());
    }
    if let Some(path) = &args.asm {
        let code = fs::read_to_string(path)
            .with_context(|| format!("couldn't open {}", path.display()))?;
        let program = assemble(&code)
            .with_context(|| format!("couldn't assemble {}", path.display()))?;
        ram.load_program(&program);
        log::info!("assembled {} bytes from {}", program.len(), path.display());
    }

    let mut core = Core::new(&mut ram);
    if args.run {
        let executed = core.execute_until_halt(args.max_steps);
        log::info!("executed {executed} instructions");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut monitor = Monitor::new(core, stdin.lock(), stdout.lock(), args.max_steps);
    monitor.run().context("monitor I/O failed")?;

    Ok(())
}
