mod commands;
mod terminal;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use commands::{CommandLine, Commands, discover, scan, takeover};
use hostmap_core::{Context, NoopMonitor, ProgressMonitor};
use terminal::{input::KeyboardMonitor, logging, print, reporter::TerminalReporter};
use tracing::warn;

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    print::banner(commands.no_banner);

    let cfg = commands.run.to_config()?;
    cfg.validate()?;

    let keyboard = if cfg.disable_input { None } else { KeyboardMonitor::start() };
    let show_tip = keyboard.is_some();
    let monitor: Arc<dyn ProgressMonitor> = match keyboard {
        Some(keyboard) => Arc::new(keyboard),
        None => Arc::new(NoopMonitor),
    };

    let ctx = Context::new(cfg, Arc::new(TerminalReporter), monitor);
    watch_ctrl_c(&ctx);

    let domain = commands.command.domain().to_string();
    match commands.command {
        Commands::Discover { .. } => {
            print::header("getting ready for discovery");
            discover::discover(&ctx, &domain, show_tip).await
        }
        Commands::Scan { .. } => {
            print::header("starting scanner");
            scan::scan(&ctx, &domain, show_tip).await
        }
        Commands::Takeover { .. } => {
            print::header("checking for takeovers");
            takeover::takeover(&ctx, &domain, show_tip).await
        }
    }
}

/// First Ctrl-C winds the run down gracefully, a second one exits.
fn watch_ctrl_c(ctx: &Context) {
    let stop = ctx.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        stop.store(true, Ordering::SeqCst);
        warn!("Interrupted, waiting for running tasks to finish (Ctrl-C again to quit)");

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}
