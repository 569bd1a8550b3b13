#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

// The browser build starts from `booknav::web::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::{env, fs, fs::File};

    use anyhow::{Context, Result, bail};
    use log::{error, info};
    use simplelog::{LevelFilter, WriteLogger};

    use booknav::NavConfig;
    use booknav::header_tree::HeaderTree;
    use booknav::panic_handler;
    use booknav::parsing::heading_scanner::HeadingScanner;
    use booknav::render::render_outline;
    use booknav::simulation::{Replay, ScrollTrace};

    const USAGE: &str = "Usage: booknav <page.html> [--config <config.json>] [--trace <trace.json>]";

    struct Args {
        page: String,
        config: Option<String>,
        trace: Option<String>,
    }

    fn parse_args(args: &[String]) -> Result<Args> {
        let mut page = None;
        let mut config = None;
        let mut trace = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => config = Some(iter.next().context(USAGE)?.clone()),
                "--trace" => trace = Some(iter.next().context(USAGE)?.clone()),
                flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
                path if page.is_none() => page = Some(path.to_string()),
                extra => bail!("Unexpected argument {extra}\n{USAGE}"),
            }
        }

        Ok(Args {
            page: page.context(USAGE)?,
            config,
            trace,
        })
    }

    pub fn run() -> Result<()> {
        // Initialize logging with html5ever DEBUG logs filtered out
        WriteLogger::init(
            LevelFilter::Debug,
            simplelog::ConfigBuilder::new()
                .set_max_level(LevelFilter::Debug)
                .add_filter_ignore_str("html5ever")
                .build(),
            File::create("booknav.log")?,
        )?;
        panic_handler::initialize_panic_handler();

        let args: Vec<String> = env::args().skip(1).collect();
        let args = parse_args(&args)?;
        info!("Inspecting {}", args.page);

        let config = NavConfig::load_or_default(args.config.as_deref());
        let headings = HeadingScanner::scan_file(&args.page)?;

        match HeaderTree::build(headings.clone(), config.fold_level) {
            Some(tree) => print!("{}", render_outline(&tree)),
            None => {
                println!("{}: no headings to track", args.page);
                return Ok(());
            }
        }

        let Some(trace_path) = args.trace else {
            return Ok(());
        };
        let content = fs::read_to_string(&trace_path)
            .with_context(|| format!("Failed to read trace {trace_path}"))?;
        let trace = ScrollTrace::from_json(&content)
            .with_context(|| format!("Failed to parse trace {trace_path}"))?;

        let mut replay = Replay::new(config, headings, &trace).inspect_err(|e| {
            error!("Replay setup failed: {e}");
        })?;
        replay.run(&trace.events)?;

        println!();
        for step in replay.steps() {
            println!(
                "{:>6}ms  {:<16} scrollTop={:<8} threshold={:<8} {}{}",
                step.at_ms,
                step.event,
                step.scroll_top,
                step.threshold,
                step.current.as_deref().unwrap_or("-"),
                if step.suppressed { " (suppressed)" } else { "" }
            );
        }
        Ok(())
    }

}
