use crate::cli::args::{Cli, Commands, FormatArg, OnErrorArg, RunArgs};
use crate::core::engine::{self, OnResult, Phase, RunConfig};
use crate::core::error::HistError;
use crate::core::model::{Dispatch, FailurePolicy, HistogramResult};
use crate::report::{Format, ReportOptions, Reporter};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    let result = match cli.command {
        Commands::Run(args) => run(args),
    };
    if result.is_err() {
        engine::enter(Phase::Failed);
    }
    result
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(cli.log_level()).into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn run(args: RunArgs) -> Result<()> {
    let t0 = Instant::now();

    if !args.unbounded && args.threads == 0 {
        bail!("--threads must be >= 1");
    }
    if args.extensions.iter().any(|e| e.trim_matches('.').is_empty()) {
        bail!("--ext must not be empty");
    }

    let cfg = RunConfig {
        dir: args.dir.clone(),
        extensions: args.extensions.clone(),
        recursive: args.recursive,
        marker: args.marker,
        dispatch: if args.unbounded {
            Dispatch::PerSource
        } else {
            Dispatch::Bounded(args.threads)
        },
        policy: match args.on_error {
            OnErrorArg::Abort => FailurePolicy::Abort,
            OnErrorArg::Collect => FailurePolicy::Collect,
        },
    };
    let opts = ReportOptions {
        format: match args.format {
            FormatArg::Text => Format::Text,
            FormatArg::Tsv => Format::Tsv,
        },
        sort: args.sort,
    };

    let reporter = Arc::new(Reporter::new(io::stdout(), opts));
    reporter
        .begin()
        .with_context(|| "failed to write report header")?;

    let output = engine::run(&cfg, per_source_reporter(&reporter))
        .with_context(|| format!("histogram run over {} failed", cfg.dir.display()))?;

    let t_report = Instant::now();
    reporter
        .emit(output.total.label(), &output.total.counts)
        .with_context(|| "failed to write totals")?;
    engine::enter(Phase::Reported);
    engine::log_stage("report.totals", t_report);

    info!(
        "{} source(s), {} characters counted, {} distinct, in {}",
        output.sources.len(),
        output.total.counts.total(),
        output.total.counts.len(),
        engine::fmt_dur(t0.elapsed())
    );
    for summary in &output.sources {
        debug!(
            "{}: {} characters, {} distinct",
            summary.source, summary.counted, summary.distinct
        );
    }

    if !output.failures.is_empty() {
        for failure in &output.failures {
            error!("{}", failure);
        }
        bail!(
            "{} of {} source(s) failed",
            output.failures.len(),
            output.received
        );
    }
    engine::enter(Phase::Done);
    Ok(())
}

fn per_source_reporter(reporter: &Arc<Reporter<Stdout>>) -> OnResult {
    let reporter = Arc::clone(reporter);
    Arc::new(move |result: &HistogramResult| {
        let label = result.source.to_string();
        reporter
            .emit(&label, &result.counts)
            .map_err(|source| HistError::Report { label, source })
    })
}
