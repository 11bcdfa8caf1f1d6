use crate::core::discover::discover;
use crate::core::error::{HistError, Result};
use crate::core::histogram::{Build, FileBuilder};
use crate::core::model::{Dispatch, FailurePolicy, HistogramResult, Source, TotalHistogram};
use crossbeam_channel as channel;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

pub struct RunConfig {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
    pub recursive: bool,
    pub marker: char,
    pub dispatch: Dispatch,
    pub policy: FailurePolicy,
}

/// Called inside the worker for every successful build, before hand-off.
pub type OnResult = Arc<dyn Fn(&HistogramResult) -> Result<()> + Send + Sync>;

type Outcome = Result<HistogramResult>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Enumerating,
    Dispatching,
    Collecting,
    Merged,
    Reported,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Enumerating => "enumerating",
            Phase::Dispatching => "dispatching",
            Phase::Collecting => "collecting",
            Phase::Merged => "merged",
            Phase::Reported => "reported",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct SourceSummary {
    pub source: Source,
    pub distinct: usize,
    pub counted: u64,
}

pub struct RunOutput {
    pub total: TotalHistogram,
    /// Successful sources in arrival order.
    pub sources: Vec<SourceSummary>,
    pub failures: Vec<HistError>,
    pub received: usize,
}

pub fn run(cfg: &RunConfig, on_result: OnResult) -> Result<RunOutput> {
    let t_discover = Instant::now();
    enter(Phase::Enumerating);
    let sources = match discover(&cfg.dir, &cfg.extensions, cfg.recursive) {
        Ok(sources) => sources,
        Err(e) => {
            enter(Phase::Failed);
            return Err(e);
        }
    };
    log_stage("engine.discover", t_discover);
    debug!(
        "found {} source(s) in {}",
        sources.len(),
        cfg.dir.display()
    );

    let builder = Arc::new(FileBuilder::new(cfg.marker));
    aggregate(sources, builder, cfg.dispatch, cfg.policy, on_result)
}

/// Builds every source on worker threads and merges the results as they
/// arrive. Performs exactly `sources.len()` receives.
pub fn aggregate<B>(
    sources: Vec<Source>,
    builder: Arc<B>,
    dispatch: Dispatch,
    policy: FailurePolicy,
    on_result: OnResult,
) -> Result<RunOutput>
where
    B: Build + 'static,
{
    let expected = sources.len();
    let workers = dispatch.workers(expected);

    let t_dispatch = Instant::now();
    enter(Phase::Dispatching);
    let (job_tx, job_rx) = channel::unbounded::<Source>();
    for source in sources {
        let _ = job_tx.send(source);
    }
    drop(job_tx);

    let (result_tx, result_rx) = channel::bounded::<Outcome>(0);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let rx = job_rx.clone();
        let tx = result_tx.clone();
        let builder = Arc::clone(&builder);
        let on_result = Arc::clone(&on_result);
        handles.push(thread::spawn(move || {
            for source in rx.iter() {
                let t_build = Instant::now();
                let outcome = builder.build(&source).and_then(|result| {
                    on_result(&result)?;
                    Ok(result)
                });
                debug!(
                    "built {} in {} ({})",
                    source,
                    fmt_dur(t_build.elapsed()),
                    if outcome.is_ok() { "ok" } else { "failed" }
                );
                if tx.send(outcome).is_err() {
                    break;
                }
            }
        }));
    }
    drop(job_rx);
    drop(result_tx);
    log_stage("engine.dispatch", t_dispatch);
    debug!("dispatched {} source(s) to {} worker(s)", expected, workers);

    let t_collect = Instant::now();
    enter(Phase::Collecting);
    let mut total = TotalHistogram::new();
    let mut summaries = Vec::with_capacity(expected);
    let mut failures = Vec::new();
    let mut received = 0usize;
    let mut wait_time = Duration::ZERO;
    while received < expected {
        let t_wait = Instant::now();
        let outcome = match result_rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => {
                enter(Phase::Failed);
                return Err(HistError::Disconnected { received, expected });
            }
        };
        wait_time += t_wait.elapsed();
        received += 1;
        match outcome {
            Ok(result) => {
                total.absorb(&result);
                summaries.push(SourceSummary {
                    source: result.source,
                    distinct: result.counts.len(),
                    counted: result.counts.total(),
                });
            }
            Err(e) => match policy {
                FailurePolicy::Abort => {
                    error!("aborting after {} of {} results: {}", received, expected, e);
                    enter(Phase::Failed);
                    return Err(e);
                }
                FailurePolicy::Collect => {
                    warn!("{}", e);
                    failures.push(e);
                }
            },
        }
    }
    enter(Phase::Merged);
    log_stage("engine.collect", t_collect);
    debug!("reducer wait={}", fmt_dur(wait_time));

    for handle in handles {
        let _ = handle.join();
    }

    Ok(RunOutput {
        total,
        sources: summaries,
        failures,
        received,
    })
}

pub fn enter(phase: Phase) {
    debug!("phase={}", phase);
}

pub fn log_stage(name: &str, t: Instant) {
    debug!("stage={} time={}", name, fmt_dur(t.elapsed()));
}

pub fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
