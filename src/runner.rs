use tracing::{error, info, info_span, warn};

use crate::error::Result;
use crate::models::{Output, RunContext};
use crate::publish::publish;
use crate::reader::{read_table, Format};
use crate::routes::{route_for, Route};
use crate::settings::Settings;
use crate::sink::Sink;
use crate::source::Source;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Record a failed file and carry on instead of stopping the run.
    pub keep_going: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows sent per target, in route order.
    Published(Vec<TargetResult>),
    /// No route is registered for the file.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetResult {
    pub destination: &'static str,
    pub range: &'static str,
    pub mode: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file: String,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Published(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Process one routed file: fetch, parse, shape, then publish every target.
fn process(
    source: &dyn Source,
    sink: &mut dyn Sink,
    settings: &Settings,
    ctx: &RunContext,
    name: &str,
    route: &Route,
) -> Result<Vec<TargetResult>> {
    let bytes = source.fetch(name)?;
    let data = read_table(&bytes, Format::from_name(name), route.skip_rows)?;
    info!(rows = data.len(), columns = data.columns.len(), "read");

    let outputs: Vec<Output> = route.transform.apply(&data, ctx);
    let mut results = Vec::with_capacity(route.targets.len());
    for target in route.targets {
        let Some(output) = outputs.iter().find(|o| o.slot == target.slot) else {
            warn!(slot = target.slot, "transform produced no output for target");
            continue;
        };
        let spreadsheet = settings.spreadsheet_id(target.destination);
        let rows = publish(sink, spreadsheet, target, &output.table)?;
        results.push(TargetResult {
            destination: target.destination,
            range: target.range,
            mode: target.mode.label(),
            rows,
        });
    }
    Ok(results)
}

/// Run the weekly batch: every file on the source is routed, shaped and
/// published in name order. Files without a route are skipped.
///
/// Without `keep_going` the first failing file ends the run with its error;
/// files already published stay published.
pub fn run(
    source: &dyn Source,
    sink: &mut dyn Sink,
    settings: &Settings,
    ctx: &RunContext,
    options: RunOptions,
) -> Result<RunSummary> {
    info!(today = %ctx.today, week = %ctx.week_label(), "starting run");
    let mut summary = RunSummary::default();

    for name in source.list()? {
        let Some(route) = route_for(&name) else {
            warn!(file = %name, "no route registered, skipping");
            summary.files.push(FileReport {
                file: name,
                outcome: Outcome::Skipped,
            });
            continue;
        };

        let span = info_span!("file", file = %name, transform = route.transform.key());
        let _guard = span.enter();
        match process(source, sink, settings, ctx, &name, route) {
            Ok(results) => summary.files.push(FileReport {
                file: name,
                outcome: Outcome::Published(results),
            }),
            Err(e) if options.keep_going => {
                error!(error = %e, "file failed, continuing");
                summary.files.push(FileReport {
                    file: name,
                    outcome: Outcome::Failed(e.to_string()),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        published = summary.published(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "run complete"
    );
    Ok(summary)
}
