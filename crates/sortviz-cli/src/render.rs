//! Terminal renderers for the `run` command.

use std::io::{self, Write};

use sortviz_runtime::{Renderer, SessionEvent};

/// Human-readable log of a run: a header, one line per step, progress
/// whenever the whole-number percentage moves, and a summary.
pub struct TextRenderer<W: Write> {
    out: W,
    show_steps: bool,
    last_percent: Option<u8>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, show_steps: bool) -> Self {
        Self {
            out,
            show_steps,
            last_percent: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::Started {
                run,
                algorithm,
                values,
            } => {
                self.last_percent = None;
                writeln!(
                    self.out,
                    "run {run}: {algorithm} ({}) on {} elements",
                    algorithm.complexity(),
                    values.len()
                )?;
                writeln!(self.out, "input: {}", join(values))?;
            }
            SessionEvent::Step { step, .. } if self.show_steps => {
                writeln!(self.out, "  {step}")?;
            }
            SessionEvent::Progress { progress, .. } => {
                let percent = progress.rounded();
                if self.last_percent != Some(percent) {
                    self.last_percent = Some(percent);
                    writeln!(self.out, "[{progress}]")?;
                }
            }
            SessionEvent::Completed(report) => {
                writeln!(
                    self.out,
                    "completed in {} ms: {} total={}",
                    report.elapsed_ms,
                    report.stats,
                    report.stats.total_operations()
                )?;
            }
            SessionEvent::Cancelled { stats, .. } => {
                writeln!(self.out, "cancelled: {stats}")?;
            }
            SessionEvent::Failed { stats, cause, .. } => {
                writeln!(self.out, "failed: {cause} ({stats})")?;
            }
            SessionEvent::Step { .. }
            | SessionEvent::StateChanged { .. }
            | SessionEvent::SequenceReplaced { .. } => {}
        }
        Ok(())
    }
}

/// One JSON object per event, newline separated.
pub struct JsonlRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonlRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonlRenderer<W> {
    fn render(&mut self, event: &SessionEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")
    }
}
