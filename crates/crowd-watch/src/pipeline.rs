//! Frame loop: parse, classify, display, alert

use crate::error::AppError;
use crate::records::parse_record;
use alerting::{AlertClassifier, AlertDecision, AlertDispatcher};
use serde::Serialize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, warn};

/// Totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Frames classified
    pub frames: usize,
    /// Frames whose decision called for an alert
    pub alerts: usize,
    /// Alerts the sink played
    pub played: usize,
    /// Lines skipped as malformed or invalid
    pub skipped: usize,
}

/// Per-frame classify → display → alert loop
pub struct FramePipeline {
    classifier: AlertClassifier,
    dispatcher: AlertDispatcher,
    summary: RunSummary,
}

impl FramePipeline {
    pub fn new(classifier: AlertClassifier, dispatcher: AlertDispatcher) -> Self {
        Self {
            classifier,
            dispatcher,
            summary: RunSummary::default(),
        }
    }

    /// Handle one input line. Bad lines are logged and skipped.
    pub fn process_line(&mut self, line_no: usize, line: &str) -> Option<AlertDecision> {
        let summary = match parse_record(line) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Line {}: {}", line_no, e);
                self.summary.skipped += 1;
                return None;
            }
        };

        if summary.is_empty() {
            debug!("Line {}: empty detection summary", line_no);
        } else {
            debug!("Line {}: {} classes reported", line_no, summary.len());
        }

        let decision = match self.classifier.classify(&summary) {
            Ok(decision) => decision,
            Err(e) => {
                error!("Line {}: {}", line_no, e);
                self.summary.skipped += 1;
                return None;
            }
        };

        self.summary.frames += 1;
        metrics::counter!("crowd_watch_frames_total").increment(1);
        info!("Frame {}: {} | {}", line_no, decision.level, decision.message);

        if decision.should_alert {
            self.summary.alerts += 1;
            self.dispatcher.notify(&decision);
        }

        Some(decision)
    }

    /// Run over every line of `reader`, writing each decision as a JSON line
    /// to `out`. Lines that are not UTF-8 are skipped like malformed records.
    /// The dispatcher is shut down once input ends, even on a read error,
    /// so queued alerts still play.
    pub async fn run<R, W>(mut self, reader: R, out: &mut W) -> Result<RunSummary, AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let read_result = self.process_lines(reader, out).await;

        let mut summary = self.summary;
        summary.played = self.dispatcher.shutdown().await;
        info!(
            "Processed {} frames: {} alerts ({} played), {} skipped",
            summary.frames, summary.alerts, summary.played, summary.skipped
        );
        read_result.map(|()| summary)
    }

    async fn process_lines<R, W>(&mut self, mut reader: R, out: &mut W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_no += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!("Line {}: not valid UTF-8: {}", line_no, e);
                    self.summary.skipped += 1;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            if let Some(decision) = self.process_line(line_no, line) {
                serde_json::to_writer(&mut *out, &decision)?;
                writeln!(out)?;
            }
        }

        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{AlertLevel, DensityLevel, LogSink, DEFAULT_QUEUE_CAPACITY};
    use std::sync::Arc;

    fn pipeline() -> FramePipeline {
        FramePipeline::new(
            AlertClassifier::default(),
            AlertDispatcher::spawn(Arc::new(LogSink), DEFAULT_QUEUE_CAPACITY),
        )
    }

    #[tokio::test]
    async fn test_run_counts_frames_and_alerts() {
        let input = b"{\"people\": 5}\n\n{\"people\": 30}\nnot json\n{\"people\": -1}\n{\"violence\": 1}\n";
        let mut out = Vec::new();

        let summary = pipeline().run(&input[..], &mut out).await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                frames: 3,
                alerts: 2,
                played: 2,
                skipped: 2,
            }
        );

        let decisions: Vec<AlertDecision> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(decisions.len(), 3);
        assert_eq!(decisions[0].level, AlertLevel::Density(DensityLevel::Low));
        assert_eq!(decisions[1].level, AlertLevel::Density(DensityLevel::Medium));
        assert_eq!(decisions[2].message, "Violence Detected");
    }

    #[tokio::test]
    async fn test_run_skips_non_utf8_lines() {
        let input = b"{\"people\": 30}\n\xff\xfe\n{\"people\": 75}\n";
        let mut out = Vec::new();

        let summary = pipeline().run(&input[..], &mut out).await.unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.alerts, 2);
        assert_eq!(summary.played, 2);

        let decisions: Vec<AlertDecision> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[1].level, AlertLevel::Density(DensityLevel::High));
    }

    #[tokio::test]
    async fn test_process_line_skips_invalid_input() {
        let mut pipeline = pipeline();
        assert!(pipeline.process_line(1, r#"{"people": -4}"#).is_none());
        let decision = pipeline.process_line(2, "{}").unwrap();
        assert_eq!(decision.message, "No People");
        assert_eq!(pipeline.summary.skipped, 1);
        assert_eq!(pipeline.summary.frames, 1);
    }
}
