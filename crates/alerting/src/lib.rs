//! Alerting System
//!
//! Turns per-frame detection summaries into a crowd-density level and an alert
//! decision, and delivers alerting decisions to a sink without blocking the
//! frame loop.

mod classifier;
mod dispatcher;
mod sink;
mod table;

pub use classifier::{AlertClassifier, AlertDecision, AlertLevel};
pub use dispatcher::{AlertDispatcher, DEFAULT_QUEUE_CAPACITY};
pub use sink::{AlertSink, CommandSink, LogSink, SinkError};
pub use table::{DensityBand, DensityLevel, DensityTable, TableError};
