pub mod event_ops;
pub mod metric_ops;
