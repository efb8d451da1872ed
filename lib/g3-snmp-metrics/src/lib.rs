/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[macro_use]
mod macros;

mod error;
pub use error::ReportError;

pub mod yaml;

mod value;
pub use value::{ColumnValues, ResultValue, ResultValueStore, SubmissionType, ValueStore};

mod config;
pub use config::{
    ForcedType, IndexTransform, MetricSource, MetricTagConfig, MetricsConfig,
    MetricsConfigOption, ProfileConfig, SymbolConfig, TagRule, TagSource,
};

mod report;
pub use report::{
    DerivedMetric, DerivedMetrics, METRIC_PREFIX, MemorySink, MetricSender, MetricSink,
    NoDerivedMetrics, ServiceCheck, ServiceCheckStatus, Submission, SubmissionKind,
};
