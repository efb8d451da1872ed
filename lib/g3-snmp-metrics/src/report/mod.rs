/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod sink;
pub use sink::{
    MemorySink, MetricSink, ServiceCheck, ServiceCheckStatus, Submission, SubmissionKind,
};

mod derived;
pub use derived::{DerivedMetric, DerivedMetrics, NoDerivedMetrics};

mod flag;

mod sender;
pub use sender::{METRIC_PREFIX, MetricSender};
