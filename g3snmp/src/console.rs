/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use log::{info, warn};

use g3_snmp_metrics::{MetricSink, ServiceCheckStatus, SubmissionKind};

/// Print every submission as a single line.
pub(crate) struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub(crate) fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, kind: &str, name: &str, value: &str, hostname: &str, tags: &[String]) {
        let mut line = format!("{kind} {name} {value}");
        if !tags.is_empty() {
            line.push(' ');
            line.push_str(&tags.join(","));
        }
        if !hostname.is_empty() {
            line.push_str(" host=");
            line.push_str(hostname);
        }
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("failed to write {kind} {name}: {e}");
        }
    }

    fn write_metric(
        &mut self,
        kind: SubmissionKind,
        name: &str,
        value: f64,
        hostname: &str,
        tags: Vec<String>,
    ) {
        let mut float_buf = ryu::Buffer::new();
        let value = if value.is_finite() {
            float_buf.format_finite(value)
        } else if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "+Inf"
        } else {
            "-Inf"
        };
        self.write_line(kind.as_str(), name, value, hostname, &tags);
    }
}

impl Default for ConsoleSink<io::Stdout> {
    fn default() -> Self {
        ConsoleSink::new(io::stdout())
    }
}

impl<W: Write> MetricSink for ConsoleSink<W> {
    fn gauge(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        self.write_metric(SubmissionKind::Gauge, name, value, hostname, tags);
    }

    fn rate(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        self.write_metric(SubmissionKind::Rate, name, value, hostname, tags);
    }

    fn monotonic_count(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        self.write_metric(SubmissionKind::MonotonicCount, name, value, hostname, tags);
    }

    fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        hostname: &str,
        tags: Vec<String>,
        message: &str,
    ) {
        self.write_line("service_check", name, status.as_str(), hostname, &tags);
        if !message.is_empty() {
            info!("service check {name}: {message}");
        }
    }
}
