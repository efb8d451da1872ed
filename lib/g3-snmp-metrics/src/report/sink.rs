/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceCheckStatus {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl ServiceCheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCheckStatus::Ok => "ok",
            ServiceCheckStatus::Warning => "warning",
            ServiceCheckStatus::Critical => "critical",
            ServiceCheckStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metrics backend.
///
/// Tags are passed by value, the caller never touches them after the call.
pub trait MetricSink {
    fn gauge(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>);
    fn rate(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>);
    fn monotonic_count(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>);
    fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        hostname: &str,
        tags: Vec<String>,
        message: &str,
    );
}

impl<S: MetricSink + ?Sized> MetricSink for &mut S {
    fn gauge(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        (**self).gauge(name, value, hostname, tags)
    }

    fn rate(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        (**self).rate(name, value, hostname, tags)
    }

    fn monotonic_count(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        (**self).monotonic_count(name, value, hostname, tags)
    }

    fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        hostname: &str,
        tags: Vec<String>,
        message: &str,
    ) {
        (**self).service_check(name, status, hostname, tags, message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionKind {
    Gauge,
    Rate,
    MonotonicCount,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Gauge => "gauge",
            SubmissionKind::Rate => "rate",
            SubmissionKind::MonotonicCount => "monotonic_count",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub kind: SubmissionKind,
    pub name: String,
    pub value: f64,
    pub hostname: String,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceCheck {
    pub name: String,
    pub status: ServiceCheckStatus,
    pub hostname: String,
    pub tags: Vec<String>,
    pub message: String,
}

/// Keep all submissions in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    submissions: Vec<Submission>,
    service_checks: Vec<ServiceCheck>,
}

impl MemorySink {
    #[inline]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    #[inline]
    pub fn service_checks(&self) -> &[ServiceCheck] {
        &self.service_checks
    }

    pub fn take_submissions(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }

    fn add(
        &mut self,
        kind: SubmissionKind,
        name: &str,
        value: f64,
        hostname: &str,
        tags: Vec<String>,
    ) {
        self.submissions.push(Submission {
            kind,
            name: name.to_string(),
            value,
            hostname: hostname.to_string(),
            tags,
        });
    }
}

impl MetricSink for MemorySink {
    fn gauge(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        self.add(SubmissionKind::Gauge, name, value, hostname, tags);
    }

    fn rate(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        self.add(SubmissionKind::Rate, name, value, hostname, tags);
    }

    fn monotonic_count(&mut self, name: &str, value: f64, hostname: &str, tags: Vec<String>) {
        self.add(SubmissionKind::MonotonicCount, name, value, hostname, tags);
    }

    fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        hostname: &str,
        tags: Vec<String>,
        message: &str,
    ) {
        self.service_checks.push(ServiceCheck {
            name: name.to_string(),
            status,
            hostname: hostname.to_string(),
            tags,
            message: message.to_string(),
        });
    }
}
