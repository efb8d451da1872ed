/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use ahash::AHashMap;
use log::debug;
use regex::Regex;

use super::flag::flag_stream_value;
use super::{DerivedMetrics, MetricSink, NoDerivedMetrics, ServiceCheckStatus};
use crate::{
    ForcedType, MetricSource, MetricTagConfig, MetricsConfig, MetricsConfigOption, ReportError,
    ResultValue, SubmissionType, SymbolConfig, ValueStore,
};

pub const METRIC_PREFIX: &str = "snmp";
const RATE_SUFFIX: &str = "rate";

struct MetricSample<'a> {
    name: &'a str,
    value: &'a ResultValue,
    tags: &'a [String],
    forced_type: Option<&'a ForcedType>,
    options: &'a MetricsConfigOption,
    extract_value: Option<&'a Regex>,
}

/// Turn polled values into metrics, as described by the metrics config.
///
/// One sender should be used for one device, and it should not be shared by concurrent check runs.
pub struct MetricSender<S> {
    sink: S,
    hostname: String,
    derived: Box<dyn DerivedMetrics>,
    submitted_metrics: usize,
}

impl<S: MetricSink> MetricSender<S> {
    pub fn new(sink: S) -> Self {
        MetricSender {
            sink,
            hostname: String::new(),
            derived: Box::new(NoDerivedMetrics),
            submitted_metrics: 0,
        }
    }

    pub fn with_hostname<T: Into<String>>(mut self, hostname: T) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_derived_metrics(mut self, derived: Box<dyn DerivedMetrics>) -> Self {
        self.derived = derived;
        self
    }

    #[inline]
    pub fn submitted_metrics(&self) -> usize {
        self.submitted_metrics
    }

    pub fn reset_submitted_metrics(&mut self) {
        self.submitted_metrics = 0;
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Send all metrics found in `values`.
    ///
    /// Metrics with missing or invalid values are skipped, and no error will be returned.
    pub fn report_metrics(
        &mut self,
        metrics: &[MetricsConfig],
        values: &dyn ValueStore,
        tags: &[String],
    ) {
        for metric in metrics {
            match &metric.source {
                MetricSource::Scalar {
                    symbol,
                    tags: symbol_tags,
                } => self.report_scalar_metric(metric, symbol, symbol_tags, values, tags),
                MetricSource::Column {
                    symbols,
                    metric_tags,
                } => self.report_column_metric(metric, symbols, metric_tags, values, tags),
            }
        }
    }

    /// Get the device level tags from scalar values.
    pub fn instance_metric_tags(
        &self,
        metric_tags: &[MetricTagConfig],
        values: &dyn ValueStore,
    ) -> Vec<String> {
        let mut global_tags = Vec::new();
        for metric_tag in metric_tags {
            global_tags.extend(metric_tag.scalar_tags(values));
        }
        global_tags
    }

    fn report_scalar_metric(
        &mut self,
        metric: &MetricsConfig,
        symbol: &SymbolConfig,
        symbol_tags: &[String],
        values: &dyn ValueStore,
        tags: &[String],
    ) {
        let value = match values.get_scalar_value(&symbol.oid) {
            Ok(v) => v,
            Err(e) => {
                debug!("report scalar: error getting scalar value: {e}");
                return;
            }
        };

        let mut scalar_tags = Vec::with_capacity(tags.len() + symbol_tags.len());
        scalar_tags.extend_from_slice(tags);
        scalar_tags.extend_from_slice(symbol_tags);
        self.send_sample(MetricSample {
            name: &symbol.name,
            value,
            tags: &scalar_tags,
            forced_type: metric.forced_type.as_ref(),
            options: &metric.options,
            extract_value: symbol.extract_value.as_ref(),
        });
    }

    fn report_column_metric(
        &mut self,
        metric: &MetricsConfig,
        symbols: &[SymbolConfig],
        metric_tags: &[MetricTagConfig],
        values: &dyn ValueStore,
        tags: &[String],
    ) {
        // rows of different symbols in the same table share the same tags
        let mut row_tags_cache: AHashMap<&str, Vec<String>> = AHashMap::new();

        for symbol in symbols {
            let column_values = match values.get_column_values(&symbol.oid) {
                Ok(v) => v,
                Err(e) => {
                    debug!("report column: error getting column value: {e}");
                    continue;
                }
            };

            for (full_index, value) in column_values {
                let row_tags: &[String] = row_tags_cache
                    .entry(full_index.as_str())
                    .or_insert_with(|| {
                        let mut row_tags = tags.to_vec();
                        for metric_tag in metric_tags {
                            row_tags.extend(metric_tag.row_tags(full_index, values));
                        }
                        debug!("report column: caching tags {row_tags:?} for index `{full_index}`");
                        row_tags
                    });

                self.send_sample(MetricSample {
                    name: &symbol.name,
                    value,
                    tags: row_tags,
                    forced_type: metric.forced_type.as_ref(),
                    options: &metric.options,
                    extract_value: symbol.extract_value.as_ref(),
                });
                self.send_derived_metrics(symbol, full_index, values, row_tags);
            }
        }
    }

    fn send_derived_metrics(
        &mut self,
        symbol: &SymbolConfig,
        full_index: &str,
        values: &dyn ValueStore,
        row_tags: &[String],
    ) {
        let derived = self.derived.derive(symbol, full_index, values, row_tags);
        if derived.is_empty() {
            return;
        }

        let options = MetricsConfigOption::default();
        for metric in &derived {
            self.send_sample(MetricSample {
                name: &metric.name,
                value: &metric.value,
                tags: row_tags,
                forced_type: metric.forced_type.as_ref(),
                options: &options,
                extract_value: None,
            });
        }
    }

    fn send_sample(&mut self, sample: MetricSample<'_>) {
        if let Err(e) = self.send_metric(&sample) {
            debug!(
                "metric `{METRIC_PREFIX}.{}` with value {}: {e}",
                sample.name, sample.value
            );
        }
    }

    fn send_metric(&mut self, sample: &MetricSample<'_>) -> Result<(), ReportError> {
        let extracted;
        let value = match sample.extract_value {
            Some(pattern) => {
                extracted = sample.value.extract_string_value(pattern)?;
                &extracted
            }
            None => sample.value,
        };

        let mut full_name = format!("{METRIC_PREFIX}.{}", sample.name);
        let (submission_type, float_value) = match sample.forced_type {
            None => {
                let submission_type = value.submission_type().unwrap_or(SubmissionType::Gauge);
                (submission_type, value.to_f64()?)
            }
            Some(ForcedType::Submission(submission_type)) => (*submission_type, value.to_f64()?),
            Some(ForcedType::FlagStream) => {
                let s = value.to_string_value()?;
                let flag = flag_stream_value(sample.options.placement, &s)?;
                full_name.push('.');
                full_name.push_str(&sample.options.metric_suffix);
                (SubmissionType::Gauge, flag)
            }
            Some(ForcedType::Unknown(s)) => return Err(ReportError::UnsupportedType(s.clone())),
        };

        match submission_type {
            SubmissionType::Gauge => {
                self.gauge(&full_name, float_value, sample.tags);
                self.submitted_metrics += 1;
            }
            SubmissionType::Counter => {
                self.rate(&full_name, float_value, sample.tags);
                self.submitted_metrics += 1;
            }
            SubmissionType::Percent => {
                self.rate(&full_name, float_value * 100.0, sample.tags);
                self.submitted_metrics += 1;
            }
            SubmissionType::MonotonicCount => {
                self.monotonic_count(&full_name, float_value, sample.tags);
                self.submitted_metrics += 1;
            }
            SubmissionType::MonotonicCountAndRate => {
                self.monotonic_count(&full_name, float_value, sample.tags);
                let rate_name = format!("{full_name}.{RATE_SUFFIX}");
                self.rate(&rate_name, float_value, sample.tags);
                self.submitted_metrics += 2;
            }
        }
        Ok(())
    }

    pub fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.sink.gauge(name, value, &self.hostname, tags.to_vec());
    }

    pub fn rate(&mut self, name: &str, value: f64, tags: &[String]) {
        self.sink.rate(name, value, &self.hostname, tags.to_vec());
    }

    pub fn monotonic_count(&mut self, name: &str, value: f64, tags: &[String]) {
        self.sink
            .monotonic_count(name, value, &self.hostname, tags.to_vec());
    }

    pub fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        tags: &[String],
        message: &str,
    ) {
        self.sink
            .service_check(name, status, &self.hostname, tags.to_vec(), message);
    }
}
