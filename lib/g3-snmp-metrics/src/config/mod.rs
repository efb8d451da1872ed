/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::slice;
use std::str::FromStr;

use crate::SubmissionType;

mod symbol;
pub use symbol::SymbolConfig;

mod tag;
pub use tag::{IndexTransform, MetricTagConfig, TagRule, TagSource};

mod yaml;

const FORCED_TYPE_FLAG_STREAM: &str = "flag_stream";

/// The submission type set in config, which overrides the one in the polled value.
///
/// Unknown types are kept as is and rejected when the metric is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForcedType {
    Submission(SubmissionType),
    FlagStream,
    Unknown(String),
}

impl From<&str> for ForcedType {
    fn from(s: &str) -> Self {
        if s == FORCED_TYPE_FLAG_STREAM {
            return ForcedType::FlagStream;
        }
        match SubmissionType::from_str(s) {
            Ok(t) => ForcedType::Submission(t),
            Err(_) => ForcedType::Unknown(s.to_string()),
        }
    }
}

impl fmt::Display for ForcedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForcedType::Submission(t) => f.write_str(t.as_str()),
            ForcedType::FlagStream => f.write_str(FORCED_TYPE_FLAG_STREAM),
            ForcedType::Unknown(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsConfigOption {
    /// 1-based char offset in the flag stream value.
    pub placement: u32,
    pub metric_suffix: String,
}

#[derive(Clone, Debug)]
pub enum MetricSource {
    Scalar {
        symbol: SymbolConfig,
        tags: Vec<String>,
    },
    Column {
        symbols: Vec<SymbolConfig>,
        metric_tags: Vec<MetricTagConfig>,
    },
}

#[derive(Clone, Debug)]
pub struct MetricsConfig {
    pub source: MetricSource,
    pub forced_type: Option<ForcedType>,
    pub options: MetricsConfigOption,
}

impl MetricsConfig {
    pub fn scalar(symbol: SymbolConfig, tags: Vec<String>) -> Self {
        MetricsConfig {
            source: MetricSource::Scalar { symbol, tags },
            forced_type: None,
            options: MetricsConfigOption::default(),
        }
    }

    pub fn column(symbols: Vec<SymbolConfig>, metric_tags: Vec<MetricTagConfig>) -> Self {
        MetricsConfig {
            source: MetricSource::Column {
                symbols,
                metric_tags,
            },
            forced_type: None,
            options: MetricsConfigOption::default(),
        }
    }

    /// Set the forced type, an empty type name leaves it unset.
    pub fn with_forced_type<T: Into<ForcedType>>(mut self, forced_type: T) -> Self {
        self.forced_type = match forced_type.into() {
            ForcedType::Unknown(s) if s.is_empty() => None,
            t => Some(t),
        };
        self
    }

    pub fn with_options(mut self, options: MetricsConfigOption) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self.source, MetricSource::Scalar { .. })
    }

    #[inline]
    pub fn is_column(&self) -> bool {
        matches!(self.source, MetricSource::Column { .. })
    }

    pub fn symbols(&self) -> &[SymbolConfig] {
        match &self.source {
            MetricSource::Scalar { symbol, .. } => slice::from_ref(symbol),
            MetricSource::Column { symbols, .. } => symbols,
        }
    }
}

/// All metrics and global metric tags defined for one kind of device.
#[derive(Clone, Debug, Default)]
pub struct ProfileConfig {
    pub metrics: Vec<MetricsConfig>,
    pub metric_tags: Vec<MetricTagConfig>,
}
