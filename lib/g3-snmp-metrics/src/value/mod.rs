/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::ReportError;

mod store;
pub use store::{ColumnValues, ResultValueStore, ValueStore};

mod yaml;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionType {
    Gauge,
    Counter,
    Percent,
    MonotonicCount,
    MonotonicCountAndRate,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Gauge => "gauge",
            SubmissionType::Counter => "counter",
            SubmissionType::Percent => "percent",
            SubmissionType::MonotonicCount => "monotonic_count",
            SubmissionType::MonotonicCountAndRate => "monotonic_count_and_rate",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gauge" => Ok(SubmissionType::Gauge),
            "counter" => Ok(SubmissionType::Counter),
            "percent" => Ok(SubmissionType::Percent),
            "monotonic_count" => Ok(SubmissionType::MonotonicCount),
            "monotonic_count_and_rate" => Ok(SubmissionType::MonotonicCountAndRate),
            _ => Err(ReportError::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum RawValue {
    Number(f64),
    String(String),
    Opaque(Vec<u8>),
}

impl RawValue {
    fn type_name(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Opaque(_) => "opaque",
        }
    }
}

/// A polled value, with the submission type the poller derived from the SNMP value type.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultValue {
    value: RawValue,
    submission_type: Option<SubmissionType>,
}

impl ResultValue {
    pub fn number(v: f64) -> Self {
        ResultValue {
            value: RawValue::Number(v),
            submission_type: None,
        }
    }

    pub fn string<T: Into<String>>(s: T) -> Self {
        ResultValue {
            value: RawValue::String(s.into()),
            submission_type: None,
        }
    }

    pub fn opaque(data: Vec<u8>) -> Self {
        ResultValue {
            value: RawValue::Opaque(data),
            submission_type: None,
        }
    }

    pub fn with_submission_type(mut self, submission_type: SubmissionType) -> Self {
        self.submission_type = Some(submission_type);
        self
    }

    #[inline]
    pub fn submission_type(&self) -> Option<SubmissionType> {
        self.submission_type
    }

    /// Numbers are rendered as integers, as index values and enums are always integral.
    pub fn to_string_value(&self) -> Result<String, ReportError> {
        match &self.value {
            RawValue::Number(f) => Ok((*f as i64).to_string()),
            RawValue::String(s) => Ok(s.clone()),
            v => Err(ReportError::ConvertToString(v.type_name())),
        }
    }

    pub fn to_f64(&self) -> Result<f64, ReportError> {
        match &self.value {
            RawValue::Number(f) => Ok(*f),
            RawValue::String(s) => f64::from_str(s)
                .map_err(|e| ReportError::ConvertToFloat(format!("invalid string `{s}`: {e}"))),
            v => Err(ReportError::ConvertToFloat(format!(
                "invalid type {}",
                v.type_name()
            ))),
        }
    }

    /// Take the first capture group of `pattern` as the new value.
    ///
    /// Only string values are matched, values of other types are returned unchanged.
    pub fn extract_string_value(&self, pattern: &Regex) -> Result<ResultValue, ReportError> {
        let RawValue::String(s) = &self.value else {
            return Ok(self.clone());
        };
        let Some(captures) = pattern.captures(s) else {
            return Err(ReportError::ExtractValue("pattern does not match"));
        };
        let Some(m) = captures.get(1) else {
            return Err(ReportError::ExtractValue(
                "pattern does not contain any matching group",
            ));
        };
        Ok(ResultValue::string(m.as_str()))
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::String(s) => write!(f, "\"{s}\""),
            RawValue::Opaque(data) => write!(f, "<{} bytes>", data.len()),
        }
    }
}
