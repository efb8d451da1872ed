/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("value for oid {0} not found")]
    ValueNotFound(String),
    #[error("unable to convert {0} value to string")]
    ConvertToString(&'static str),
    #[error("unable to convert value to float: {0}")]
    ConvertToFloat(String),
    #[error("extract value failed: {0}")]
    ExtractValue(&'static str),
    #[error("flag stream placement {placement} not found in `{value}`")]
    FlagStreamIndex { placement: u32, value: String },
    #[error("unsupported forced type: {0}")]
    UnsupportedType(String),
}
