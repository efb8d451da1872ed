/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;

use ahash::AHashMap;

use super::ResultValue;
use crate::ReportError;

/// Column values keyed by the full row index, like `1` or `10.1.2`.
pub type ColumnValues = BTreeMap<String, ResultValue>;

/// Read only access to the values polled in one check run.
pub trait ValueStore {
    fn get_scalar_value(&self, oid: &str) -> Result<&ResultValue, ReportError>;
    fn get_column_values(&self, oid: &str) -> Result<&ColumnValues, ReportError>;
}

#[derive(Clone, Debug, Default)]
pub struct ResultValueStore {
    scalar_values: AHashMap<String, ResultValue>,
    column_values: AHashMap<String, ColumnValues>,
}

impl ResultValueStore {
    pub fn add_scalar_value<T: Into<String>>(&mut self, oid: T, value: ResultValue) {
        self.scalar_values.insert(oid.into(), value);
    }

    pub fn add_column_value<T, I>(&mut self, oid: T, index: I, value: ResultValue)
    where
        T: Into<String>,
        I: Into<String>,
    {
        self.column_values
            .entry(oid.into())
            .or_default()
            .insert(index.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.scalar_values.is_empty() && self.column_values.is_empty()
    }
}

impl ValueStore for ResultValueStore {
    fn get_scalar_value(&self, oid: &str) -> Result<&ResultValue, ReportError> {
        self.scalar_values
            .get(oid)
            .ok_or_else(|| ReportError::ValueNotFound(oid.to_string()))
    }

    fn get_column_values(&self, oid: &str) -> Result<&ColumnValues, ReportError> {
        self.column_values
            .get(oid)
            .ok_or_else(|| ReportError::ValueNotFound(oid.to_string()))
    }
}
