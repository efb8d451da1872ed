/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::{ForcedType, ResultValue, SymbolConfig, ValueStore};

/// A metric computed from other column values, sent with the tags of the row.
#[derive(Clone, Debug)]
pub struct DerivedMetric {
    pub name: String,
    pub value: ResultValue,
    pub forced_type: Option<ForcedType>,
}

/// Hook called for every table row after the row value has been sent.
pub trait DerivedMetrics {
    fn derive(
        &self,
        symbol: &SymbolConfig,
        full_index: &str,
        values: &dyn ValueStore,
        tags: &[String],
    ) -> Vec<DerivedMetric>;
}

pub struct NoDerivedMetrics;

impl DerivedMetrics for NoDerivedMetrics {
    fn derive(
        &self,
        _symbol: &SymbolConfig,
        _full_index: &str,
        _values: &dyn ValueStore,
        _tags: &[String],
    ) -> Vec<DerivedMetric> {
        Vec::new()
    }
}
