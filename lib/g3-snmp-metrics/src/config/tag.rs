/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;

use log::debug;
use regex::Regex;

use super::SymbolConfig;
use crate::ValueStore;

/// Select the index components `[start, end]` (0-based, inclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexTransform {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug)]
pub enum TagSource {
    /// 1-based position in the dot separated row index.
    Index(usize),
    /// Value of another column in the same row.
    Column(SymbolConfig),
    Scalar(SymbolConfig),
}

#[derive(Clone, Debug)]
pub enum TagRule {
    Tag(String),
    Match {
        pattern: Regex,
        tags: BTreeMap<String, String>,
    },
}

impl TagRule {
    pub fn get_tags(&self, value: &str) -> Vec<String> {
        match self {
            TagRule::Tag(name) => vec![format!("{name}:{value}")],
            TagRule::Match { pattern, tags } => {
                let Some(captures) = pattern.captures(value) else {
                    return Vec::new();
                };
                let mut result = Vec::with_capacity(tags.len());
                for (key, template) in tags {
                    let template = normalize_replace_template(template);
                    let mut expanded = String::new();
                    captures.expand(&template, &mut expanded);
                    if expanded.is_empty() {
                        debug!(
                            "pattern `{pattern}` expands `{template}` to empty value for `{value}`"
                        );
                        continue;
                    }
                    result.push(format!("{key}:{expanded}"));
                }
                result
            }
        }
    }
}

/// Convert `\1` style group references to `${1}`.
fn normalize_replace_template(template: &str) -> String {
    let mut s = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            s.push_str("${");
            while let Some(d) = chars.next_if(|c| c.is_ascii_digit()) {
                s.push(d);
            }
            s.push('}');
        } else {
            s.push(c);
        }
    }
    s
}

#[derive(Clone, Debug)]
pub struct MetricTagConfig {
    pub source: TagSource,
    pub rule: TagRule,
    pub mapping: BTreeMap<String, String>,
    pub index_transform: Vec<IndexTransform>,
}

impl MetricTagConfig {
    pub fn new(source: TagSource, rule: TagRule) -> Self {
        MetricTagConfig {
            source,
            rule,
            mapping: BTreeMap::new(),
            index_transform: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: BTreeMap<String, String>) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_index_transform(mut self, index_transform: Vec<IndexTransform>) -> Self {
        self.index_transform = index_transform;
        self
    }

    /// Get tags for the table row at `full_index`.
    pub fn row_tags(&self, full_index: &str, values: &dyn ValueStore) -> Vec<String> {
        let value = match &self.source {
            TagSource::Index(position) => {
                let Some(v) = position
                    .checked_sub(1)
                    .and_then(|i| full_index.split('.').nth(i))
                else {
                    debug!("row tags: index {position} not found in `{full_index}`");
                    return Vec::new();
                };
                v.to_string()
            }
            TagSource::Column(symbol) => {
                let Some(v) = self.column_tag_value(symbol, full_index, values) else {
                    return Vec::new();
                };
                v
            }
            TagSource::Scalar(symbol) => {
                let Some(v) = scalar_tag_value(symbol, values) else {
                    return Vec::new();
                };
                v
            }
        };
        self.map_tags(value)
    }

    /// Get tags from a scalar value, index and column based tags yield nothing here.
    pub fn scalar_tags(&self, values: &dyn ValueStore) -> Vec<String> {
        let TagSource::Scalar(symbol) = &self.source else {
            debug!("scalar tags: tag source {:?} requires a table row", self.source);
            return Vec::new();
        };
        match scalar_tag_value(symbol, values) {
            Some(v) => self.map_tags(v),
            None => Vec::new(),
        }
    }

    fn map_tags(&self, value: String) -> Vec<String> {
        if self.mapping.is_empty() {
            return self.rule.get_tags(&value);
        }
        match self.mapping.get(&value) {
            Some(mapped) => self.rule.get_tags(mapped),
            None => {
                debug!("metric tags: no mapping found for value `{value}`");
                Vec::new()
            }
        }
    }

    fn column_tag_value(
        &self,
        symbol: &SymbolConfig,
        full_index: &str,
        values: &dyn ValueStore,
    ) -> Option<String> {
        let column_values = match values.get_column_values(&symbol.oid) {
            Ok(v) => v,
            Err(e) => {
                debug!("row tags: error getting column value: {e}");
                return None;
            }
        };

        let tag_index = if self.index_transform.is_empty() {
            full_index.to_string()
        } else {
            transform_index(full_index, &self.index_transform)?
        };

        let Some(value) = column_values.get(&tag_index) else {
            debug!("row tags: index `{tag_index}` not found in column {}", symbol.oid);
            return None;
        };
        match value.to_string_value() {
            Ok(s) => Some(s),
            Err(e) => {
                debug!("row tags: error converting value {value} to string: {e}");
                None
            }
        }
    }
}

fn scalar_tag_value(symbol: &SymbolConfig, values: &dyn ValueStore) -> Option<String> {
    let value = match values.get_scalar_value(&symbol.oid) {
        Ok(v) => v,
        Err(e) => {
            debug!("metric tags: error getting scalar value: {e}");
            return None;
        }
    };
    match value.to_string_value() {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("metric tags: error converting value {value} to string: {e}");
            None
        }
    }
}

fn transform_index(full_index: &str, transforms: &[IndexTransform]) -> Option<String> {
    let indexes: Vec<&str> = full_index.split('.').collect();
    let mut selected: Vec<&str> = Vec::with_capacity(indexes.len());
    for t in transforms {
        if t.start > t.end || t.end >= indexes.len() {
            debug!(
                "row tags: index transform [{}, {}] out of range for `{full_index}`",
                t.start, t.end
            );
            return None;
        }
        selected.extend_from_slice(&indexes[t.start..=t.end]);
    }
    Some(selected.join("."))
}
