/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use regex::Regex;

#[derive(Clone, Debug)]
pub struct SymbolConfig {
    pub oid: String,
    pub name: String,
    pub extract_value: Option<Regex>,
}

impl SymbolConfig {
    pub fn new<O, N>(oid: O, name: N) -> Self
    where
        O: Into<String>,
        N: Into<String>,
    {
        SymbolConfig {
            oid: oid.into(),
            name: name.into(),
            extract_value: None,
        }
    }

    pub fn with_extract_value(mut self, pattern: Regex) -> Self {
        self.extract_value = Some(pattern);
        self
    }
}
