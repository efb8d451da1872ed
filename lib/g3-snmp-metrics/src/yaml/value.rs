/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use regex::Regex;
use yaml_rust::Yaml;

pub fn as_u32(v: &Yaml) -> anyhow::Result<u32> {
    match v {
        Yaml::String(s) => Ok(u32::from_str(s)?),
        Yaml::Integer(i) => Ok(u32::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u32' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for string should be 'string' / 'integer' / 'real'"
        )),
    }
}

pub fn as_regex(v: &Yaml) -> anyhow::Result<Regex> {
    if let Yaml::String(s) = v {
        Regex::new(s).map_err(|e| anyhow!("invalid regex {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'regex' should be 'string'"))
    }
}

pub fn as_list<T, F>(v: &Yaml, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Yaml) -> anyhow::Result<T>,
{
    let mut vec = Vec::new();
    match v {
        Yaml::Array(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let node = convert(v).context(format!("invalid value for list element #{i}"))?;
                vec.push(node);
            }
        }
        _ => {
            let node = convert(v).context("invalid single value for the list")?;
            vec.push(node);
        }
    }
    Ok(vec)
}

/// Parse a map of string keys to string values, keys are kept as is.
pub fn as_string_map(v: &Yaml) -> anyhow::Result<BTreeMap<String, String>> {
    if let Yaml::Hash(map) = v {
        let mut table = BTreeMap::new();
        for (k, v) in map.iter() {
            let key = as_string(k).context("invalid map key")?;
            let value = as_string(v).context(format!("invalid value for key {key}"))?;
            table.insert(key, value);
        }
        Ok(table)
    } else {
        Err(anyhow!("yaml value type for 'string map' should be 'map'"))
    }
}
