/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{ResultValue, ResultValueStore, SubmissionType};
use crate::yaml::{self, value as yaml_value};

impl ResultValueStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let doc = yaml::load_doc(path)?;
        ResultValueStore::parse_yaml(&doc)
            .context(format!("invalid value store file {}", path.display()))
    }

    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!(
                "yaml value type for 'value store' should be 'map'"
            ));
        };

        let mut store = ResultValueStore::default();
        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "scalar" | "scalars" => {
                let Yaml::Hash(map) = v else {
                    return Err(anyhow!("yaml value type for key {k} should be 'map'"));
                };
                for (oid, v) in map.iter() {
                    let oid = yaml_value::as_string(oid).context("invalid oid")?;
                    let value =
                        as_result_value(v).context(format!("invalid value for oid {oid}"))?;
                    store.add_scalar_value(oid, value);
                }
                Ok(())
            }
            "column" | "columns" => {
                let Yaml::Hash(map) = v else {
                    return Err(anyhow!("yaml value type for key {k} should be 'map'"));
                };
                for (oid, rows) in map.iter() {
                    let oid = yaml_value::as_string(oid).context("invalid oid")?;
                    let Yaml::Hash(rows) = rows else {
                        return Err(anyhow!("yaml value type for column {oid} should be 'map'"));
                    };
                    for (index, v) in rows.iter() {
                        let index = yaml_value::as_string(index)
                            .context(format!("invalid row index for column {oid}"))?;
                        let value = as_result_value(v)
                            .context(format!("invalid value for column {oid} row {index}"))?;
                        store.add_column_value(oid.as_str(), index, value);
                    }
                }
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(store)
    }
}

fn as_result_value(v: &Yaml) -> anyhow::Result<ResultValue> {
    match v {
        Yaml::Integer(i) => Ok(ResultValue::number(*i as f64)),
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid real value {s}: {e}"))?;
            Ok(ResultValue::number(f))
        }
        Yaml::String(s) => Ok(ResultValue::string(s.as_str())),
        Yaml::Hash(map) => {
            let mut value: Option<ResultValue> = None;
            let mut submission_type: Option<SubmissionType> = None;
            yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
                "value" => {
                    value = Some(as_result_value(v)?);
                    Ok(())
                }
                "hex" => {
                    let s = yaml_value::as_string(v)?;
                    value = Some(ResultValue::opaque(decode_hex(&s)?));
                    Ok(())
                }
                "type" | "submission_type" => {
                    let s = yaml_value::as_string(v)?;
                    submission_type = Some(SubmissionType::from_str(&s)?);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            let value = value.ok_or_else(|| anyhow!("no value set"))?;
            match submission_type {
                Some(t) => Ok(value.with_submission_type(t)),
                None => Ok(value),
            }
        }
        _ => Err(anyhow!(
            "yaml value type for 'result value' should be 'integer' / 'real' / 'string' / 'map'"
        )),
    }
}

fn decode_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return Err(anyhow!("invalid hex string {s}"));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| anyhow!("invalid hex string {s}: {e}"))
        })
        .collect()
}
