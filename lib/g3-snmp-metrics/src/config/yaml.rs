/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, anyhow};
use regex::Regex;
use yaml_rust::Yaml;

use super::{
    ForcedType, IndexTransform, MetricTagConfig, MetricsConfig, MetricsConfigOption,
    ProfileConfig, SymbolConfig, TagRule, TagSource,
};
use crate::yaml::{self, value as yaml_value};

impl ProfileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let doc = yaml::load_doc(path)?;
        ProfileConfig::parse_yaml(&doc).context(format!("invalid profile file {}", path.display()))
    }

    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'profile' should be 'map'"));
        };

        let mut profile = ProfileConfig::default();
        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "metrics" => {
                profile.metrics = yaml_value::as_list(v, MetricsConfig::parse_yaml)
                    .context(format!("invalid metrics value for key {k}"))?;
                Ok(())
            }
            "metric_tags" => {
                profile.metric_tags = yaml_value::as_list(v, MetricTagConfig::parse_yaml)
                    .context(format!("invalid metric tags value for key {k}"))?;
                Ok(())
            }
            // profile metadata, not used when reporting
            "extends" | "device" | "sysobjectid" => Ok(()),
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(profile)
    }
}

impl MetricsConfigOption {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'options' should be 'map'"));
        };

        let mut options = MetricsConfigOption::default();
        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "placement" => {
                options.placement =
                    yaml_value::as_u32(v).context(format!("invalid u32 value for key {k}"))?;
                Ok(())
            }
            "metric_suffix" => {
                options.metric_suffix = yaml_value::as_string(v)
                    .context(format!("invalid string value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(options)
    }
}

impl MetricsConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'metric' should be 'map'"));
        };

        let mut symbol: Option<SymbolConfig> = None;
        let mut symbols: Option<Vec<SymbolConfig>> = None;
        let mut metric_tags: Option<Yaml> = None;
        let mut forced_type: Option<ForcedType> = None;
        let mut options = MetricsConfigOption::default();

        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "symbol" => {
                let s = SymbolConfig::parse_yaml(v)
                    .context(format!("invalid symbol value for key {k}"))?;
                symbol = Some(s);
                Ok(())
            }
            "symbols" => {
                let list = yaml_value::as_list(v, SymbolConfig::parse_yaml)
                    .context(format!("invalid symbol list value for key {k}"))?;
                symbols = Some(list);
                Ok(())
            }
            "metric_tags" => {
                // the format depends on the metric shape
                metric_tags = Some(v.clone());
                Ok(())
            }
            "forced_type" => {
                // empty value means not set
                if let Yaml::Null = v {
                    return Ok(());
                }
                let s = yaml_value::as_string(v)
                    .context(format!("invalid string value for key {k}"))?;
                if !s.is_empty() {
                    forced_type = Some(ForcedType::from(s.as_str()));
                }
                Ok(())
            }
            "options" => {
                options = MetricsConfigOption::parse_yaml(v)
                    .context(format!("invalid options value for key {k}"))?;
                Ok(())
            }
            "mib" | "table" => Ok(()),
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        let mut config = match (symbol, symbols) {
            (Some(symbol), None) => {
                let tags = match &metric_tags {
                    Some(v) => yaml_value::as_list(v, as_static_tag)
                        .context("invalid static tags value for key metric_tags")?,
                    None => Vec::new(),
                };
                MetricsConfig::scalar(symbol, tags)
            }
            (None, Some(symbols)) => {
                if symbols.is_empty() {
                    return Err(anyhow!("no symbols set for table metric"));
                }
                let metric_tags = match &metric_tags {
                    Some(v) => yaml_value::as_list(v, MetricTagConfig::parse_yaml)
                        .context("invalid row tags value for key metric_tags")?,
                    None => Vec::new(),
                };
                MetricsConfig::column(symbols, metric_tags)
            }
            (Some(_), Some(_)) => {
                return Err(anyhow!("only one of 'symbol' and 'symbols' can be set"));
            }
            (None, None) => return Err(anyhow!("either 'symbol' or 'symbols' should be set")),
        };
        config.forced_type = forced_type;
        config.options = options;
        Ok(config)
    }
}

impl SymbolConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'symbol' should be 'map'"));
        };

        let mut oid: Option<String> = None;
        let mut name: Option<String> = None;
        let mut extract_value: Option<Regex> = None;
        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "oid" => {
                let s = yaml_value::as_string(v)
                    .context(format!("invalid oid value for key {k}"))?;
                oid = Some(s);
                Ok(())
            }
            "name" => {
                let s = yaml_value::as_string(v)
                    .context(format!("invalid string value for key {k}"))?;
                name = Some(s);
                Ok(())
            }
            "extract_value" => {
                let re = yaml_value::as_regex(v)
                    .context(format!("invalid regex value for key {k}"))?;
                extract_value = Some(re);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        let oid = oid.ok_or_else(|| anyhow!("no oid set for symbol"))?;
        let name = name.ok_or_else(|| anyhow!("no name set for symbol {oid}"))?;
        Ok(SymbolConfig {
            oid,
            name,
            extract_value,
        })
    }
}

/// Static tag of a scalar metric, either a plain string or a map with only the `tag` key.
fn as_static_tag(v: &Yaml) -> anyhow::Result<String> {
    let Yaml::Hash(map) = v else {
        return yaml_value::as_string(v);
    };

    let mut tag: Option<String> = None;
    yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
        "tag" => {
            let s = yaml_value::as_string(v)
                .context(format!("invalid string value for key {k}"))?;
            tag = Some(s);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;
    tag.ok_or_else(|| anyhow!("no 'tag' set for static tag"))
}

fn as_index_transform(v: &Yaml) -> anyhow::Result<IndexTransform> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!(
            "yaml value type for 'index transform' should be 'map'"
        ));
    };

    let mut start: Option<usize> = None;
    let mut end: Option<usize> = None;
    yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
        "start" => {
            let i = yaml_value::as_usize(v).context(format!("invalid usize value for key {k}"))?;
            start = Some(i);
            Ok(())
        }
        "end" => {
            let i = yaml_value::as_usize(v).context(format!("invalid usize value for key {k}"))?;
            end = Some(i);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(IndexTransform { start, end }),
        (Some(start), Some(end)) => Err(anyhow!("invalid index transform [{start}, {end}]")),
        _ => Err(anyhow!("both start and end should be set for index transform")),
    }
}

impl MetricTagConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'metric tag' should be 'map'"));
        };

        let mut oid: Option<String> = None;
        let mut symbol: Option<SymbolConfig> = None;
        let mut symbol_name: Option<String> = None;
        let mut column: Option<SymbolConfig> = None;
        let mut index: Option<usize> = None;
        let mut tag: Option<String> = None;
        let mut pattern: Option<Regex> = None;
        let mut tags = BTreeMap::new();
        let mut mapping = BTreeMap::new();
        let mut index_transform = Vec::new();

        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "oid" => {
                let s = yaml_value::as_string(v)
                    .context(format!("invalid oid value for key {k}"))?;
                oid = Some(s);
                Ok(())
            }
            "symbol" => {
                if let Yaml::Hash(_) = v {
                    let s = SymbolConfig::parse_yaml(v)
                        .context(format!("invalid symbol value for key {k}"))?;
                    symbol = Some(s);
                } else {
                    let s = yaml_value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    symbol_name = Some(s);
                }
                Ok(())
            }
            "column" => {
                let s = SymbolConfig::parse_yaml(v)
                    .context(format!("invalid column value for key {k}"))?;
                column = Some(s);
                Ok(())
            }
            "index" => {
                let i = yaml_value::as_usize(v)
                    .context(format!("invalid usize value for key {k}"))?;
                if i == 0 {
                    return Err(anyhow!("the index value should be 1-based"));
                }
                index = Some(i);
                Ok(())
            }
            "tag" => {
                let s = yaml_value::as_string(v)
                    .context(format!("invalid string value for key {k}"))?;
                tag = Some(s);
                Ok(())
            }
            "match" => {
                let re = yaml_value::as_regex(v)
                    .context(format!("invalid regex value for key {k}"))?;
                pattern = Some(re);
                Ok(())
            }
            "tags" => {
                tags = yaml_value::as_string_map(v)
                    .context(format!("invalid string map value for key {k}"))?;
                Ok(())
            }
            "mapping" => {
                mapping = yaml_value::as_string_map(v)
                    .context(format!("invalid string map value for key {k}"))?;
                Ok(())
            }
            "index_transform" => {
                index_transform = yaml_value::as_list(v, as_index_transform)
                    .context(format!("invalid index transform value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        if let Some(oid) = oid {
            if symbol.is_some() {
                return Err(anyhow!("'oid' can not be used together with a symbol map"));
            }
            let name = symbol_name.unwrap_or_else(|| oid.clone());
            symbol = Some(SymbolConfig::new(oid, name));
        } else if symbol_name.is_some() {
            return Err(anyhow!("no oid set for symbol"));
        }

        let source = match (symbol, column, index) {
            (Some(symbol), None, None) => TagSource::Scalar(symbol),
            (None, Some(column), None) => TagSource::Column(column),
            (None, None, Some(index)) => TagSource::Index(index),
            (None, None, None) => {
                return Err(anyhow!(
                    "one of 'oid', 'symbol', 'column' or 'index' should be set"
                ));
            }
            _ => {
                return Err(anyhow!(
                    "only one of 'oid', 'symbol', 'column' or 'index' can be set"
                ));
            }
        };

        let rule = match (tag, pattern) {
            (Some(tag), None) => TagRule::Tag(tag),
            (None, Some(pattern)) => {
                if tags.is_empty() {
                    return Err(anyhow!("no 'tags' set for match pattern {pattern}"));
                }
                TagRule::Match { pattern, tags }
            }
            (Some(_), Some(_)) => return Err(anyhow!("only one of 'tag' and 'match' can be set")),
            (None, None) => return Err(anyhow!("either 'tag' or 'match' should be set")),
        };

        Ok(MetricTagConfig {
            source,
            rule,
            mapping,
            index_transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubmissionType;

    #[test]
    fn parse_profile() {
        let yaml = yaml_doc!(
            r#"
                metrics:
                  - MIB: SNMPv2-MIB
                    symbol:
                      OID: 1.3.6.1.2.1.1.3.0
                      name: sysUpTimeInstance
                    metric_tags:
                      - "source:mib2"
                  - table:
                      OID: 1.3.6.1.2.1.2.2
                      name: ifTable
                    symbols:
                      - OID: 1.3.6.1.2.1.2.2.1.10
                        name: ifInOctets
                      - OID: 1.3.6.1.2.1.2.2.1.16
                        name: ifOutOctets
                    metric_tags:
                      - tag: interface
                        column:
                          OID: 1.3.6.1.2.1.31.1.1.1.1
                          name: ifName
                      - tag: if_index
                        index: 1
                    forced_type: monotonic_count_and_rate
                  - symbol:
                      OID: 1.3.6.1.4.1.9.9.1.0
                      name: fanStatus
                    forced_type: flag_stream
                    options:
                      placement: 2
                      metric_suffix: fan2
                metric_tags:
                  - OID: 1.3.6.1.2.1.1.5.0
                    symbol: sysName
                    tag: snmp_host
            "#
        );
        let profile = ProfileConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(profile.metrics.len(), 3);
        assert_eq!(profile.metric_tags.len(), 1);

        let scalar = &profile.metrics[0];
        assert!(scalar.is_scalar());
        assert_eq!(scalar.symbols()[0].name, "sysUpTimeInstance");
        assert!(scalar.forced_type.is_none());
        let crate::MetricSource::Scalar { tags, .. } = &scalar.source else {
            panic!("not a scalar metric");
        };
        assert_eq!(tags, &vec!["source:mib2".to_string()]);

        let column = &profile.metrics[1];
        assert!(column.is_column());
        assert_eq!(column.symbols().len(), 2);
        assert_eq!(
            column.forced_type,
            Some(ForcedType::Submission(SubmissionType::MonotonicCountAndRate))
        );
        let crate::MetricSource::Column { metric_tags, .. } = &column.source else {
            panic!("not a column metric");
        };
        assert_eq!(metric_tags.len(), 2);
        assert!(matches!(metric_tags[0].source, TagSource::Column(_)));
        assert!(matches!(metric_tags[1].source, TagSource::Index(1)));

        let flag = &profile.metrics[2];
        assert_eq!(flag.forced_type, Some(ForcedType::FlagStream));
        assert_eq!(flag.options.placement, 2);
        assert_eq!(flag.options.metric_suffix, "fan2");

        let TagSource::Scalar(symbol) = &profile.metric_tags[0].source else {
            panic!("not a scalar tag");
        };
        assert_eq!(symbol.oid, "1.3.6.1.2.1.1.5.0");
        assert_eq!(symbol.name, "sysName");
    }

    #[test]
    fn parse_unknown_forced_type() {
        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                forced_type: bogus
            "#
        );
        let config = MetricsConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.forced_type, Some(ForcedType::Unknown("bogus".to_string())));
    }

    #[test]
    fn parse_empty_forced_type() {
        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                forced_type: ""
            "#
        );
        let config = MetricsConfig::parse_yaml(&yaml).unwrap();
        assert!(config.forced_type.is_none());

        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                forced_type:
            "#
        );
        let config = MetricsConfig::parse_yaml(&yaml).unwrap();
        assert!(config.forced_type.is_none());
    }

    #[test]
    fn parse_static_tags() {
        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                metric_tags:
                  - "source:mib2"
                  - tag: "role:core"
            "#
        );
        let config = MetricsConfig::parse_yaml(&yaml).unwrap();
        let crate::MetricSource::Scalar { tags, .. } = &config.source else {
            panic!("not a scalar metric");
        };
        assert_eq!(tags, &vec!["source:mib2".to_string(), "role:core".to_string()]);

        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                metric_tags:
                  - {tag: "role:core", index: 1}
            "#
        );
        assert!(MetricsConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn parse_symbol() {
        let yaml = yaml_doc!(
            r#"
                OID: 1.3.6.1.4.1.2021.10.1.3.1
                name: laLoad1
                extract_value: '(\d+\.\d+)'
            "#
        );
        let symbol = SymbolConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(symbol.oid, "1.3.6.1.4.1.2021.10.1.3.1");
        assert!(symbol.extract_value.unwrap().is_match("load 0.25"));

        let yaml = yaml_doc!("name: laLoad1");
        assert!(SymbolConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("{OID: 1.3.6.1.4.1.2021.10.1.3.1, name: x, extract_value: '('}");
        assert!(SymbolConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn parse_metric_err() {
        let yaml = yaml_doc!("forced_type: gauge");
        assert!(MetricsConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                symbols:
                  - {OID: 1.3.6.1.2.1.2.2.1.10, name: ifInOctets}
            "#
        );
        assert!(MetricsConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("symbols: []");
        assert!(MetricsConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                symbol: {OID: 1.3.6.1.2.1.1.3.0, name: sysUpTime}
                options: {placement: -1}
            "#
        );
        assert!(MetricsConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn parse_metric_tag() {
        let yaml = yaml_doc!(
            r#"
                column: {OID: 1.3.6.1.2.1.2.2.1.2, name: ifDescr}
                match: '(\w+)-(\d+)'
                tags:
                  port_type: '\1'
                  port_id: '\2'
                index_transform:
                  - start: 0
                    end: 1
            "#
        );
        let config = MetricTagConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.index_transform, vec![IndexTransform { start: 0, end: 1 }]);
        assert_eq!(config.rule.get_tags("eth-2"), vec!["port_id:2", "port_type:eth"]);

        let yaml = yaml_doc!(
            r#"
                index: 1
                tag: ip_version
                mapping:
                  1: ipv4
                  2: ipv6
            "#
        );
        let config = MetricTagConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.mapping.get("1").unwrap(), "ipv4");
    }

    #[test]
    fn parse_metric_tag_err() {
        let yaml = yaml_doc!("tag: interface");
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("{index: 0, tag: idx}");
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("{index: 1, OID: 1.3.6.1.2.1.1.5.0, tag: idx}");
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("{index: 1, match: '(.*)'}");
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("{index: 1}");
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("{symbol: sysName, tag: host}");
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                index: 1
                tag: idx
                index_transform:
                  - {start: 2, end: 1}
            "#
        );
        assert!(MetricTagConfig::parse_yaml(&yaml).is_err());
    }
}
