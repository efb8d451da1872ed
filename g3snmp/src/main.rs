/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;
use log::{debug, info, warn};

use g3_snmp_metrics::{
    METRIC_PREFIX, MetricSender, ProfileConfig, ResultValueStore, ServiceCheckStatus,
};

mod console;
use console::ConsoleSink;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_VERBOSE: &str = "verbose";
const GLOBAL_ARG_PROFILE: &str = "profile";
const GLOBAL_ARG_VALUES: &str = "values";
const GLOBAL_ARG_TAG: &str = "tag";
const GLOBAL_ARG_HOSTNAME: &str = "hostname";

const SERVICE_CHECK_NAME: &str = "can_check";

fn build_cli_args() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PROFILE)
                .help("Profile file which contains the metrics config")
                .value_name("PROFILE FILE")
                .long(GLOBAL_ARG_PROFILE)
                .short('p')
                .num_args(1)
                .value_parser(value_parser!(PathBuf))
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VALUES)
                .help("File which contains the polled values")
                .value_name("VALUES FILE")
                .long(GLOBAL_ARG_VALUES)
                .num_args(1)
                .value_parser(value_parser!(PathBuf))
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_TAG)
                .help("Tag added to all metrics, in format <key>:<value>")
                .value_name("TAG")
                .long(GLOBAL_ARG_TAG)
                .short('t')
                .num_args(1)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(GLOBAL_ARG_HOSTNAME)
                .help("Hostname attached to all metrics")
                .value_name("HOSTNAME")
                .long(GLOBAL_ARG_HOSTNAME)
                .num_args(1),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("Show verbose output")
                .action(ArgAction::Count)
                .short('v')
                .long(GLOBAL_ARG_VERBOSE),
        )
}

fn setup_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(verbose > 1)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    setup_logger(args.get_count(GLOBAL_ARG_VERBOSE));
    run(&args)
}

fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let Some(profile_file) = args.get_one::<PathBuf>(GLOBAL_ARG_PROFILE) else {
        unreachable!()
    };
    let Some(values_file) = args.get_one::<PathBuf>(GLOBAL_ARG_VALUES) else {
        unreachable!()
    };

    let profile = ProfileConfig::load(profile_file)
        .context(format!("failed to load profile {}", profile_file.display()))?;
    debug!(
        "loaded {} metrics and {} metric tags from {}",
        profile.metrics.len(),
        profile.metric_tags.len(),
        profile_file.display()
    );
    let values = ResultValueStore::load(values_file)
        .context(format!("failed to load values {}", values_file.display()))?;
    if values.is_empty() {
        warn!("no values found in {}", values_file.display());
    }

    let mut tags: Vec<String> = args
        .get_many::<String>(GLOBAL_ARG_TAG)
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    let mut sender = MetricSender::new(ConsoleSink::default());
    if let Some(hostname) = args.get_one::<String>(GLOBAL_ARG_HOSTNAME) {
        sender = sender.with_hostname(hostname);
    }

    let instance_tags = sender.instance_metric_tags(&profile.metric_tags, &values);
    tags.extend(instance_tags);

    sender.report_metrics(&profile.metrics, &values, &tags);
    sender.service_check(
        &format!("{METRIC_PREFIX}.{SERVICE_CHECK_NAME}"),
        ServiceCheckStatus::Ok,
        &tags,
        "",
    );
    info!("submitted {} metrics", sender.submitted_metrics());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli() {
        build_cli_args().debug_assert();

        let args = build_cli_args()
            .try_get_matches_from([
                "g3snmp", "-p", "a.yaml", "--values", "b.yaml", "-t", "x:1", "-t", "y:2", "-vv",
            ])
            .unwrap();
        let tags: Vec<&String> = args.get_many::<String>(GLOBAL_ARG_TAG).unwrap().collect();
        assert_eq!(tags, ["x:1", "y:2"]);
        assert_eq!(args.get_count(GLOBAL_ARG_VERBOSE), 2);

        assert!(
            build_cli_args()
                .try_get_matches_from(["g3snmp", "-p", "a.yaml"])
                .is_err()
        );
        assert!(
            build_cli_args()
                .try_get_matches_from(["g3snmp", "--completion", "bash"])
                .is_ok()
        );
    }
}
