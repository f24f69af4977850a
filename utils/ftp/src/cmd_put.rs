/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command};
use tokio::fs::File;

use super::CliFtpSession;

pub(super) const COMMAND: &str = "put";

const ARG_LOCAL_FILE: &str = "local-file";
const ARG_REMOTE_PATH: &str = "remote-path";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("upload a local file")
        .arg(
            Arg::new(ARG_LOCAL_FILE)
                .help("local file to upload")
                .num_args(1)
                .value_name("LOCAL FILE")
                .required(true),
        )
        .arg(
            Arg::new(ARG_REMOTE_PATH)
                .help("remote path to store at")
                .num_args(1)
                .value_name("REMOTE PATH")
                .required(true),
        )
}

pub(super) async fn run(session: &CliFtpSession, args: &ArgMatches) -> anyhow::Result<()> {
    let (Some(local), Some(remote)) = (
        args.get_one::<String>(ARG_LOCAL_FILE),
        args.get_one::<String>(ARG_REMOTE_PATH),
    ) else {
        return Err(anyhow!("no local file or remote path set"));
    };

    let mut file = File::open(local)
        .await
        .context(format!("failed to open local file {local}"))?;
    let outcome = session
        .upload(&mut file, remote)
        .await
        .map_err(|e| anyhow!("upload failed ({}): {e}", e.kind()))?;
    println!("{} bytes sent to {}", outcome.bytes(), outcome.remote_path());
    Ok(())
}
