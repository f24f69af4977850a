/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::CliFtpSession;

pub(super) const COMMAND: &str = "get";

const ARG_REMOTE_PATH: &str = "remote-path";
const ARG_LOCAL_FILE: &str = "local-file";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("download a remote file")
        .arg(
            Arg::new(ARG_REMOTE_PATH)
                .help("remote file to download")
                .num_args(1)
                .value_name("REMOTE PATH")
                .required(true),
        )
        .arg(
            Arg::new(ARG_LOCAL_FILE)
                .help("local file to save to")
                .num_args(1)
                .value_name("LOCAL FILE")
                .required(true),
        )
}

pub(super) async fn run(session: &CliFtpSession, args: &ArgMatches) -> anyhow::Result<()> {
    let (Some(remote), Some(local)) = (
        args.get_one::<String>(ARG_REMOTE_PATH),
        args.get_one::<String>(ARG_LOCAL_FILE),
    ) else {
        return Err(anyhow!("no remote path or local file set"));
    };

    let mut file = File::create(local)
        .await
        .context(format!("failed to create local file {local}"))?;
    match session.download(remote, &mut file).await {
        Ok(outcome) => {
            file.flush()
                .await
                .context(format!("failed to write local file {local}"))?;
            println!(
                "{} bytes received from {}",
                outcome.bytes(),
                outcome.remote_path()
            );
            Ok(())
        }
        Err(e) => {
            drop(file);
            if let Err(ee) = tokio::fs::remove_file(local).await {
                log::warn!("failed to remove partial file {local}: {ee}");
            }
            Err(anyhow!("download failed ({}): {e}", e.kind()))
        }
    }
}
