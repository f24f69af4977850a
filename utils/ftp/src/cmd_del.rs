/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use super::CliFtpSession;

pub(super) const COMMAND: &str = "del";

const ARG_REMOTE_PATH: &str = "remote-path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("delete a remote file").arg(
        Arg::new(ARG_REMOTE_PATH)
            .num_args(1)
            .value_name("REMOTE PATH")
            .required(true),
    )
}

pub(super) async fn run(session: &CliFtpSession, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(remote) = args.get_one::<String>(ARG_REMOTE_PATH) else {
        return Err(anyhow!("no remote path set"));
    };

    session
        .delete(remote)
        .await
        .map_err(|e| anyhow!("delete failed ({}): {e}", e.kind()))
}
