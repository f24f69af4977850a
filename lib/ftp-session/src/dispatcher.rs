/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use crate::FTP_DEBUG_LOG_TARGET;
use crate::error::BoxError;

/// Tag of the event emitted after a successful upload, the payload is the remote path.
pub const FTP_EVENT_UPLOAD_FINISHED: &str = "upload_finished";

/// Receiver of one-shot session events.
///
/// Notification is fire-and-forget: a returned error is only logged by the
/// session and never changes the outcome of the operation that emitted it.
pub trait FtpEventDispatcher: Send + Sync {
    fn notify(&self, tag: &str, payload: &str) -> Result<(), BoxError>;
}

pub struct LogEventDispatcher;

impl FtpEventDispatcher for LogEventDispatcher {
    fn notify(&self, tag: &str, payload: &str) -> Result<(), BoxError> {
        log::info!(target: FTP_DEBUG_LOG_TARGET, "event {tag}: {payload}");
        Ok(())
    }
}
