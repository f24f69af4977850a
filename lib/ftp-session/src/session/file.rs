/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;

use tokio::io::{AsyncRead, AsyncWrite};

use super::{FtpSession, file_command_error};
use crate::FtpConnectionProvider;
use crate::control::FtpCommand;
use crate::error::{FtpCommandError, FtpSessionError};

impl<CP, S, E> FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: Error + Send + Sync + 'static,
{
    /// Delete `remote_path`.
    ///
    /// No data connection is needed, so neither `PASV` is sent nor a data
    /// connection opened. A server with a broken passive mode still serves it.
    pub async fn delete(&self, remote_path: &str) -> Result<(), FtpSessionError> {
        let mut control = self.open().await?;
        let r = control
            .delete_file(remote_path)
            .await
            .map_err(|e| file_command_error(e, remote_path, true));
        self.finish(control, r).await?;

        crate::log_msg!("deleted {}", remote_path);
        Ok(())
    }

    /// Check the existence of `remote_path` with a `SIZE` request.
    ///
    /// Only a `550` reply means the file does not exist, any other failure
    /// is returned as an error. Like [`FtpSession::delete`] this skips the
    /// passive mode setup.
    pub async fn exists(&self, remote_path: &str) -> Result<bool, FtpSessionError> {
        let mut control = self.open().await?;
        let r = match control.request_size(remote_path).await {
            Ok(size) => Ok(size.is_some()),
            // the file is there even if the size can not be parsed
            Err(FtpCommandError::InvalidReplySyntax(FtpCommand::SIZE, reply))
                if reply.code == 213 =>
            {
                Ok(true)
            }
            Err(e) => Err(e.into()),
        };
        self.finish(control, r).await
    }

    /// Get the size of `remote_path`, `None` if it does not exist.
    ///
    /// The passive mode setup is skipped, as for [`FtpSession::delete`].
    pub async fn size(&self, remote_path: &str) -> Result<Option<u64>, FtpSessionError> {
        let mut control = self.open().await?;
        let r = control
            .request_size(remote_path)
            .await
            .map_err(FtpSessionError::from);
        self.finish(control, r).await
    }
}
