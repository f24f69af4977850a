/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::{FtpSession, file_command_error};
use crate::control::FtpControlChannel;
use crate::error::FtpSessionError;
use crate::{FTP_EVENT_UPLOAD_FINISHED, FtpConnectionProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpTransferOutcome {
    remote_path: String,
    bytes: u64,
}

impl FtpTransferOutcome {
    fn new(remote_path: &str, bytes: u64) -> Self {
        FtpTransferOutcome {
            remote_path: remote_path.to_string(),
            bytes,
        }
    }

    #[inline]
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    #[inline]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl<CP, S, E> FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: Error + Send + Sync + 'static,
{
    /// Store everything `reader` yields at `remote_path`.
    ///
    /// On success the `upload_finished` event is sent to the dispatcher, if any.
    pub async fn upload<R>(
        &self,
        reader: &mut R,
        remote_path: &str,
    ) -> Result<FtpTransferOutcome, FtpSessionError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut control = self.open().await?;
        let r = self.store(&mut control, reader, remote_path).await;
        let bytes = self.finish(control, r).await?;

        crate::log_msg!("uploaded {} bytes to {}", bytes, remote_path);
        self.notify(FTP_EVENT_UPLOAD_FINISHED, remote_path);
        Ok(FtpTransferOutcome::new(remote_path, bytes))
    }

    pub async fn upload_bytes(
        &self,
        data: &[u8],
        remote_path: &str,
    ) -> Result<FtpTransferOutcome, FtpSessionError> {
        let mut reader = data;
        self.upload(&mut reader, remote_path).await
    }

    /// Retrieve `remote_path` and write all of it to `writer`.
    pub async fn download<W>(
        &self,
        remote_path: &str,
        writer: &mut W,
    ) -> Result<FtpTransferOutcome, FtpSessionError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut control = self.open().await?;
        let r = self.retrieve(&mut control, remote_path, writer).await;
        let bytes = self.finish(control, r).await?;

        crate::log_msg!("downloaded {} bytes from {}", bytes, remote_path);
        Ok(FtpTransferOutcome::new(remote_path, bytes))
    }

    pub async fn download_bytes(&self, remote_path: &str) -> Result<Vec<u8>, FtpSessionError> {
        let mut buf = Vec::new();
        self.download(remote_path, &mut buf).await?;
        Ok(buf)
    }

    async fn store<R>(
        &self,
        control: &mut FtpControlChannel<S>,
        reader: &mut R,
        path: &str,
    ) -> Result<u64, FtpSessionError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut data = self.open_data_connection(control).await?;
        control
            .start_store(path)
            .await
            .map_err(|e| file_command_error(e, path, false))?;

        let copy = async {
            let nw = tokio::io::copy(reader, &mut data).await?;
            // the data connection eof marks the end of file
            data.shutdown().await?;
            Ok::<u64, io::Error>(nw)
        };
        let nw = match tokio::time::timeout(self.config.transfer.transfer_timeout, copy).await {
            Ok(Ok(nw)) => nw,
            Ok(Err(e)) => return Err(FtpSessionError::DataTransferFailed(e)),
            Err(_) => return Err(FtpSessionError::TimedOut("store data")),
        };
        drop(data);

        match tokio::time::timeout(self.config.transfer.end_wait_timeout, control.wait_store())
            .await
        {
            Ok(r) => r.map_err(|e| file_command_error(e, path, false))?,
            Err(_) => return Err(FtpSessionError::TimedOut("wait store end reply")),
        }
        Ok(nw)
    }

    async fn retrieve<W>(
        &self,
        control: &mut FtpControlChannel<S>,
        path: &str,
        writer: &mut W,
    ) -> Result<u64, FtpSessionError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut data = self.open_data_connection(control).await?;
        control
            .start_retrieve(path)
            .await
            .map_err(|e| file_command_error(e, path, true))?;

        // the server closes the data connection at the end of file
        let nr = match tokio::time::timeout(
            self.config.transfer.transfer_timeout,
            tokio::io::copy(&mut data, writer),
        )
        .await
        {
            Ok(Ok(nr)) => nr,
            Ok(Err(e)) => return Err(FtpSessionError::DataTransferFailed(e)),
            Err(_) => return Err(FtpSessionError::TimedOut("retrieve data")),
        };
        drop(data);

        match tokio::time::timeout(
            self.config.transfer.end_wait_timeout,
            control.wait_retrieve(),
        )
        .await
        {
            Ok(r) => r.map_err(|e| file_command_error(e, path, true))?,
            Err(_) => return Err(FtpSessionError::TimedOut("wait retrieve end reply")),
        }
        Ok(nr)
    }
}
