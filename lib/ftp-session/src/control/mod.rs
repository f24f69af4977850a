/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

use crate::FtpControlConfig;
use crate::error::{FtpCommandError, FtpReply};

mod response;

mod command;
pub use command::FtpCommand;

#[derive(Debug)]
pub(crate) enum FtpAuthStatus {
    LoggedIn,
    NeedPassword(FtpReply),
    Rejected(FtpReply),
}

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
    peer_ip: Option<IpAddr>,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
            peer_ip: None,
        }
    }

    pub(crate) fn set_peer_ip(&mut self, ip: Option<IpAddr>) {
        self.peer_ip = ip;
    }

    #[inline]
    pub(crate) fn peer_ip(&self) -> Option<IpAddr> {
        self.peer_ip
    }

    pub(crate) async fn shutdown(mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_raw_response().await?;
            match reply.code() {
                120 => {}
                220 => return Ok(()),
                421 => return Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
                _ => {
                    return Err(FtpCommandError::UnexpectedReply(
                        FtpCommand::GREETING,
                        reply.to_reply(),
                    ));
                }
            }
        }
    }

    pub(crate) async fn send_username(
        &mut self,
        username: &str,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        self.send_cmd1(FtpCommand::USER, username)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send username").await?;
        match reply.code() {
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword(reply.to_reply())),
            // 332 need account is not supported, 421 is a rejection as well
            _ => Ok(FtpAuthStatus::Rejected(reply.to_reply())),
        }
    }

    pub(crate) async fn send_password(
        &mut self,
        password: &str,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        self.send_cmd1(FtpCommand::PASS, password)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send password").await?;
        match reply.code() {
            // 202 means the password is superfluous
            202 | 230 => Ok(FtpAuthStatus::LoggedIn),
            _ => Ok(FtpAuthStatus::Rejected(reply.to_reply())),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::QUIT;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send quit").await?;
        match reply.code() {
            221 => Ok(()),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn request_image_type(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::TYPE_I;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request transfer type").await?;
        match reply.code() {
            200 => Ok(()),
            421 => Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request pasv port").await?;
        match reply.code() {
            227 => match reply.parse_pasv_227_reply() {
                Some(addr) => Ok(addr),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, reply.to_reply())),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn delete_file(&mut self, path: &str) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::DELE;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("delete file").await?;
        match reply.code() {
            250 => Ok(()),
            550 => Err(FtpCommandError::FileUnavailable(cmd, reply.to_reply())),
            421 => Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn request_size(
        &mut self,
        path: &str,
    ) -> Result<Option<u64>, FtpCommandError> {
        let cmd = FtpCommand::SIZE;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request size").await?;
        match reply.code() {
            550 => Ok(None),
            213 => {
                let size = reply
                    .line_trimmed()
                    .and_then(|s| u64::from_str(s).ok())
                    .ok_or_else(|| FtpCommandError::InvalidReplySyntax(cmd, reply.to_reply()))?;
                Ok(Some(size))
            }
            421 => Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn start_retrieve(&mut self, path: &str) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::RETR;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("start retrieve").await?;
        match reply.code() {
            125 | 150 => Ok(()),
            550 => Err(FtpCommandError::FileUnavailable(cmd, reply.to_reply())),
            421 => Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn wait_retrieve(&mut self) -> Result<(), FtpCommandError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            226 | 250 => Ok(()),
            _ => Err(FtpCommandError::UnexpectedReply(
                FtpCommand::RETR,
                reply.to_reply(),
            )),
        }
    }

    pub(crate) async fn start_store(&mut self, path: &str) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::STOR;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("start store").await?;
        match reply.code() {
            125 | 150 => Ok(()),
            450 | 550 => Err(FtpCommandError::FileUnavailable(cmd, reply.to_reply())),
            421 => Err(FtpCommandError::ServiceNotAvailable(reply.to_reply())),
            _ => Err(FtpCommandError::UnexpectedReply(cmd, reply.to_reply())),
        }
    }

    pub(crate) async fn wait_store(&mut self) -> Result<(), FtpCommandError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            226 | 250 => Ok(()),
            _ => Err(FtpCommandError::UnexpectedReply(
                FtpCommand::STOR,
                reply.to_reply(),
            )),
        }
    }
}
