/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use super::{BoxError, FtpCommandError, FtpRawResponseError, FtpReply};
use crate::control::FtpCommand;

/// Coarse classification of [`FtpSessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FtpErrorKind {
    NotConfigured,
    Connect,
    Auth,
    Protocol,
    DataConnect,
    Transfer,
    NotFound,
    Timeout,
}

impl FtpErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FtpErrorKind::NotConfigured => "NotConfigured",
            FtpErrorKind::Connect => "ConnectError",
            FtpErrorKind::Auth => "AuthError",
            FtpErrorKind::Protocol => "ProtocolError",
            FtpErrorKind::DataConnect => "DataConnectError",
            FtpErrorKind::Transfer => "TransferError",
            FtpErrorKind::NotFound => "NotFound",
            FtpErrorKind::Timeout => "TimeoutError",
        }
    }
}

impl fmt::Display for FtpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FtpSessionError {
    #[error("ftp session is not configured")]
    NotConfigured,
    #[error("failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: BoxError,
    },
    #[error("control connection lost: {0}")]
    ControlConnectionLost(FtpCommandError),
    #[error("service not available: {0}")]
    ServiceNotAvailable(FtpReply),
    #[error("login rejected: {0}")]
    AuthFailed(FtpReply),
    #[error("protocol error: {0}")]
    ProtocolError(FtpCommandError),
    #[error("failed to open data connection to {addr}: {source}")]
    DataConnectFailed {
        addr: SocketAddr,
        #[source]
        source: BoxError,
    },
    #[error("command {0} failed: {1}")]
    TransferFailed(FtpCommand, FtpReply),
    #[error("data transfer failed: {0:?}")]
    DataTransferFailed(io::Error),
    #[error("remote file {path} not found: {reply}")]
    NotFound { path: String, reply: FtpReply },
    #[error("timed out at stage '{0}'")]
    TimedOut(&'static str),
}

impl FtpSessionError {
    pub fn kind(&self) -> FtpErrorKind {
        match self {
            FtpSessionError::NotConfigured => FtpErrorKind::NotConfigured,
            FtpSessionError::ConnectFailed { .. }
            | FtpSessionError::ControlConnectionLost(_)
            | FtpSessionError::ServiceNotAvailable(_) => FtpErrorKind::Connect,
            FtpSessionError::AuthFailed(_) => FtpErrorKind::Auth,
            FtpSessionError::ProtocolError(_) => FtpErrorKind::Protocol,
            FtpSessionError::DataConnectFailed { .. } => FtpErrorKind::DataConnect,
            FtpSessionError::TransferFailed(_, _) | FtpSessionError::DataTransferFailed(_) => {
                FtpErrorKind::Transfer
            }
            FtpSessionError::NotFound { .. } => FtpErrorKind::NotFound,
            FtpSessionError::TimedOut(_) => FtpErrorKind::Timeout,
        }
    }

    /// The server reply that caused this error, if there is one.
    pub fn server_reply(&self) -> Option<&FtpReply> {
        match self {
            FtpSessionError::ServiceNotAvailable(reply)
            | FtpSessionError::AuthFailed(reply)
            | FtpSessionError::TransferFailed(_, reply)
            | FtpSessionError::NotFound { reply, .. } => Some(reply),
            FtpSessionError::ControlConnectionLost(e) | FtpSessionError::ProtocolError(e) => {
                e.reply()
            }
            _ => None,
        }
    }
}

impl From<FtpCommandError> for FtpSessionError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            // a command argument that can not be put on the wire
            FtpCommandError::SendFailed(ref io_err)
                if io_err.kind() == io::ErrorKind::InvalidInput =>
            {
                FtpSessionError::ProtocolError(e)
            }
            FtpCommandError::SendFailed(_) => FtpSessionError::ControlConnectionLost(e),
            FtpCommandError::RecvFailed(e) => match e {
                FtpRawResponseError::ReadResponseTimedOut(stage) => {
                    FtpSessionError::TimedOut(stage)
                }
                FtpRawResponseError::ConnectionClosed | FtpRawResponseError::ReadFailed(_) => {
                    FtpSessionError::ControlConnectionLost(FtpCommandError::RecvFailed(e))
                }
                _ => FtpSessionError::ProtocolError(FtpCommandError::RecvFailed(e)),
            },
            FtpCommandError::ServiceNotAvailable(reply) => {
                FtpSessionError::ServiceNotAvailable(reply)
            }
            _ => FtpSessionError::ProtocolError(e),
        }
    }
}
