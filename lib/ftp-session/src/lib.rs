/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! A single-session FTP client core.
//!
//! Every operation on [`FtpSession`] opens its own control connection,
//! logs in, negotiates a passive data connection when needed, runs one
//! command and tears everything down again.

mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};

mod io_ext;

mod config;
pub use config::{DEFAULT_FTP_PORT, FtpClientConfig, FtpControlConfig, FtpTransferConfig};

mod error;
pub use error::{
    BoxError, FtpCommandError, FtpErrorKind, FtpRawResponseError, FtpReply, FtpSessionError,
};

mod control;
pub use control::FtpCommand;

mod connection;
pub use connection::{FtpConnectionProvider, TcpConnectionProvider};

mod dispatcher;
pub use dispatcher::{FTP_EVENT_UPLOAD_FINISHED, FtpEventDispatcher, LogEventDispatcher};

mod credential;
pub use credential::{FtpPassword, FtpSessionConfig, SharedFtpSessionConfig};

mod session;
pub use session::{FtpSession, FtpTransferOutcome};
