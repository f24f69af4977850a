/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::control::{FtpAuthStatus, FtpControlChannel};
use crate::error::{FtpCommandError, FtpErrorKind, FtpSessionError};
use crate::{
    FtpClientConfig, FtpConnectionProvider, FtpEventDispatcher, FtpSessionConfig,
    SharedFtpSessionConfig,
};

mod file;
mod transfer;
pub use transfer::FtpTransferOutcome;

/// Entry point of all remote file operations.
///
/// The session itself holds no connection. Each call connects, logs in with
/// the credentials configured at that moment, runs a single command and
/// closes the connections again, so calls may run concurrently.
pub struct FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite,
    E: Error,
{
    config: Arc<FtpClientConfig>,
    credential: SharedFtpSessionConfig,
    provider: CP,
    dispatcher: Option<Arc<dyn FtpEventDispatcher>>,
    phantom: PhantomData<fn() -> (S, E)>,
}

impl<CP, S, E> FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: Error + Send + Sync + 'static,
{
    pub fn new(provider: CP, config: Arc<FtpClientConfig>) -> Self {
        FtpSession::with_session_config(provider, config, SharedFtpSessionConfig::new())
    }

    pub fn with_session_config(
        provider: CP,
        config: Arc<FtpClientConfig>,
        credential: SharedFtpSessionConfig,
    ) -> Self {
        FtpSession {
            config,
            credential,
            provider,
            dispatcher: None,
            phantom: PhantomData,
        }
    }

    pub fn set_dispatcher(&mut self, dispatcher: Arc<dyn FtpEventDispatcher>) {
        self.dispatcher = Some(dispatcher);
    }

    #[inline]
    pub fn session_config(&self) -> &SharedFtpSessionConfig {
        &self.credential
    }

    /// Replace the server and credentials used by all following operations.
    ///
    /// An empty `username` logs in as `anonymous` and an empty `password`
    /// is sent as `anonymous@`. An empty `host` makes every operation fail
    /// with [`FtpSessionError::NotConfigured`].
    pub fn configure(&self, host: &str, username: &str, password: &str) {
        self.credential.configure(host, username, password);
    }

    pub fn configure_with(&self, config: FtpSessionConfig) {
        self.credential.replace(config);
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_configured()
    }

    /// Connect and log in, the returned channel is ready for file commands.
    async fn open(&self) -> Result<FtpControlChannel<S>, FtpSessionError> {
        let Some(credential) = self.credential.snapshot() else {
            return Err(FtpSessionError::NotConfigured);
        };
        if credential.host().is_empty() {
            return Err(FtpSessionError::NotConfigured);
        }

        let host = credential.host();
        let port = credential.port();
        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            self.provider.new_control_connection(host, port),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(FtpSessionError::ConnectFailed {
                    host: host.to_string(),
                    port,
                    source: Box::new(e),
                });
            }
            Err(_) => return Err(FtpSessionError::TimedOut("connect")),
        };
        crate::log_msg!("control connection to {}:{} established", host, port);

        let peer_ip = self.provider.control_peer_ip(&stream);
        let mut control = FtpControlChannel::new(stream, self.config.control);
        control.set_peer_ip(peer_ip);
        match self.login(&mut control, &credential).await {
            Ok(()) => {
                let username = credential.login_username();
                crate::log_msg!("logged in to {}:{} as {}", host, port, username);
                Ok(control)
            }
            Err(e) => self.finish(control, Err(e)).await,
        }
    }

    async fn login(
        &self,
        control: &mut FtpControlChannel<S>,
        credential: &FtpSessionConfig,
    ) -> Result<(), FtpSessionError> {
        let greeting = control.wait_greetings();
        match tokio::time::timeout(self.config.greeting_timeout, greeting).await {
            Ok(r) => r?,
            Err(_) => return Err(FtpSessionError::TimedOut("wait greetings")),
        }

        let status = match control.send_username(credential.login_username()).await? {
            FtpAuthStatus::NeedPassword(_) => {
                control.send_password(credential.login_password()).await?
            }
            status => status,
        };
        match status {
            FtpAuthStatus::LoggedIn => {}
            FtpAuthStatus::NeedPassword(reply) | FtpAuthStatus::Rejected(reply) => {
                return Err(FtpSessionError::AuthFailed(reply));
            }
        }

        control.request_image_type().await?;
        Ok(())
    }

    /// Tear down the control connection, keeping the primary result.
    async fn finish<T>(
        &self,
        mut control: FtpControlChannel<S>,
        r: Result<T, FtpSessionError>,
    ) -> Result<T, FtpSessionError> {
        // no more reply can be expected on a broken, stalled or closing connection
        let send_quit = match &r {
            Ok(_) => true,
            Err(e) => {
                !matches!(e.kind(), FtpErrorKind::Connect | FtpErrorKind::Timeout)
                    && e.server_reply().map(|reply| reply.code) != Some(421)
            }
        };
        if send_quit {
            if let Err(e) = control.send_quit().await {
                log::warn!(target: crate::FTP_DEBUG_LOG_TARGET, "ftp quit failed: {e}");
            }
        }
        if let Err(e) = control.shutdown().await {
            log::warn!(target: crate::FTP_DEBUG_LOG_TARGET, "failed to close control connection: {e}");
        }
        r
    }

    /// Enter passive mode and connect to the advertised data endpoint.
    async fn open_data_connection(
        &self,
        control: &mut FtpControlChannel<S>,
    ) -> Result<S, FtpSessionError> {
        let addr = control.request_pasv_port().await?;
        match tokio::time::timeout(
            self.config.transfer.data_connect_timeout,
            self.provider.new_data_connection(control.peer_ip(), addr),
        )
        .await
        {
            Ok(Ok(stream)) => {
                crate::log_msg!("data connection to {} established", addr);
                Ok(stream)
            }
            Ok(Err(e)) => Err(FtpSessionError::DataConnectFailed {
                addr,
                source: Box::new(e),
            }),
            Err(_) => Err(FtpSessionError::TimedOut("data connect")),
        }
    }

    fn notify(&self, tag: &str, payload: &str) {
        if let Some(dispatcher) = &self.dispatcher {
            if let Err(e) = dispatcher.notify(tag, payload) {
                log::warn!(
                    target: crate::FTP_DEBUG_LOG_TARGET,
                    "failed to dispatch event {tag}: {e}"
                );
            }
        }
    }
}

/// Map the error of a file command, `550` is reported as not found when asked.
fn file_command_error(
    e: FtpCommandError,
    path: &str,
    missing_as_not_found: bool,
) -> FtpSessionError {
    match e {
        FtpCommandError::FileUnavailable(_, reply) if missing_as_not_found => {
            FtpSessionError::NotFound {
                path: path.to_string(),
                reply,
            }
        }
        FtpCommandError::FileUnavailable(cmd, reply)
        | FtpCommandError::UnexpectedReply(cmd, reply) => {
            FtpSessionError::TransferFailed(cmd, reply)
        }
        _ => e.into(),
    }
}
