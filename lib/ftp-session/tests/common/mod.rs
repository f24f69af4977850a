/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream};

use ftp_session::{
    BoxError, FtpClientConfig, FtpConnectionProvider, FtpControlConfig, FtpEventDispatcher,
    FtpSession, FtpTransferConfig,
};

pub const USERNAME: &str = "u";
pub const PASSWORD: &str = "p";

const PIPE_SIZE: usize = 64 * 1024;
const PASV_PORT_BASE: u16 = 50000;
const STALL_DURATION: Duration = Duration::from_secs(10);

pub type FakeFtpSession = FtpSession<FakeFtpServer, DuplexStream, io::Error>;

#[derive(Default)]
struct ServerState {
    files: Mutex<HashMap<String, Vec<u8>>>,
    pending_data: Mutex<HashMap<u16, DuplexStream>>,
    replies: Mutex<HashMap<&'static str, String>>,
    end_replies: Mutex<HashMap<&'static str, String>>,
    refuse_control: AtomicBool,
    refuse_data: AtomicBool,
    silent: AtomicBool,
    stall_control: AtomicBool,
    stall_data: AtomicBool,
    hold_data_open: AtomicBool,
    withhold_end_reply: AtomicBool,
    next_port: AtomicU16,
    control_connections: AtomicUsize,
    commands: Mutex<Vec<String>>,
}

/// An in-memory ftp server, which is also the connection provider to reach it.
#[derive(Clone, Default)]
pub struct FakeFtpServer {
    state: Arc<ServerState>,
}

impl FakeFtpServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> FakeFtpSession {
        FtpSession::new(self.clone(), Arc::new(test_config()))
    }

    pub fn configured_session(&self) -> FakeFtpSession {
        self.configured_session_with(test_config())
    }

    pub fn configured_session_with(&self, config: FtpClientConfig) -> FakeFtpSession {
        let session = FtpSession::new(self.clone(), Arc::new(config));
        session.configure("ftp.test", USERNAME, PASSWORD);
        session
    }

    pub fn put_file(&self, path: &str, content: &[u8]) {
        let mut files = self.state.files.lock().unwrap();
        files.insert(path.to_string(), content.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.state.files.lock().unwrap();
        files.get(path).cloned()
    }

    /// Reply `reply` to `cmd` instead of running it.
    pub fn set_reply(&self, cmd: &'static str, reply: &str) {
        let mut replies = self.state.replies.lock().unwrap();
        replies.insert(cmd, reply.to_string());
    }

    /// Reply `reply` at the end of the data transfer of `cmd`.
    pub fn set_end_reply(&self, cmd: &'static str, reply: &str) {
        let mut replies = self.state.end_replies.lock().unwrap();
        replies.insert(cmd, reply.to_string());
    }

    pub fn refuse_control(&self) {
        self.state.refuse_control.store(true, Ordering::Relaxed);
    }

    pub fn refuse_data(&self) {
        self.state.refuse_data.store(true, Ordering::Relaxed);
    }

    /// Accept control connections but never greet.
    pub fn stay_silent(&self) {
        self.state.silent.store(true, Ordering::Relaxed);
    }

    /// Never finish the control connect.
    pub fn stall_control(&self) {
        self.state.stall_control.store(true, Ordering::Relaxed);
    }

    /// Never finish the data connect.
    pub fn stall_data(&self) {
        self.state.stall_data.store(true, Ordering::Relaxed);
    }

    /// Keep the data connection of `RETR` open after the file content is sent.
    pub fn hold_data_open(&self) {
        self.state.hold_data_open.store(true, Ordering::Relaxed);
    }

    /// Never send the end reply of `STOR`.
    pub fn withhold_end_reply(&self) {
        self.state.withhold_end_reply.store(true, Ordering::Relaxed);
    }

    pub fn control_connections(&self) -> usize {
        self.state.control_connections.load(Ordering::Relaxed)
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.commands.lock().unwrap().clone()
    }
}

/// Timeouts short enough to be hit by stalled connections.
pub fn short_timeout_config() -> FtpClientConfig {
    FtpClientConfig {
        control: FtpControlConfig {
            command_timeout: Duration::from_millis(500),
            ..Default::default()
        },
        transfer: FtpTransferConfig {
            data_connect_timeout: Duration::from_millis(100),
            transfer_timeout: Duration::from_millis(200),
            end_wait_timeout: Duration::from_millis(200),
        },
        connect_timeout: Duration::from_millis(100),
        greeting_timeout: Duration::from_millis(200),
    }
}

pub fn test_config() -> FtpClientConfig {
    FtpClientConfig {
        control: FtpControlConfig {
            command_timeout: Duration::from_secs(2),
            ..Default::default()
        },
        transfer: FtpTransferConfig {
            data_connect_timeout: Duration::from_secs(1),
            transfer_timeout: Duration::from_secs(5),
            end_wait_timeout: Duration::from_secs(2),
        },
        connect_timeout: Duration::from_secs(1),
        greeting_timeout: Duration::from_millis(200),
    }
}

#[async_trait]
impl FtpConnectionProvider<DuplexStream, io::Error> for FakeFtpServer {
    async fn new_control_connection(&self, host: &str, port: u16) -> io::Result<DuplexStream> {
        self.state.control_connections.fetch_add(1, Ordering::Relaxed);
        if self.state.stall_control.load(Ordering::Relaxed) {
            tokio::time::sleep(STALL_DURATION).await;
        }
        if self.state.refuse_control.load(Ordering::Relaxed) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("connection to {host}:{port} refused"),
            ));
        }

        let (client, server) = tokio::io::duplex(PIPE_SIZE);
        tokio::spawn(serve_control(self.state.clone(), server));
        Ok(client)
    }

    async fn new_data_connection(
        &self,
        _control_peer: Option<IpAddr>,
        server_addr: SocketAddr,
    ) -> io::Result<DuplexStream> {
        if self.state.stall_data.load(Ordering::Relaxed) {
            tokio::time::sleep(STALL_DURATION).await;
        }
        if self.state.refuse_data.load(Ordering::Relaxed) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("connection to {server_addr} refused"),
            ));
        }

        let mut pending = self.state.pending_data.lock().unwrap();
        pending.remove(&server_addr.port()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::ConnectionRefused, "no passive listener")
        })
    }
}

async fn serve_control(state: Arc<ServerState>, stream: DuplexStream) {
    if state.silent.load(Ordering::Relaxed) {
        tokio::time::sleep(STALL_DURATION).await;
        drop(stream);
        return;
    }
    let _ = serve(state, stream).await;
}

async fn serve(state: Arc<ServerState>, stream: DuplexStream) -> io::Result<()> {
    let (rd, mut wr) = tokio::io::split(stream);
    let mut lines = BufReader::new(rd).lines();
    wr.write_all(b"220 fake ftp server ready\r\n").await?;

    let mut username = String::new();
    let mut data: Option<DuplexStream> = None;
    let mut held_data: Option<DuplexStream> = None;
    while let Some(line) = lines.next_line().await? {
        state.commands.lock().unwrap().push(line.clone());
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb.to_string(), arg.to_string()),
            None => (line.clone(), String::new()),
        };

        let replaced = state.replies.lock().unwrap().get(verb.as_str()).cloned();
        if let Some(reply) = replaced {
            wr.write_all(format!("{reply}\r\n").as_bytes()).await?;
            continue;
        }
        let end_reply = |cmd: &str| -> String {
            let replies = state.end_replies.lock().unwrap();
            replies
                .get(cmd)
                .cloned()
                .unwrap_or_else(|| "226 Transfer complete.".to_string())
        };

        let reply = match verb.as_str() {
            "USER" => {
                username = arg;
                "331 Please specify the password.".to_string()
            }
            "PASS" => {
                if username == USERNAME && arg == PASSWORD {
                    "230 Login successful.".to_string()
                } else {
                    "530 Login incorrect.".to_string()
                }
            }
            "TYPE" => "200 Switching to Binary mode.".to_string(),
            "PASV" => {
                let port = PASV_PORT_BASE + state.next_port.fetch_add(1, Ordering::Relaxed);
                let (client, server) = tokio::io::duplex(PIPE_SIZE);
                state.pending_data.lock().unwrap().insert(port, client);
                data = Some(server);
                format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{}).",
                    port >> 8,
                    port & 0xff
                )
            }
            "STOR" => match data.take() {
                Some(mut conn) => {
                    wr.write_all(b"150 Ok to send data.\r\n").await?;
                    let mut content = Vec::new();
                    conn.read_to_end(&mut content).await?;
                    state.files.lock().unwrap().insert(arg, content);
                    if state.withhold_end_reply.load(Ordering::Relaxed) {
                        continue;
                    }
                    end_reply("STOR")
                }
                None => "425 Use PASV first.".to_string(),
            },
            "RETR" => match data.take() {
                Some(mut conn) => {
                    let content = state.files.lock().unwrap().get(&arg).cloned();
                    match content {
                        Some(content) => {
                            wr.write_all(b"150 Opening BINARY mode data connection.\r\n")
                                .await?;
                            conn.write_all(&content).await?;
                            if state.hold_data_open.load(Ordering::Relaxed) {
                                held_data = Some(conn);
                                continue;
                            }
                            conn.shutdown().await?;
                            drop(conn);
                            end_reply("RETR")
                        }
                        None => "550 Failed to open file.".to_string(),
                    }
                }
                None => "425 Use PASV first.".to_string(),
            },
            "DELE" => match state.files.lock().unwrap().remove(&arg) {
                Some(_) => "250 Delete operation successful.".to_string(),
                None => "550 Delete operation failed.".to_string(),
            },
            "SIZE" => match state.files.lock().unwrap().get(&arg) {
                Some(content) => format!("213 {}", content.len()),
                None => "550 Could not get file size.".to_string(),
            },
            "QUIT" => {
                wr.write_all(b"221 Goodbye.\r\n").await?;
                break;
            }
            _ => "502 Command not implemented.".to_string(),
        };
        wr.write_all(format!("{reply}\r\n").as_bytes()).await?;
    }

    drop(held_data);
    wr.shutdown().await
}

#[derive(Default)]
pub struct RecordingDispatcher {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingDispatcher {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }
}

impl FtpEventDispatcher for RecordingDispatcher {
    fn notify(&self, tag: &str, payload: &str) -> Result<(), BoxError> {
        let mut events = self.events.lock().unwrap();
        events.push((tag.to_string(), payload.to_string()));
        Ok(())
    }
}

pub struct FailingDispatcher;

impl FtpEventDispatcher for FailingDispatcher {
    fn notify(&self, _tag: &str, _payload: &str) -> Result<(), BoxError> {
        Err("dispatcher is down".into())
    }
}
