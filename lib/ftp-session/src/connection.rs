/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpSocket, TcpStream};

#[async_trait]
pub trait FtpConnectionProvider<T: AsyncRead + AsyncWrite, E: Error> {
    async fn new_control_connection(&self, host: &str, port: u16) -> Result<T, E>;

    /// The server ip of an established control connection.
    fn control_peer_ip(&self, _stream: &T) -> Option<IpAddr> {
        None
    }

    /// Connect to the pasv endpoint, `control_peer` is the one of the same operation.
    async fn new_data_connection(
        &self,
        control_peer: Option<IpAddr>,
        server_addr: SocketAddr,
    ) -> Result<T, E>;
}

/// Plain TCP connections, optionally bound to a local source ip.
#[derive(Default)]
pub struct TcpConnectionProvider {
    bind_ip: Option<IpAddr>,
}

impl TcpConnectionProvider {
    pub fn set_bind_ip(&mut self, ip: IpAddr) {
        self.bind_ip = Some(ip);
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        if let Some(ip) = self.bind_ip {
            socket.bind(SocketAddr::new(ip, 0))?;
        }
        let stream = socket.connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

#[async_trait]
impl FtpConnectionProvider<TcpStream, io::Error> for TcpConnectionProvider {
    async fn new_control_connection(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let mut err = io::Error::new(io::ErrorKind::AddrNotAvailable, "no addr resolved");
        for addr in tokio::net::lookup_host((host, port)).await? {
            if let Some(bind_ip) = self.bind_ip {
                if bind_ip.is_ipv4() != addr.is_ipv4() {
                    continue;
                }
            }
            match self.connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => err = e,
            }
        }

        Err(err)
    }

    fn control_peer_ip(&self, stream: &TcpStream) -> Option<IpAddr> {
        stream.peer_addr().ok().map(|addr| addr.ip())
    }

    async fn new_data_connection(
        &self,
        control_peer: Option<IpAddr>,
        server_addr: SocketAddr,
    ) -> io::Result<TcpStream> {
        let data_addr = if server_addr.ip().is_unspecified() {
            // some servers behind nat reply 0.0.0.0, use the control peer instead
            match control_peer {
                Some(ip) => SocketAddr::new(ip, server_addr.port()),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::AddrNotAvailable,
                        "no control peer addr found",
                    ));
                }
            }
        } else {
            server_addr
        };
        self.connect(data_addr).await
    }
}
