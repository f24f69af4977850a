/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;
use tokio::net::TcpStream;
use yaml_rust::YamlLoader;

use ftp_session::{
    DEFAULT_FTP_PORT, FtpClientConfig, FtpSession, FtpSessionConfig, LogEventDispatcher,
    TcpConnectionProvider,
};

mod logger;

type CliFtpSession = FtpSession<TcpConnectionProvider, TcpStream, io::Error>;

mod cmd_del;
mod cmd_exists;
mod cmd_get;
mod cmd_put;
mod cmd_size;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_SOURCE_IP: &str = "source-ip";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("ftp-session")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address, in host[:port] format")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("FTP username")
                .num_args(1)
                .value_name("USERNAME")
                .short('u')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("FTP password")
                .num_args(1)
                .value_name("PASSWORD")
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SOURCE_IP)
                .help("source ip address")
                .num_args(1)
                .value_name("IP ADDRESS")
                .value_parser(value_parser!(IpAddr))
                .long("source")
                .short('s')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("client config file in yaml format")
                .num_args(1)
                .value_name("CONFIG FILE")
                .long("config")
                .short('c')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_put::command())
        .subcommand(cmd_get::command())
        .subcommand(cmd_del::command())
        .subcommand(cmd_exists::command())
        .subcommand(cmd_size::command())
}

/// Split `host[:port]`, ipv6 addresses need to be in brackets if a port is given.
fn parse_server(s: &str) -> anyhow::Result<(String, u16)> {
    if let Some(v) = s.strip_prefix('[') {
        let Some((host, left)) = v.split_once(']') else {
            return Err(anyhow!("no ending ']' found"));
        };
        let port = match left.strip_prefix(':') {
            Some(port) => u16::from_str(port).map_err(|e| anyhow!("invalid port: {e}"))?,
            None if left.is_empty() => DEFAULT_FTP_PORT,
            None => return Err(anyhow!("invalid tail after host: {left}")),
        };
        return Ok((host.to_string(), port));
    }

    match s.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => Ok((s.to_string(), DEFAULT_FTP_PORT)),
        Some((host, port)) => {
            let port = u16::from_str(port).map_err(|e| anyhow!("invalid port: {e}"))?;
            Ok((host.to_string(), port))
        }
        None => Ok((s.to_string(), DEFAULT_FTP_PORT)),
    }
}

fn load_config(path: &str) -> anyhow::Result<FtpClientConfig> {
    let content =
        std::fs::read_to_string(path).context(format!("failed to read config file {path}"))?;
    let docs = YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {path}: {e}"))?;
    match docs.first() {
        Some(doc) => FtpClientConfig::parse_yaml(doc),
        None => Ok(FtpClientConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let logger = logger::SyncLogger::new(verbose_level);
    logger
        .into_global_logger()
        .map_err(|e| anyhow!("failed to set logger: {e}"))?;

    let Some(server) = args.get_one::<String>(GLOBAL_ARG_SERVER) else {
        return Err(anyhow!("no server address set"));
    };
    let (host, port) = parse_server(server).context(format!("invalid server {server}"))?;

    let username = args
        .get_one::<String>(GLOBAL_ARG_USERNAME)
        .map(|s| s.as_str())
        .unwrap_or_default();
    let password = args
        .get_one::<String>(GLOBAL_ARG_PASSWORD)
        .map(|s| s.as_str())
        .unwrap_or_default();
    let mut session_config = FtpSessionConfig::new(&host, username, password);
    session_config.set_port(port);

    let config = match args.get_one::<String>(GLOBAL_ARG_CONFIG) {
        Some(path) => load_config(path)?,
        None => FtpClientConfig::default(),
    };

    let mut conn_provider = TcpConnectionProvider::default();
    if let Some(ip) = args.get_one::<IpAddr>(GLOBAL_ARG_SOURCE_IP) {
        conn_provider.set_bind_ip(*ip);
    }

    let mut session: CliFtpSession = FtpSession::new(conn_provider, Arc::new(config));
    session.set_dispatcher(Arc::new(LogEventDispatcher));
    session.configure_with(session_config);

    if let Some((subcommand, args)) = args.subcommand() {
        match subcommand {
            cmd_put::COMMAND => cmd_put::run(&session, args).await,
            cmd_get::COMMAND => cmd_get::run(&session, args).await,
            cmd_del::COMMAND => cmd_del::run(&session, args).await,
            cmd_exists::COMMAND => cmd_exists::run(&session, args).await,
            cmd_size::COMMAND => cmd_size::run(&session, args).await,
            cmd => Err(anyhow!("invalid subcommand {cmd}")),
        }
    } else {
        Err(anyhow!("no subcommand found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_args() {
        build_cli_args().debug_assert();
    }

    #[test]
    fn server_addr() {
        assert_eq!(
            parse_server("ftp.test").unwrap(),
            ("ftp.test".to_string(), 21)
        );
        assert_eq!(
            parse_server("ftp.test:2121").unwrap(),
            ("ftp.test".to_string(), 2121)
        );
        assert_eq!(
            parse_server("127.0.0.1:21").unwrap(),
            ("127.0.0.1".to_string(), 21)
        );
        assert_eq!(parse_server("::1").unwrap(), ("::1".to_string(), 21));
        assert_eq!(parse_server("[::1]").unwrap(), ("::1".to_string(), 21));
        assert_eq!(
            parse_server("[::1]:2121").unwrap(),
            ("::1".to_string(), 2121)
        );
        assert!(parse_server("ftp.test:port").is_err());
        assert!(parse_server("[::1").is_err());
        assert!(parse_server("[::1]x").is_err());
    }
}
