use std::path::PathBuf;

use clap::Parser;

/// termcanvas: a shared drawing canvas synced over TCP.
#[derive(Parser, Debug)]
#[command(name = "termcanvas", version, about)]
pub struct Args {
    /// Host a session and accept peers.
    #[arg(long, conflicts_with = "connect")]
    pub host: bool,

    /// Join the session hosted at this address (`host` or `host:port`).
    #[arg(long, value_name = "ADDRESS")]
    pub connect: Option<String>,

    /// Port override for hosting and connecting.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log directive override, e.g. `debug` or `termcanvas_relay=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Save a non-empty drawing to this file on quit.
    #[arg(long, value_name = "PATH")]
    pub save_on_exit: Option<PathBuf>,
}

/// How this process takes part in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Offline,
    Host,
    Connect(String),
}

impl Args {
    pub fn mode(&self) -> Mode {
        match (&self.connect, self.host) {
            (Some(address), _) => Mode::Connect(address.clone()),
            (None, true) => Mode::Host,
            (None, false) => Mode::Offline,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("termcanvas").chain(argv.iter().copied()))
    }

    #[test]
    fn no_flags_means_offline() {
        assert_eq!(args(&[]).unwrap().mode(), Mode::Offline);
    }

    #[test]
    fn host_and_connect_modes() {
        assert_eq!(args(&["--host"]).unwrap().mode(), Mode::Host);
        assert_eq!(
            args(&["--connect", "10.0.0.2"]).unwrap().mode(),
            Mode::Connect("10.0.0.2".into())
        );
    }

    #[test]
    fn host_conflicts_with_connect() {
        assert!(args(&["--host", "--connect", "10.0.0.2"]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let a = args(&["--host", "-p", "7000", "--save-on-exit", "out.csv"]).unwrap();
        assert_eq!(a.port, Some(7000));
        assert_eq!(a.save_on_exit, Some(PathBuf::from("out.csv")));
    }
}
