//! Development server configuration.
//!
//! Resolves the loaded [`NobConfig`] into a bindable address.

use crate::cli::DevArgs;
use crate::config::NobConfig;
use crate::error::{ConfigError, Result, ResultExt};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Development server configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Validated project configuration with a canonical root
    pub config: NobConfig,

    /// Server socket address (IP + port)
    pub addr: SocketAddr,

    /// Open browser automatically on start
    pub open: bool,
}

impl DevConfig {
    /// Create DevConfig from CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails to load or validate, or no
    /// port near the requested one is free
    pub fn from_args(args: &DevArgs) -> Result<Self> {
        let mut config = NobConfig::load(&args.overrides(), args.project.config.as_deref())?;
        config.validate()?;

        config.root = std::fs::canonicalize(&config.root).with_path(&config.root)?;

        let ip = config.host_ip().ok_or_else(|| ConfigError::InvalidValue {
            field: "host".to_string(),
            value: config.host.clone(),
            hint: "Use an IP address or 'localhost'".to_string(),
        })?;
        let addr = Self::find_available_port(ip, config.port)?;

        Ok(Self {
            config,
            addr,
            open: args.open,
        })
    }

    /// Find an available port starting from the requested port.
    ///
    /// Tries the requested port first, then the next ten.
    pub fn find_available_port(ip: IpAddr, requested_port: u16) -> Result<SocketAddr> {
        use std::net::TcpListener;

        if requested_port < 1024 {
            crate::ui::warning(&format!(
                "Port {} is in privileged range, may require root access",
                requested_port
            ));
        }

        let addr = SocketAddr::new(ip, requested_port);
        if TcpListener::bind(addr).is_ok() {
            return Ok(addr);
        }

        for offset in 1..=10 {
            let port = requested_port.saturating_add(offset);
            let addr = SocketAddr::new(ip, port);
            if TcpListener::bind(addr).is_ok() {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
                return Ok(addr);
            }
        }

        Err(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: requested_port.to_string(),
            hint: format!(
                "Ports {}-{} are all in use. Try a different port range.",
                requested_port,
                requested_port.saturating_add(10)
            ),
        }
        .into())
    }

    /// Quiet period before a reload is broadcast.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.debounce_ms)
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        let host = if self.addr.ip().is_unspecified() {
            "localhost".to_string()
        } else {
            self.addr.ip().to_string()
        };
        format!("http://{}:{}", host, self.addr.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpListener};

    fn loopback() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_find_available_port_success() {
        let listener = match TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!(
                    "Skipping test_find_available_port_success: unable to bind socket ({})",
                    err
                );
                return;
            }
        };

        let start_port = listener.local_addr().unwrap().port();
        drop(listener);

        let addr = DevConfig::find_available_port(loopback(), start_port).expect("should find port");
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert!(addr.port() >= start_port);
    }

    #[test]
    fn test_find_available_port_skips_busy_port() {
        let listener = match TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => listener,
            Err(_) => return,
        };
        let busy = listener.local_addr().unwrap().port();
        if busy > u16::MAX - 10 {
            return;
        }

        let addr = DevConfig::find_available_port(loopback(), busy).expect("should find port");
        assert_ne!(addr.port(), busy);
        assert!(addr.port() > busy && addr.port() <= busy + 10);
    }

    #[test]
    fn test_server_url() {
        let config = DevConfig {
            config: NobConfig::default(),
            addr: SocketAddr::new(loopback(), 3000),
            open: false,
        };
        assert_eq!(config.server_url(), "http://127.0.0.1:3000");
        assert_eq!(config.debounce(), Duration::from_millis(1000));

        let any = DevConfig {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000),
            ..config
        };
        assert_eq!(any.server_url(), "http://localhost:3000");
    }
}
