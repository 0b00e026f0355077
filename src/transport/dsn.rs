//! Connection descriptor parsing
//!
//! Grammar: `scheme://[user[:pass]@]host[,host2,...][:port][/vhost][?opt=val&...]`.
//! User, password and vhost are percent-decoded. Known options are typed,
//! everything else passes through as a string.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use rand::seq::SliceRandom;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

static DSN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?:(?P<user>[^:@/]*)(?::(?P<pass>[^@/]*))?@)?(?P<hosts>[^:/?]*)(?::(?P<port>\d+))?(?:/(?P<vhost>[^?]*))?(?:\?(?P<query>.*))?$",
    )
    .expect("DSN pattern is a valid regex")
});

const FLOAT_OPTIONS: &[&str] = &["read_timeout", "write_timeout", "heartbeat", "channel_rpc_timeout"];
const BOOL_OPTIONS: &[&str] = &["insist", "keepalive", "shuffle"];

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_VHOST: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum DsnOption {
    Float(f64),
    Bool(bool),
    String(String),
}

impl fmt::Display for DsnOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DsnOption::Float(value) => write!(f, "{value}"),
            DsnOption::Bool(value) => write!(f, "{value}"),
            DsnOption::String(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dsn {
    pub scheme: String,
    /// First host, the one a single-host connection uses
    pub host: String,
    pub hosts: Vec<String>,
    pub port: u16,
    pub vhost: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub options: BTreeMap<String, DsnOption>,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidDsn {
            dsn: dsn.to_string(),
            reason: reason.to_string(),
        };

        let captures = DSN_PATTERN
            .captures(dsn.trim())
            .ok_or_else(|| invalid("does not match scheme://[user[:pass]@]host[:port][/vhost][?options]"))?;

        let scheme = captures["scheme"].to_ascii_lowercase();

        let mut hosts: Vec<String> = captures
            .name("hosts")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(str::to_string)
            .collect();
        if hosts.is_empty() {
            hosts.push(DEFAULT_HOST.to_string());
        }

        let port = match captures.name("port") {
            Some(port) => port
                .as_str()
                .parse::<u16>()
                .map_err(|_| invalid("port is out of range"))?,
            None => default_port(&scheme),
        };

        let vhost = match captures.name("vhost").map(|m| m.as_str()) {
            Some(vhost) if !vhost.is_empty() => decode_component(vhost).ok_or_else(|| invalid("bad escape in vhost"))?,
            _ => DEFAULT_VHOST.to_string(),
        };

        let username = captures
            .name("user")
            .map(|m| decode_component(m.as_str()).ok_or_else(|| invalid("bad escape in username")))
            .transpose()?;
        let password = captures
            .name("pass")
            .map(|m| decode_component(m.as_str()).ok_or_else(|| invalid("bad escape in password")))
            .transpose()?;

        let mut options = BTreeMap::new();
        if let Some(query) = captures.name("query") {
            for pair in query.as_str().split('&').filter(|pair| !pair.is_empty()) {
                let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
                let value = decode_component(raw).ok_or_else(|| invalid("bad escape in option value"))?;
                let option = typed_option(key, &value)
                    .ok_or_else(|| invalid(&format!("option '{key}' has an invalid value '{value}'")))?;
                options.insert(key.to_string(), option);
            }
        }

        Ok(Dsn {
            scheme,
            host: hosts[0].clone(),
            hosts,
            port,
            vhost,
            username,
            password,
            options,
        })
    }

    /// One descriptor per host, options and credentials shared
    pub fn expand(&self) -> Vec<Dsn> {
        self.hosts
            .iter()
            .map(|host| Dsn {
                host: host.clone(),
                hosts: vec![host.clone()],
                ..self.clone()
            })
            .collect()
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn option(&self, name: &str) -> Option<&DsnOption> {
        self.options.get(name)
    }

    pub fn float_option(&self, name: &str) -> Option<f64> {
        match self.options.get(name) {
            Some(DsnOption::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn bool_option(&self, name: &str) -> Option<bool> {
        match self.options.get(name) {
            Some(DsnOption::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Read timeout in seconds from the `read_timeout` option
    pub fn read_timeout(&self) -> Option<Duration> {
        self.float_option("read_timeout")
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Whether hosts should be tried in random order
    pub fn shuffle(&self) -> bool {
        self.bool_option("shuffle").unwrap_or(false)
    }

    /// Randomise the host order in place
    pub fn shuffle_hosts(&mut self) {
        self.hosts.shuffle(&mut rand::thread_rng());
        self.host = self.hosts[0].clone();
    }
}

impl FromStr for Dsn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dsn::parse(s)
    }
}

/// Renders the descriptor with the password masked
impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(username) = &self.username {
            write!(f, "{username}")?;
            if self.password.is_some() {
                write!(f, ":***")?;
            }
            write!(f, "@")?;
        }
        write!(f, "{}:{}", self.hosts.join(","), self.port)?;
        if self.vhost != DEFAULT_VHOST {
            write!(f, "/{}", self.vhost)?;
        }
        Ok(())
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "amqp" => 5672,
        "amqps" => 5671,
        _ => 0,
    }
}

fn typed_option(key: &str, value: &str) -> Option<DsnOption> {
    if FLOAT_OPTIONS.contains(&key) {
        value.parse::<f64>().ok().map(DsnOption::Float)
    } else if BOOL_OPTIONS.contains(&key) {
        match value.to_ascii_lowercase().as_str() {
            "" | "1" | "true" | "yes" | "on" => Some(DsnOption::Bool(true)),
            "0" | "false" | "no" | "off" => Some(DsnOption::Bool(false)),
            _ => None,
        }
    } else {
        Some(DsnOption::String(value.to_string()))
    }
}

/// Percent-decoded component, `None` when the bytes are not UTF-8
fn decode_component(input: &str) -> Option<String> {
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
