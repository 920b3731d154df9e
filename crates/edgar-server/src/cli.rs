use clap::{Parser, ValueEnum};
use edgar_spider::sec::client::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use std::time::Duration;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on [default: 127.0.0.1, or 0.0.0.0 with --dev].
    #[arg(long, env = "EDGAR_HOST")]
    pub host: Option<String>,

    #[arg(short, long, env = "EDGAR_PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite database holding `insider_trades`.
    #[arg(long, env = "EDGAR_DATABASE_URL", default_value = "sqlite://insider_trades.db")]
    pub database_url: String,

    /// Sent to the SEC on every request; the SEC asks for a name and contact address.
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Upper bound on each SEC request, in seconds.
    #[arg(
        long,
        env = "EDGAR_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Development mode: listen on all interfaces and log at DEBUG.
    #[arg(long, env = "EDGAR_DEV")]
    pub dev: bool,

    /// Sets the level of tracing.
    #[arg(short, long)]
    pub trace: Option<TraceLevel>,
}

impl Cli {
    pub fn bind_host(&self) -> &str {
        match (&self.host, self.dev) {
            (Some(host), _) => host.as_str(),
            (None, true) => "0.0.0.0",
            (None, false) => "127.0.0.1",
        }
    }

    pub fn level(&self) -> Level {
        match (self.trace, self.dev) {
            (Some(trace_level), _) => trace_level.into(),
            (None, true) => Level::DEBUG,
            (None, false) => Level::INFO,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

impl From<TraceLevel> for Level {
    fn from(trace_level: TraceLevel) -> Self {
        match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        }
    }
}
