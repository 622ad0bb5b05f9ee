use anyhow::{Context, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pairline-server",
    version,
    about = "Rendezvous and signaling relay for 1:1 peer-to-peer sessions"
)]
pub struct ServerArgs {
    /// Address the WebSocket listener binds to.
    #[arg(long, env = "PAIRLINE_LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// Capacity of the router's command mailbox.
    #[arg(long, env = "PAIRLINE_COMMAND_BUFFER", default_value_t = 100)]
    pub command_buffer: usize,

    /// Frames queued per connection before new ones are dropped.
    #[arg(long, env = "PAIRLINE_OUTBOUND_BUFFER", default_value_t = 64)]
    pub outbound_buffer: usize,

    /// Seconds between server pings on idle connections (0 disables). A
    /// connection that sends nothing, not even a pong, for two intervals is
    /// closed.
    #[arg(long, env = "PAIRLINE_PING_INTERVAL_SECS", default_value_t = 20)]
    pub ping_interval_secs: u64,

    /// Largest accepted inbound frame, in bytes.
    #[arg(long, env = "PAIRLINE_MAX_MESSAGE_BYTES", default_value_t = 65_536)]
    pub max_message_bytes: usize,

    /// Put the remaining side of a pairing back into matchmaking when its
    /// partner leaves or disconnects.
    #[arg(long, env = "PAIRLINE_REQUEUE_PARTNERS", default_value_t = false)]
    pub requeue_partners: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "PAIRLINE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen_addr: SocketAddr,
    pub command_buffer: usize,
    pub outbound_buffer: usize,
    pub ping_interval: Option<Duration>,
    pub max_message_bytes: usize,
    pub requeue_partners: bool,
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            command_buffer: 100,
            outbound_buffer: 64,
            ping_interval: Some(Duration::from_secs(20)),
            max_message_bytes: 65_536,
            requeue_partners: false,
            log_level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// Silence after which a connection counts as dead. Only enforced while
    /// pings are enabled, since a quiet but healthy client has nothing else
    /// to send.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.ping_interval.map(|every| every * 2)
    }
}

impl TryFrom<ServerArgs> for RelayConfig {
    type Error = anyhow::Error;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        let listen_addr: SocketAddr = args
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {}", args.listen_addr))?;

        if args.command_buffer == 0 {
            bail!("command buffer must be greater than zero");
        }
        if args.outbound_buffer == 0 {
            bail!("outbound buffer must be greater than zero");
        }
        if args.max_message_bytes == 0 {
            bail!("max message size must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            command_buffer: args.command_buffer,
            outbound_buffer: args.outbound_buffer,
            ping_interval: (args.ping_interval_secs > 0)
                .then(|| Duration::from_secs(args.ping_interval_secs)),
            max_message_bytes: args.max_message_bytes,
            requeue_partners: args.requeue_partners,
            log_level: args.log_level,
        })
    }
}
