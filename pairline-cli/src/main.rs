use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use futures::{SinkExt, StreamExt};
use pairline_core::Envelope;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Parser)]
#[command(name = "pairline", version, about = "Probe and smoke-test a pairline relay")]
struct Cli {
    /// Relay WebSocket endpoint.
    #[arg(short, long, global = true, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join matchmaking and print every envelope the relay delivers.
    Probe {
        /// Reply to start_offer and offer with placeholder payloads.
        #[arg(long)]
        negotiate: bool,

        /// Send ready again whenever the partner leaves.
        #[arg(long)]
        requeue: bool,

        /// Stop after this many seconds instead of running until the relay
        /// closes the connection.
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Pair two fresh connections and run one offer/answer/candidate/leave
    /// exchange through the relay. Run it against an otherwise idle relay:
    /// a stranger waiting in the pool would be paired instead.
    Smoke {
        /// Seconds to wait for each expected envelope.
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Probe {
            negotiate,
            requeue,
            duration_secs,
        } => run_probe(&cli.url, negotiate, requeue, duration_secs.map(Duration::from_secs)).await,
        Commands::Smoke { timeout_secs } => {
            run_smoke(&cli.url, Duration::from_secs(timeout_secs)).await
        }
    }
}

async fn run_probe(
    url: &str,
    negotiate: bool,
    requeue: bool,
    duration: Option<Duration>,
) -> Result<()> {
    let mut socket = connect(url).await?;
    println!("{} {}", "Connected to".green().bold(), url);

    send(&mut socket, &Envelope::Ready).await?;
    println!("{} ready", "→".cyan());

    let deadline = duration.map(|d| Instant::now() + d);

    loop {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline, next_envelope(&mut socket)).await {
                Ok(next) => next?,
                Err(_) => {
                    println!("{}", "Probe duration elapsed".yellow());
                    break;
                }
            },
            None => next_envelope(&mut socket).await?,
        };

        let Some(envelope) = next else {
            println!("{}", "Relay closed the connection".yellow());
            return Ok(());
        };
        println!("{} {}", "←".magenta(), describe(&envelope));

        let reply = match envelope {
            Envelope::StartOffer if negotiate => Some(Envelope::Offer {
                offer: json!({ "type": "offer", "sdp": "pairline-probe-offer" }),
            }),
            Envelope::Offer { .. } if negotiate => Some(Envelope::Answer {
                answer: json!({ "type": "answer", "sdp": "pairline-probe-answer" }),
            }),
            Envelope::Leave if requeue => Some(Envelope::Ready),
            Envelope::Leave => {
                println!("{}", "Partner left".yellow());
                break;
            }
            _ => None,
        };

        if let Some(reply) = reply {
            send(&mut socket, &reply).await?;
            println!("{} {}", "→".cyan(), describe(&reply));
        }
    }

    let _ = socket.close(None).await;
    Ok(())
}

async fn run_smoke(url: &str, wait: Duration) -> Result<()> {
    let mut first = connect(url).await?;
    let mut second = connect(url).await?;

    send(&mut first, &Envelope::Ready).await?;
    send(&mut second, &Envelope::Ready).await?;

    // Either ready can reach the relay first; whoever is paired second
    // becomes the initiator.
    let second_initiates = match timeout(wait, next_envelope(&mut second)).await {
        Ok(Ok(Some(Envelope::StartOffer))) => true,
        Ok(Ok(other)) => bail!("expected start_offer or silence, got {:?}", other),
        Ok(Err(e)) => return Err(e),
        Err(_) => false,
    };
    let (mut initiator, mut responder) = if second_initiates {
        (second, first)
    } else {
        expect(&mut first, wait, "start_offer", |e| matches!(e, Envelope::StartOffer)).await?;
        (first, second)
    };
    check("paired, initiator received start_offer");

    let offer = Envelope::Offer {
        offer: json!({ "type": "offer", "sdp": "smoke-o1" }),
    };
    send(&mut initiator, &offer).await?;
    expect(&mut responder, wait, "offer", |e| *e == offer).await?;
    check("offer forwarded verbatim");

    let answer = Envelope::Answer {
        answer: json!({ "type": "answer", "sdp": "smoke-a1" }),
    };
    send(&mut responder, &answer).await?;
    expect(&mut initiator, wait, "answer", |e| *e == answer).await?;
    check("answer forwarded verbatim");

    let candidate = Envelope::Candidate {
        candidate: json!({ "candidate": "candidate:1 1 udp 1 127.0.0.1 9 typ host", "sdpMid": "0" }),
    };
    send(&mut initiator, &candidate).await?;
    expect(&mut responder, wait, "candidate", |e| *e == candidate).await?;
    check("candidate forwarded verbatim");

    send(&mut initiator, &Envelope::Leave).await?;
    expect(&mut responder, wait, "leave", |e| matches!(e, Envelope::Leave)).await?;
    check("leave delivered to partner");

    let _ = initiator.close(None).await;
    let _ = responder.close(None).await;

    println!("{}", "Smoke test passed".green().bold());
    Ok(())
}

async fn connect(url: &str) -> Result<Socket> {
    let (socket, _) = timeout(Duration::from_secs(5), connect_async(url))
        .await
        .with_context(|| format!("timed out connecting to {}", url))?
        .with_context(|| format!("failed to connect to {}", url))?;
    Ok(socket)
}

async fn send(socket: &mut Socket, envelope: &Envelope) -> Result<()> {
    let json = envelope.to_json().context("failed to encode envelope")?;
    debug!("sending {}", json);
    socket
        .send(Message::text(json))
        .await
        .context("failed to send frame")
}

/// Next decodable envelope, or `None` once the relay closes the socket.
async fn next_envelope(socket: &mut Socket) -> Result<Option<Envelope>> {
    while let Some(frame) = socket.next().await {
        match frame.context("WebSocket error")? {
            Message::Text(text) => match Envelope::from_json(text.as_str()) {
                Ok(envelope) => return Ok(Some(envelope)),
                Err(e) => eprintln!("{} undecodable frame {:?}: {}", "!".red(), text.as_str(), e),
            },
            Message::Close(_) => return Ok(None),
            _ => {}
        }
    }
    Ok(None)
}

async fn expect<F>(socket: &mut Socket, wait: Duration, what: &str, accept: F) -> Result<Envelope>
where
    F: Fn(&Envelope) -> bool,
{
    let envelope = timeout(wait, next_envelope(socket))
        .await
        .with_context(|| format!("timed out waiting for {}", what))??
        .with_context(|| format!("connection closed while waiting for {}", what))?;

    if !accept(&envelope) {
        bail!("expected {}, got {:?}", what, envelope);
    }
    Ok(envelope)
}

fn check(step: &str) {
    println!("  {} {}", "✓".green(), step);
}

fn describe(envelope: &Envelope) -> String {
    match envelope {
        Envelope::Offer { offer: payload }
        | Envelope::Answer { answer: payload }
        | Envelope::Candidate { candidate: payload } => {
            format!("{} {}", envelope.kind().bold(), payload)
        }
        _ => envelope.kind().bold().to_string(),
    }
}
