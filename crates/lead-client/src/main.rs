use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lead_client::{
    Field, FileStore, FormData, FormView, HttpRelayClient, PageSession, PendingQueue,
    RelayTransport, SubmitOutcome, SystemClock, Tone,
};
use lead_core::Submission;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser, Debug)]
#[command(
    name = "lead-client",
    version,
    about = "Submit landing-page leads to the relay, keeping failed ones for later"
)]
struct Cli {
    /// Relay endpoint the form posts to.
    #[arg(
        long,
        env = "LEAD_RELAY_URL",
        default_value = "http://127.0.0.1:8080/api/send-message"
    )]
    relay_url: String,
    /// Directory holding the pending-lead queue.
    #[arg(long, env = "LEAD_CLIENT_STATE", default_value = ".lead-client")]
    state_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in the order form interactively
    Fill,
    /// Send one lead without the form checks, queueing it on failure
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },
    /// Retry queued leads
    Flush,
    /// Print queued leads as JSON lines
    Pending,
}

#[tokio::main]
async fn main() -> Result<()> {
    lead_telemetry::install("lead-client", env!("CARGO_PKG_VERSION"))?;
    let cli = Cli::parse();

    let store = FileStore::new(&cli.state_dir);
    let clock = Arc::new(SystemClock);
    let transport: Arc<dyn RelayTransport> =
        Arc::new(HttpRelayClient::new(&cli.relay_url).context("build relay http client")?);

    match cli.command {
        Command::Fill => fill(store, transport, clock).await,
        Command::Send {
            name,
            phone,
            address,
        } => {
            let queue = PendingQueue::new(store, clock);
            queue.flush(&transport).await;
            let outcome = queue
                .deliver(&Submission::new(name, phone, address), &transport)
                .await;
            println!(
                "{}",
                serde_json::json!({ "ok": outcome.ok, "queued": outcome.queued })
            );
            Ok(())
        }
        Command::Flush => {
            let report = PendingQueue::new(store, clock)
                .flush(&transport)
                .await;
            println!(
                "attempted={} delivered={} remaining={} persisted={}",
                report.attempted, report.delivered, report.remaining, report.persisted
            );
            Ok(())
        }
        Command::Pending => {
            for entry in PendingQueue::new(store, clock).entries() {
                println!("{}", serde_json::to_string(&entry)?);
            }
            Ok(())
        }
    }
}

async fn fill(
    store: FileStore,
    transport: Arc<dyn RelayTransport>,
    clock: Arc<SystemClock>,
) -> Result<()> {
    let session = PageSession::open(store, transport, TerminalView, clock).await;
    if session.flushed.delivered > 0 {
        println!("Отправлено ранее сохранённых заявок: {}", session.flushed.delivered);
    }
    let mut controller = session.controller;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut form = FormData::default();

    controller.on_focus(Field::Name);
    form.name = prompt(&mut lines, "Имя").await?;
    form.phone = prompt(&mut lines, "Телефон").await?;
    form.address = prompt(&mut lines, "Адрес").await?;
    form.challenge = prompt(&mut lines, "Сколько будет 2 + 2?").await?;
    form.consent = ask_consent(&mut lines).await?;

    loop {
        match controller.submit(&form).await {
            SubmitOutcome::ChallengeFailed => {
                form.challenge = prompt(&mut lines, "Сколько будет 2 + 2?").await?;
            }
            SubmitOutcome::ConsentMissing => form.consent = ask_consent(&mut lines).await?,
            SubmitOutcome::Invalid(missing) => {
                for field in missing {
                    match field {
                        "name" => form.name = prompt(&mut lines, "Имя").await?,
                        "phone" => form.phone = prompt(&mut lines, "Телефон").await?,
                        _ => form.address = prompt(&mut lines, "Адрес").await?,
                    }
                }
            }
            SubmitOutcome::Ignored(reason) => {
                tracing::debug!(?reason, "submit dropped by form gates");
                println!("{IGNORED_HINT}");
                return Ok(());
            }
            SubmitOutcome::Sent | SubmitOutcome::Queued | SubmitOutcome::Failed => return Ok(()),
        }
    }
}

/// Shown when the form gates drop a submit; piped input trips the dwell check.
const IGNORED_HINT: &str = "Заявка не отправлена: форма заполнена слишком быстро. Попробуйте ещё раз.";

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<String> {
    println!("{label}:");
    let line = lines
        .next_line()
        .await
        .context("read stdin")?
        .context("input closed")?;
    Ok(line)
}

async fn ask_consent(lines: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    let answer = prompt(lines, "Согласны с политикой конфиденциальности? [y/N]").await?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "д" | "да"
    ))
}

struct TerminalView;

impl FormView for TerminalView {
    fn set_message(&mut self, text: &str, tone: Tone) {
        match tone {
            _ if text.is_empty() => {}
            Tone::Error => eprintln!("{text}"),
            Tone::Success | Tone::Neutral => println!("{text}"),
        }
    }

    fn focus(&mut self, field: Field) {
        tracing::debug!(?field, "focus");
    }

    fn lock_submit(&mut self) {
        println!("Отправка...");
    }

    fn unlock_submit(&mut self) {}

    fn reset(&mut self) {}

    fn report_validity(&mut self, missing: &[&'static str]) {
        eprintln!("Заполните обязательные поля: {}", missing.join(", "));
    }
}
