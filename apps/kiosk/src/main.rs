use std::{io::Write, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, mood_suggestions, recommend, HttpOrderSubmitter, MissingOrderSubmitter,
    MoodWidget, OrderSubmitter, SubmissionPolicy, WizardController,
};
use shared::domain::Category;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;
mod session;

use commands::parse_command;
use session::{Flow, OrderSession};

#[derive(Parser, Debug)]
#[command(about = "CloudBrew storefront kiosk")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the five-step order wizard.
    Order {
        /// Preselect a drink category, as the menu's order buttons do.
        #[arg(long)]
        category: Option<String>,
        /// Override the order-intake endpoint.
        #[arg(long)]
        endpoint: Option<String>,
        /// Surface submission failures instead of completing with the local order number.
        #[arg(long)]
        strict: bool,
        /// Do not contact the intake endpoint at all.
        #[arg(long)]
        offline: bool,
    },
    /// Chat with the AI barista about your mood.
    Barista {
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// One-shot mood lookup.
    Recommend { mood: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;

    match cli.command {
        Command::Order {
            category,
            endpoint,
            strict,
            offline,
        } => {
            if let Some(endpoint) = endpoint {
                settings.order_endpoint = endpoint;
            }
            if strict {
                settings.mask_submission_errors = false;
            }
            let preselected = category
                .map(Category::new)
                .transpose()
                .context("invalid --category")?;

            let submitter: Box<dyn OrderSubmitter> = if offline {
                Box::new(MissingOrderSubmitter)
            } else {
                Box::new(HttpOrderSubmitter::from_settings(&settings)?)
            };
            let controller =
                WizardController::open(SubmissionPolicy::from_settings(&settings), preselected);
            tracing::info!(
                endpoint = %settings.order_endpoint,
                mask_submission_errors = settings.mask_submission_errors,
                offline,
                "order wizard opened"
            );
            run_order(OrderSession::new(controller, submitter)).await
        }
        Command::Barista { delay_ms } => {
            let delay = delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| settings.recommendation_delay());
            run_barista(MoodWidget::new(delay)).await
        }
        Command::Recommend { mood } => {
            println!("{}", recommend(&mood.join(" ")).message());
            Ok(())
        }
    }
}

async fn run_order(mut session: OrderSession) -> Result<()> {
    let mut stdout = std::io::stdout();
    session.write_prompt(&mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        stdout.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("! {err}");
                continue;
            }
        };
        if session.handle(command, &mut stdout).await? == Flow::Done {
            break;
        }
    }
    Ok(())
}

async fn run_barista(mut widget: MoodWidget) -> Result<()> {
    println!("Tell me how you're feeling (blank line skips, ctrl-d quits).");
    println!(
        "Try one of: {}",
        mood_suggestions().collect::<Vec<_>>().join(", ")
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(pending) = widget.post_user_message(&line) else {
            continue;
        };
        println!("barista is thinking...");
        let pending = pending.ready().await;
        let recommendation = widget.deliver_reply(pending);
        println!("barista> {}", recommendation.message());
    }
    Ok(())
}
