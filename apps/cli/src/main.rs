use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{EventsView, FormField, GraphqlClient, WorkflowController};
use shared::domain::{Event, EventId, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "events", about = "Browse, create and book shared events")]
struct Cli {
    /// TOML settings file; defaults to ./events.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    user_id: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        event_id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Book {
        event_id: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    settings.apply_overrides(cli.api_url, cli.token, cli.user_id);
    let endpoint = settings.endpoint()?;
    info!(endpoint = %endpoint, "events: using api endpoint");

    let client = GraphqlClient::with_timeout(endpoint, settings.request_timeout())
        .context("failed to build HTTP client")?;
    let session = settings.session();
    let controller = WorkflowController::new(Arc::new(client));

    controller
        .initialize()
        .await
        .context("failed to load events")?;

    let outcome = run(&controller, &session, cli.command).await;
    controller.detach();
    outcome
}

async fn run(controller: &WorkflowController, session: &Session, command: Command) -> Result<()> {
    match command {
        Command::List { json } => {
            let view = controller.view(session).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.events)?);
            } else {
                print_list(&view, session);
            }
        }
        Command::Show { event_id } => {
            let event_id = EventId::new(event_id);
            if !controller.select_event(&event_id).await {
                bail!("no event with id '{event_id}'");
            }
            let view = controller.view(session).await;
            if let Some(event) = &view.selected_event {
                print_detail(event, session);
            }
            if view.can_book {
                println!("Book it with: events book {event_id}");
            } else {
                println!("Sign in to book this event.");
            }
        }
        Command::Create {
            title,
            price,
            date,
            description,
        } => {
            if !controller.view(session).await.can_create {
                bail!("creating events requires a session token (--token or EVENTS_TOKEN)");
            }
            controller.open_create().await;
            controller.set_field(FormField::Title, title).await;
            controller.set_field(FormField::Price, price).await;
            controller.set_field(FormField::Date, date).await;
            controller
                .set_field(FormField::Description, description)
                .await;

            let event = controller
                .submit_create(session)
                .await
                .context("failed to create event")?;
            println!("Created event {}", event.id);
            print_detail(&event, session);
        }
        Command::Book { event_id } => {
            let event_id = EventId::new(event_id);
            if !controller.select_event(&event_id).await {
                bail!("no event with id '{event_id}'");
            }
            let booking = controller
                .book_selected(session)
                .await
                .context("failed to book event")?;
            println!(
                "Booked '{}' (confirmed {})",
                booking.event_title, booking.created_at
            );
        }
    }
    Ok(())
}

fn print_list(view: &EventsView, session: &Session) {
    if view.events.is_empty() {
        println!("No events yet.");
        return;
    }
    for event in &view.events {
        let marker = if is_own(event, session) { "  (yours)" } else { "" };
        println!(
            "{}  {}  {}  {}{marker}",
            event.id,
            format_date(event),
            format_price(event.price),
            event.title
        );
    }
    if view.can_create {
        println!();
        println!("Share your own events with: events create --title .. --price .. --date ..");
    }
}

fn print_detail(event: &Event, session: &Session) {
    println!("{}", event.title);
    println!("  {} - {}", format_price(event.price), format_date(event));
    if !event.description.is_empty() {
        println!("  {}", event.description);
    }
    if is_own(event, session) {
        println!("  You are the owner of this event.");
    }
}

fn is_own(event: &Event, session: &Session) -> bool {
    session
        .user_id
        .as_ref()
        .is_some_and(|user_id| event.is_created_by(user_id))
}

fn format_date(event: &Event) -> String {
    event
        .starts_at()
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| event.date.clone())
}

fn format_price(price: f64) -> String {
    format!("${price:.2}")
}
