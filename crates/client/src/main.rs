use anyhow::Context;
use clap::{Parser, Subcommand};
use events_client::pages::{
    CreateEventPage, EventDetailsPage, EventForm, EventListPage, LoginPage, SignupPage,
    UpdateEventPage,
};
use events_client::{
    connect, nav_items, pages, FormState, NavItem, PageState, SessionStore, DEFAULT_SERVER,
};
use events_common::{date_only, Event, EventPatch};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "events")]
#[command(about = "Event Manager command-line client")]
struct Cli {
    /// API base address
    #[arg(long, env = "EVENTS_API_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Session cache file
    #[arg(long)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all events
    List,
    /// Search events by name, location, or description
    Search { query: String },
    /// Show one event with its attendees
    Show { id: String },
    /// Create an event
    Create {
        #[arg(long, default_value = "")]
        name: String,
        /// YYYY-MM-DD or RFC 3339
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Update an event; omitted fields keep their current value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event
    Delete { id: String },
    /// Add an attendee to an event
    Attend {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Send reminders to every attendee of an event
    Remind { id: String },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the cached session
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let store = match cli.session {
        Some(path) => SessionStore::new(path),
        None => SessionStore::default_location(),
    };
    let mut api = connect(&cli.server, &store).context("Failed to set up API client")?;

    match cli.command {
        Command::List => {
            let mut page = EventListPage::new();
            page.load(&api).await;
            print_list(&page.state)
        }
        Command::Search { query } => {
            let mut page = EventListPage::new();
            page.search(&api, &query).await;
            print_list(&page.state)
        }
        Command::Show { id } => {
            let mut page = EventDetailsPage::new(id);
            page.load(&api).await;
            match &page.state {
                PageState::Ready(event) => {
                    print_event(event);
                    Ok(())
                }
                PageState::Error(message) => anyhow::bail!("{}", message),
                PageState::Loading => Ok(()),
            }
        }
        Command::Create {
            name,
            date,
            location,
            description,
        } => {
            let mut page = CreateEventPage::new();
            page.form = EventForm {
                name,
                date,
                location,
                description,
            };
            let redirect = page.submit(&api).await;
            report(&page.state)?;
            if let Some(redirect) = redirect {
                redirect.wait().await;
                println!("-> {}", redirect.to);
            }
            Ok(())
        }
        Command::Update {
            id,
            name,
            date,
            location,
            description,
        } => {
            let mut page = UpdateEventPage::new(id);
            page.load(&api).await;
            if let Some(message) = page.loaded.error() {
                anyhow::bail!("{}", message);
            }
            page.apply(EventPatch {
                name,
                date,
                location,
                description,
            });
            let redirect = page.submit(&api).await;
            report(&page.state)?;
            if let Some(redirect) = redirect {
                redirect.wait().await;
                println!("-> {}", redirect.to);
            }
            Ok(())
        }
        Command::Delete { id } => {
            let mut page = EventDetailsPage::new(id);
            page.delete(&api).await;
            report(&page.action)
        }
        Command::Attend { id, name, email } => {
            let mut page = EventDetailsPage::new(id);
            page.add_attendee(&api, &name, &email).await;
            report(&page.action)?;
            if let Some(event) = page.state.ready() {
                print_event(event);
            }
            Ok(())
        }
        Command::Remind { id } => {
            let mut page = EventDetailsPage::new(id);
            let summary = page.send_reminder(&api).await;
            report(&page.action)?;
            if let Some(summary) = summary {
                for failed in &summary.failures {
                    println!("  failed: {}", failed);
                }
            }
            Ok(())
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let mut page = SignupPage {
                name,
                email,
                password,
                ..Default::default()
            };
            page.submit(&mut api, &store).await;
            report(&page.state)
        }
        Command::Login { email, password } => {
            let mut page = LoginPage {
                email,
                password,
                ..Default::default()
            };
            page.submit(&mut api, &store).await;
            report(&page.state)
        }
        Command::Logout => {
            let redirect = pages::logout(&mut api, &store);
            println!("Logged out -> {}", redirect.to);
            Ok(())
        }
        Command::Whoami => {
            let session = store.load()?;
            if session.is_none() {
                println!("Not logged in");
                return Ok(());
            }
            let user = api.me().await?;
            println!("{} <{}>", user.name, user.email);
            for item in nav_items(session.as_ref()) {
                match item {
                    NavItem::Link { label, route } => println!("  {} ({})", label, route),
                    NavItem::Account { name } => println!("  [{}]", name),
                }
            }
            Ok(())
        }
    }
}

fn report(state: &FormState) -> anyhow::Result<()> {
    match state {
        FormState::Success(message) => {
            println!("{}", message);
            Ok(())
        }
        FormState::Error(message) => anyhow::bail!("{}", message),
        FormState::Idle | FormState::Submitting => Ok(()),
    }
}

fn print_list(state: &PageState<Vec<Event>>) -> anyhow::Result<()> {
    match state {
        PageState::Ready(events) if events.is_empty() => {
            println!("No events found");
            Ok(())
        }
        PageState::Ready(events) => {
            for event in events {
                println!(
                    "{}  {}  {}  {}",
                    event.id,
                    date_only(&event.date),
                    event.name,
                    event.location.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        PageState::Error(message) => anyhow::bail!("{}", message),
        PageState::Loading => Ok(()),
    }
}

fn print_event(event: &Event) {
    println!("{}", event.name);
    println!("  id:       {}", event.id);
    println!("  date:     {}", date_only(&event.date));
    if let Some(location) = &event.location {
        println!("  location: {}", location);
    }
    if let Some(description) = &event.description {
        println!("  about:    {}", description);
    }
    println!("  attendees ({}):", event.attendees.len());
    for attendee in &event.attendees {
        println!("    {} <{}>", attendee.name, attendee.email);
    }
}
