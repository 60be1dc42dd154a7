use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use voyage_agents::{create_booking, PlannerAgent, PlanningStrategy, TripSession};
use voyage_core::{FlightClass, OptionCategory, TripPreferences, TripRequest};
use voyage_observability::{init_tracing, AppMetrics};
use voyage_provider::Provider;
use voyage_storage::Store;

#[derive(Debug, Parser)]
#[command(name = "voyage")]
#[command(about = "Voyage Concierge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a trip and optionally edit the selection interactively.
    Plan {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value_t = 1)]
        travelers: u32,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long = "class", default_value = "economy")]
        flight_class: String,
        #[arg(long, default_value = "local")]
        strategy: String,
        #[arg(long, default_value_t = false)]
        interactive: bool,
    },
    /// List the stored trip history.
    Trips,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("voyage_cli");
    let cli = Cli::parse();

    let metrics = AppMetrics::shared();
    let store = Arc::new(build_store().await?);
    let mut session = TripSession::restore(store, metrics.clone()).await?;

    match cli.command {
        Command::Plan {
            from,
            to,
            start,
            end,
            travelers,
            budget,
            flight_class,
            strategy,
            interactive,
        } => {
            let strategy =
                PlanningStrategy::parse(&strategy).context("invalid --strategy value")?;
            let preferences = TripPreferences {
                flight_class: FlightClass::parse(&flight_class)
                    .context("invalid --class value")?,
                ..TripPreferences::default()
            };
            let request = TripRequest {
                departure_location: from,
                destination: to,
                start_date: start.and_time(NaiveTime::MIN).and_utc(),
                end_date: end.and_time(NaiveTime::MIN).and_utc(),
                travelers,
                budget,
                preferences,
            };

            let planner = PlannerAgent::new(Arc::new(build_provider()?), metrics);

            let mut progress = planner.subscribe_progress();
            let reporter = tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let current = progress.borrow().clone();
                    if !current.is_idle() {
                        eprintln!("[{:>3.0}%] {}", current.fraction * 100.0, current.label);
                    }
                }
            });

            let itinerary = planner.plan_trip(&request, strategy).await?;
            reporter.abort();

            session.create_trip(request).await?;
            session.install_itinerary(itinerary).await?;

            if let Some(trip) = session.current_trip() {
                println!("{}", serde_json::to_string_pretty(trip)?);
            }

            if interactive {
                run_selection_loop(&mut session).await?;
            }
        }
        Command::Trips => {
            for trip in session.history() {
                let total = trip
                    .itinerary
                    .as_ref()
                    .map(|itinerary| itinerary.total_cost)
                    .unwrap_or(0.0);
                println!(
                    "{}  {} -> {}  [{}]  ${:.2}",
                    trip.id,
                    trip.request.departure_location,
                    trip.request.destination,
                    trip.status.as_str(),
                    total
                );
            }
        }
    }

    Ok(())
}

async fn run_selection_loop(session: &mut TripSession<Store>) -> Result<()> {
    println!("selection mode. type 'help' for commands, 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let mut words = input.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let argument = words.next().unwrap_or_default();

        match command.as_str() {
            "help" => {
                println!("  flights | hotels | activities | transport   list options");
                println!("  flight <id> | hotel <id> | transport <id>   select an option");
                println!("  activity <id>                               toggle an activity");
                println!("  total                                       show the current total");
                println!("  book                                        validate and book");
                println!("  exit");
            }
            "flights" => list_options(session, OptionCategory::Flights),
            "hotels" => list_options(session, OptionCategory::Hotels),
            "activities" => list_options(session, OptionCategory::Activities),
            "transport" if argument.is_empty() => {
                list_options(session, OptionCategory::Transportation)
            }
            "transport" => session.select_transportation(argument).await?,
            "flight" => session.select_flight(argument).await?,
            "hotel" => session.select_hotel(argument).await?,
            "activity" => session.toggle_activity(argument).await?,
            "total" => {
                let total = session
                    .current_trip()
                    .and_then(|trip| trip.itinerary.as_ref())
                    .map(|itinerary| itinerary.total_cost)
                    .unwrap_or(0.0);
                println!("total: ${total:.2}");
            }
            "book" => match session.current_trip() {
                Some(trip) => match trip.itinerary.as_ref() {
                    Some(itinerary) => match create_booking(trip, itinerary) {
                        Ok(booking) => {
                            session.mark_as_booked().await?;
                            println!("booked: {}", booking.reference);
                        }
                        Err(error) => println!("booking rejected: {error}"),
                    },
                    None => println!("no itinerary to book"),
                },
                None => println!("no trip in progress"),
            },
            _ => println!("unknown command. type 'help'."),
        }
    }

    Ok(())
}

fn list_options(session: &TripSession<Store>, category: OptionCategory) {
    for option in session.alternatives(category) {
        let marker = if option.is_selected() { "*" } else { " " };
        println!(
            "{} {}  ${:.2}  {}",
            marker,
            option.id(),
            option.price(),
            option.label()
        );
    }
}

fn build_provider() -> Result<Provider> {
    match env::var("VOYAGE_PROVIDER_URL") {
        Ok(url) => Provider::http(&url).context("failed building planning provider client"),
        Err(_) => Ok(Provider::local()),
    }
}

async fn build_store() -> Result<Store> {
    if let Ok(database_url) = env::var("VOYAGE_DATABASE_URL") {
        Store::sqlite(&database_url).await
    } else {
        Ok(Store::memory())
    }
}
