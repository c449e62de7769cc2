use anyhow::{Result, bail};
use booker::api::BookingApi;
use booker::client::BookerClient;
use booker::config::Settings;
use booker::testdata;
use clap::Parser;

/// booker - Restful Booker API client
///
/// Exercises a booking service deployment: health checks, token
/// creation and the booking CRUD surface.
///
/// Credentials and retry behaviour come from BOOKER_* environment
/// variables; see `--help` per subcommand for overrides.
///
/// Examples:
///   booker ping                  # Probe the service
///   booker create                # Create a randomized booking
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Service base URL (also via BOOKER_BASE_URL)
    #[arg(
        long = "base-url",
        short = 'u',
        env = "BOOKER_BASE_URL",
        value_name = "URL",
        global = true
    )]
    pub base_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check whether the service is up
    Ping,

    /// Exchange the configured credentials for a session token
    Auth,

    /// List all booking ids
    List,

    /// Fetch a single booking
    Get(BookingIdArg),

    /// Create a booking with randomized data
    Create,

    /// Delete a booking
    Delete(BookingIdArg),
}

#[derive(clap::Args, Debug)]
pub struct BookingIdArg {
    /// The booking id
    #[arg(value_name = "ID")]
    pub id: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    let client = BookerClient::new(&settings)?;

    match cli.command {
        Commands::Ping => {
            if !client.health_check().await {
                bail!("service at {} is not responding", settings.base_url);
            }
            println!("service is up");
        }
        Commands::Auth => {
            let token = client
                .create_token(&settings.username, &settings.password)
                .await?;
            println!("{token}");
        }
        Commands::List => {
            for id in client.booking_ids().await {
                println!("{id}");
            }
        }
        Commands::Get(args) => match client.get_booking(args.id).await {
            Some(booking) => println!("{}", serde_json::to_string_pretty(&booking)?),
            None => bail!("booking {} not found", args.id),
        },
        Commands::Create => {
            let booking = testdata::booking();
            match client.create_booking(&booking).await {
                Some(id) => println!("created booking {id}"),
                None => bail!("failed to create booking"),
            }
        }
        Commands::Delete(args) => {
            let token = client
                .create_token(&settings.username, &settings.password)
                .await?;
            if !client.delete_booking(args.id, &token).await {
                bail!("failed to delete booking {}", args.id);
            }
            println!("deleted booking {}", args.id);
        }
    }
    Ok(())
}
