//! rackplan CLI
//!
//! Command-line interface for interacting with the rackplan daemon.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// rackplan - rack inventory with capacity-aware placement suggestions
#[derive(Parser, Debug)]
#[command(name = "rackplan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Daemon API address
    #[arg(long, default_value = "http://localhost:9090", global = true)]
    api: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all racks with their current load
    Racks,

    /// Show a single rack
    Rack {
        /// Rack ID
        id: i64,
    },

    /// List all devices
    Devices,

    /// Show a single device
    Device {
        /// Device ID
        id: i64,
    },

    /// Mount a device in a rack
    Assign {
        /// Device ID
        device: i64,
        /// Rack ID
        rack: i64,
    },

    /// Unmount a device from a rack
    Unassign {
        /// Device ID
        device: i64,
        /// Rack ID
        rack: i64,
    },

    /// Suggest how to pack devices into racks
    Suggest {
        /// Device IDs (comma separated)
        #[arg(long, value_delimiter = ',')]
        devices: Vec<i64>,

        /// Rack IDs (comma separated)
        #[arg(long, value_delimiter = ',')]
        racks: Vec<i64>,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let client = commands::ApiClient::new(&cli.api);

    match cli.command {
        Commands::Racks => commands::racks(&client).await?,
        Commands::Rack { id } => commands::rack(&client, id).await?,
        Commands::Devices => commands::devices(&client).await?,
        Commands::Device { id } => commands::device(&client, id).await?,
        Commands::Assign { device, rack } => {
            commands::membership(&client, "add_to_rack", device, rack).await?
        }
        Commands::Unassign { device, rack } => {
            commands::membership(&client, "remove_from_rack", device, rack).await?
        }
        Commands::Suggest { devices, racks } => {
            commands::suggest(&client, &devices, &racks).await?
        }
        Commands::Status => commands::status(&client).await?,
    }

    Ok(())
}
