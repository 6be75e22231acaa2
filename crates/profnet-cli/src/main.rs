use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use profnet_cli::config::{Args, Config};
use profnet_cli::console::{Console, StdConsole};
use profnet_cli::menu::Session;
use profnet_cli::views;

fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they never interleave with the menus
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args_and_env(Args::parse());
    let mut console = StdConsole::new();
    views::greeting(&mut console);

    console.println("Connecting to database...");
    console.println(&format!("Connection URL: {}", config.connection_url()));
    let db = match config.open_database() {
        Ok(db) => db,
        Err(e) => {
            error!("Database open failed: {:#}", e);
            console.eprintln(&format!("Error - Unable to Connect to Database: {:#}", e));
            return ExitCode::FAILURE;
        }
    };
    console.println("Done");
    info!(user = %config.user, port = config.port, "Session started");

    {
        let mut session = Session::new(&db);
        session.run(&mut console);
    }

    console.println("Disconnecting from database...");
    if let Err(e) = db.close() {
        error!("Database close failed: {:#}", e);
        console.eprintln(&format!("Error - Unable to Disconnect from Database: {:#}", e));
        return ExitCode::FAILURE;
    }
    console.println("Done");
    console.println("");
    console.println("Bye !");
    ExitCode::SUCCESS
}
