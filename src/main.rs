use clap::Parser;
use gofinances::app::App;
use gofinances::args::{Args, Command};
use gofinances::{commands, Config, ErrorType, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().gofinances_home().path();

    // This allows for testing the program without hitting the Google APIs. When
    // GOFINANCES_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    // Every command but these two works on the restored session.
    match args.command() {
        Command::Init(init_args) => {
            return commands::init(home, init_args.client_secret(), mode)
                .await
                .map(|out| out.print());
        }
        Command::Categories => return commands::categories().await.map(|out| out.print()),
        _ => {}
    }

    let config = Config::load(home)
        .await
        .map_err(|e| gofinances::Error::new(ErrorType::Config, e))?;
    let mut app = App::open(config)
        .await
        .map_err(|e| gofinances::Error::new(ErrorType::Storage, e))?;

    let _: () = match args.command() {
        Command::SignIn => commands::sign_in(&mut app, mode).await?.print(),
        Command::SignOut => commands::sign_out(&mut app).await?.print(),
        Command::Whoami => commands::whoami(&app).await?.print(),
        Command::Register(register_args) => {
            commands::register(&app, register_args.new_transaction())
                .await?
                .print()
        }
        Command::Dashboard => {
            let out = commands::dashboard(&app).await?;
            if let Some(report) = out.structure() {
                print!("{}", report.render());
            }
            out.print()
        }
        Command::Init(_) | Command::Categories => {}
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
