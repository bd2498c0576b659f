mod account;
mod prompt;

use account::Echo;

use clap::{Args, Parser, Subcommand};
use posturator::auth::Destination;
use posturator::config::AppConfig;
use posturator::error::AppError;
use posturator::questionnaire::{FlowController, QuestionnaireBlueprint, Terminal};
use posturator::telemetry;
use std::io::{self, BufRead, Write};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "posturator",
    about = "Check eligibility for Posturator posture-support products from the terminal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer the eligibility questionnaire without signing in
    Questionnaire,
    /// Sign in and remember the session on this machine
    Login(LoginArgs),
    /// Create an account
    Register,
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List the product catalog
    Products,
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Account name; prompted for when omitted
    username: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match cli.command {
        Some(Command::Questionnaire) => {
            questionnaire(&mut input, &mut output)?;
        }
        Some(Command::Products) => account::print_products(&mut output)?,
        Some(Command::Login(args)) => {
            let mut session = account::open_session(&config)?;
            account::login(
                &mut session,
                &mut input,
                &mut output,
                args.username,
                Echo::detect(),
            )
            .await?;
        }
        Some(Command::Register) => {
            let mut session = account::open_session(&config)?;
            account::register(&mut session, &mut input, &mut output, Echo::detect()).await?;
        }
        Some(Command::Logout) => {
            let mut session = account::open_session(&config)?;
            account::logout(&mut session, &mut output)?;
        }
        Some(Command::Whoami) => {
            let session = account::open_session(&config)?;
            account::whoami(&session, &mut output)?;
        }
        None => {
            let session = account::open_session(&config)?;
            let destination = session.destination();
            info!(?destination, "routing signed-in user");
            match destination {
                Destination::Questionnaire => {
                    questionnaire(&mut input, &mut output)?;
                }
                Destination::Admin => writeln!(
                    output,
                    "Signed in as an administrator. Administration is handled in the back office."
                )?,
                Destination::Login => writeln!(
                    output,
                    "Not signed in. Run `posturator login` or `posturator register` to continue."
                )?,
            }
        }
    }

    Ok(())
}

fn questionnaire<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<Terminal>, AppError> {
    let reached = prompt::run_questionnaire(
        input,
        output,
        &FlowController::default(),
        &QuestionnaireBlueprint::standard(),
    )?;
    if let Some(terminal) = reached {
        info!(terminal = terminal.label(), "questionnaire finished");
    }
    Ok(reached)
}
