use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings,
    controller::CardList,
    html,
    view::{ParticipantsSection, RemovalTarget, NO_PARTICIPANTS_TEXT},
    ActivityApi, BoardController, HttpActivityApi, Phase, Tone, ViewState,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "board_cli", about = "Activity signup board from the terminal")]
struct Cli {
    /// Overrides board.toml and APP__SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every activity card.
    List,
    Signup {
        activity: String,
        email: String,
    },
    Remove {
        activity: String,
        email: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Write the board as static HTML.
    Html {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings().with_server_url(cli.server_url);
    tracing::info!(server_url = %settings.server_url, "using activity server");
    let api = HttpActivityApi::from_settings(&settings)
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    let mut controller = BoardController::new(Arc::new(api));

    match cli.command {
        Command::List => {
            controller.load().await;
            ensure_loaded(controller.state())?;
            print_cards(controller.state());
        }
        Command::Signup { activity, email } => {
            run_signup(&mut controller, &activity, &email).await?;
        }
        Command::Remove {
            activity,
            email,
            yes,
        } => {
            let target = RemovalTarget::new(activity, email);
            let mut confirmed = false;
            controller
                .remove_participant(target, |target| {
                    confirmed = yes || confirm_on_stdin(&target.confirmation_prompt());
                    confirmed
                })
                .await;
            if !confirmed {
                println!("Nothing removed.");
                return Ok(());
            }
            finish_mutation(controller.state())?;
        }
        Command::Html { output } => {
            controller.load().await;
            let page = html::render_board(controller.state());
            match output {
                Some(path) => {
                    fs::write(&path, page)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    println!("wrote {}", path.display());
                }
                None => print!("{page}"),
            }
            ensure_loaded(controller.state())?;
        }
    }

    Ok(())
}

/// A blank activity or email sends nothing and prints nothing, like the form.
async fn run_signup<A>(
    controller: &mut BoardController<A>,
    activity: &str,
    email: &str,
) -> Result<()>
where
    A: ActivityApi + ?Sized,
{
    controller.submit_signup(activity, email).await;
    finish_mutation(controller.state())
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn ensure_loaded(state: &ViewState) -> Result<()> {
    if state.phase() == Phase::LoadFailed {
        bail!("could not load activities");
    }
    Ok(())
}

/// Prints the outcome message, then the refreshed board when it reloaded.
fn finish_mutation(state: &ViewState) -> Result<()> {
    match state.message() {
        Some(message) if message.tone == Tone::Err => bail!("{}", message.text),
        Some(message) => println!("{}", message.text),
        None => {}
    }
    ensure_loaded(state)?;
    print_cards(state);
    Ok(())
}

fn print_cards(state: &ViewState) {
    let CardList::Cards(cards) = state.cards() else {
        return;
    };
    for card in cards {
        println!();
        println!("{}", card.name);
        if !card.description.is_empty() {
            println!("  {}", card.description);
        }
        println!("  {}", card.schedule_line);
        if let Some(badge) = card.spots_badge() {
            println!("  {badge}");
        }
        match &card.participants {
            ParticipantsSection::Empty => println!("  {NO_PARTICIPANTS_TEXT}"),
            ParticipantsSection::Rows(rows) => {
                for row in rows {
                    println!("  - {}", row.email);
                }
            }
        }
    }
}
