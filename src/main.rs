use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};

use trusty_classify::client::HttpBackend;
use trusty_classify::config::Config;
use trusty_classify::handlers::{handle_interaction, Interaction, VoteOutcome};
use trusty_classify::page::{render_card, RecordPage};
use trusty_classify::tasks::notifier::Notifier;

#[derive(Parser)]
#[command(name = "trusty-classify", about = "Vote on note classifications from a saved record page")]
struct Cli {
    /// Saved HTML of the record page
    #[arg(long)]
    page: PathBuf,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Cast a vote on one note
    Vote {
        #[arg(long)]
        note: usize,
        /// Classification code: w, o, a, ow, aw, ao or ?
        #[arg(long)]
        code: String,
        /// Apply the vote to every note with the same text
        #[arg(long)]
        all_identical: bool,
    },
    /// Show or hide the other votes on one note
    Toggle {
        #[arg(long)]
        note: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    let html = tokio::fs::read_to_string(&cli.page).await?;
    let mut page = RecordPage::parse(&html)?;
    info!("Loaded record {} with {} note(s)", page.bib_id, page.cards.len());

    let backend = HttpBackend::new(&config)?;
    let notifier = Notifier::new(config.notification_lifetime);

    let mut summary = None;
    let note_index = match cli.action {
        Action::Vote { note, code, all_identical } => {
            if all_identical {
                handle_interaction(
                    &backend,
                    &notifier,
                    &mut page,
                    Interaction::SetVoteAll { note_index: note, checked: true },
                )
                .await;
            }
            let outcome = handle_interaction(
                &backend,
                &notifier,
                &mut page,
                Interaction::Vote { note_index: note, classification: code },
            )
            .await;
            info!("Outcome: {:?}", outcome);
            if let Some(VoteOutcome::Recorded { summary: line, .. }) = outcome {
                summary = Some(line);
            }
            note
        }
        Action::Toggle { note } => {
            handle_interaction(&backend, &notifier, &mut page, Interaction::ToggleVotes { note_index: note })
                .await;
            note
        }
    };

    match page.card_mut(note_index) {
        Some(card) => println!("{}", render_card(card)),
        None => return Err(format!("record {} has no note {}", page.bib_id, note_index).into()),
    }
    if let Some(line) = summary {
        println!("{}", line);
    }
    if let Some(notification) = notifier.current().await {
        println!("{}", notification.to_html());
    }

    Ok(())
}
