use log::{error, info, warn};

use crate::cards::NoteCard;
use crate::client::VoteBackend;
use crate::error::{ClientError, RenderError};
use crate::models::{Classification, IdenticalVoteRequest, IdenticalVoteSummary, VoteRecorded, VoteRequest};
use crate::tasks::notifier::{Notifier, Severity};
use crate::voting::distribution::format_vote_summary;
use crate::voting::highlight::reconcile;
use crate::voting::percent;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// What happened to one click on a vote button.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// Single-note vote saved and the card re-rendered. `summary` is the
    /// new distribution as one line of text.
    Recorded {
        consensus: String,
        probability: f64,
        summary: String,
    },
    /// Vote saved but its details could not be shown.
    RecordedDisplayFailed(String),
    /// Bulk vote saved; cards were left as they were.
    Applied(IdenticalVoteSummary),
    /// The server refused the vote.
    Rejected(String),
    /// No usable answer from the server.
    NetworkFailure(String),
    /// The code is not one of the known classifications; nothing was sent.
    InvalidClassification(String),
    /// Another vote on this card is still outstanding; nothing was sent.
    Busy,
}

/// Handles a click on the vote button for `code` on `card`.
///
/// Sends a bulk vote when the card's identical-notes toggle is checked at
/// the moment of the click, a single-note vote otherwise. The card stays in
/// its in-progress state until this returns, whatever the outcome.
pub async fn submit_vote(
    backend: &dyn VoteBackend,
    notifier: &Notifier,
    card: &mut NoteCard,
    bib_id: &str,
    code: &str,
) -> VoteOutcome {
    let classification: Classification = match code.parse() {
        Ok(c) => c,
        Err(e) => {
            warn!("Ignoring vote on note {}: {}", card.note_index, e);
            notifier.show(format!("Error: {}", e), Severity::Error).await;
            return VoteOutcome::InvalidClassification(code.to_string());
        }
    };

    let identical_text = card.identical_vote_text().map(str::to_string);
    let note_index = card.note_index;

    let Some(mut card) = card.begin_submit(code) else {
        warn!("Vote on note {} already in flight, ignoring '{}'", note_index, code);
        return VoteOutcome::Busy;
    };

    match identical_text {
        Some(note_text) => {
            info!("Submitting bulk vote '{}' for note text {:?}", classification, note_text);
            let request = IdenticalVoteRequest {
                note_text,
                classification,
            };
            match backend.vote_identical(&request).await {
                Ok(summary) => {
                    notifier
                        .show(bulk_success_message(&summary), Severity::Success)
                        .await;
                    VoteOutcome::Applied(summary)
                }
                Err(ClientError::Unreadable(detail)) => {
                    display_failed(notifier, note_index, detail).await
                }
                Err(e) => report_failure(notifier, note_index, e).await,
            }
        }
        None => {
            info!(
                "Submitting vote '{}' for bib_id={}, note_index={}",
                classification, bib_id, note_index
            );
            let request = VoteRequest {
                bib_id: bib_id.to_string(),
                note_index,
                classification,
            };
            let outcome = match backend.vote(&request).await {
                Ok(recorded) => match apply_recorded_vote(&mut card, &recorded, code) {
                    Ok((consensus, probability, summary)) => {
                        info!("Note {} now stands at {}", note_index, summary);
                        notifier
                            .show(
                                format!(
                                    "Vote recorded! Consensus: {} at {}%",
                                    consensus.to_uppercase(),
                                    percent(probability)
                                ),
                                Severity::Success,
                            )
                            .await;
                        VoteOutcome::Recorded {
                            consensus,
                            probability,
                            summary,
                        }
                    }
                    Err(e) => display_failed(notifier, note_index, e.to_string()).await,
                },
                // Saved on the server even though the details did not decode.
                Err(ClientError::Unreadable(detail)) => {
                    display_failed(notifier, note_index, detail).await
                }
                Err(e) => return report_failure(notifier, note_index, e).await,
            };
            reconcile(&mut card, code);
            outcome
        }
    }
}

/// Redraws distribution and roster from a saved vote.
fn apply_recorded_vote(
    card: &mut NoteCard,
    recorded: &VoteRecorded,
    code: &str,
) -> Result<(String, f64, String), RenderError> {
    let distribution = recorded
        .distribution
        .as_ref()
        .ok_or(RenderError::MissingDistribution)?;
    card.update_vote_display(distribution, Some(code))?;

    if recorded.voters.is_some() {
        card.update_voters_display(recorded.voters.as_ref());
    }

    let (consensus, probability) = recorded
        .consensus()
        .ok_or(RenderError::MissingConsensus(distribution.total))?;
    Ok((consensus.to_string(), probability, format_vote_summary(distribution)))
}

pub fn bulk_success_message(summary: &IdenticalVoteSummary) -> String {
    format!(
        "Vote applied to {} identical notes! ({} new, {} updated) Reload the page to see updated counts for all affected notes.",
        summary.total_notes, summary.votes_created, summary.votes_updated
    )
}

async fn display_failed(notifier: &Notifier, note_index: usize, detail: String) -> VoteOutcome {
    warn!("Vote on note {} saved but display failed: {}", note_index, detail);
    notifier
        .show(
            format!("Vote saved, but error updating display: {}", detail),
            Severity::Warning,
        )
        .await;
    VoteOutcome::RecordedDisplayFailed(detail)
}

async fn report_failure(notifier: &Notifier, note_index: usize, e: ClientError) -> VoteOutcome {
    match e {
        ClientError::Rejected(message) => {
            warn!("Vote on note {} rejected: {}", note_index, message);
            notifier
                .show(format!("Error: {}", message), Severity::Error)
                .await;
            VoteOutcome::Rejected(message)
        }
        other => {
            error!("Vote on note {} failed: {}", note_index, other);
            notifier.show(NETWORK_ERROR_MESSAGE, Severity::Error).await;
            VoteOutcome::NetworkFailure(other.to_string())
        }
    }
}
