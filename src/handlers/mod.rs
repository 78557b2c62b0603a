pub mod vote;

use log::{error, info};

use crate::client::VoteBackend;
use crate::page::RecordPage;
use crate::tasks::notifier::Notifier;

pub use vote::{submit_vote, VoteOutcome};

/// A user action on one note card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Click on the vote button carrying `classification`.
    Vote { note_index: usize, classification: String },
    /// Click on the show/hide-votes control.
    ToggleVotes { note_index: usize },
    /// Check or uncheck "vote on all identical notes".
    SetVoteAll { note_index: usize, checked: bool },
}

impl Interaction {
    pub fn note_index(&self) -> usize {
        match self {
            Interaction::Vote { note_index, .. }
            | Interaction::ToggleVotes { note_index }
            | Interaction::SetVoteAll { note_index, .. } => *note_index,
        }
    }
}

/// Routes one interaction to the card it targets.
///
/// Returns the vote outcome for vote clicks, `None` for local-only actions
/// and for cards that are not on the page.
pub async fn handle_interaction(
    backend: &dyn VoteBackend,
    notifier: &Notifier,
    page: &mut RecordPage,
    interaction: Interaction,
) -> Option<VoteOutcome> {
    let note_index = interaction.note_index();
    let bib_id = page.bib_id.clone();

    let Some(card) = page.card_mut(note_index) else {
        error!("No note card {} on record {}", note_index, bib_id);
        return None;
    };

    match interaction {
        Interaction::Vote { classification, .. } => {
            Some(submit_vote(backend, notifier, card, &bib_id, &classification).await)
        }
        Interaction::ToggleVotes { .. } => {
            let visible = card.toggle_votes();
            info!("Note {} votes {}", note_index, if visible { "shown" } else { "hidden" });
            None
        }
        Interaction::SetVoteAll { checked, .. } => {
            card.set_vote_all(checked);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::NoteCard;
    use crate::error::ClientError;
    use crate::models::{IdenticalVoteRequest, IdenticalVoteSummary, VoteRecorded, VoteRequest};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Unreachable;

    #[async_trait]
    impl VoteBackend for Unreachable {
        async fn vote(&self, _: &VoteRequest) -> Result<VoteRecorded, ClientError> {
            Err(ClientError::Transport("unreachable".to_string()))
        }

        async fn vote_identical(
            &self,
            _: &IdenticalVoteRequest,
        ) -> Result<IdenticalVoteSummary, ClientError> {
            Err(ClientError::Transport("unreachable".to_string()))
        }
    }

    fn page() -> RecordPage {
        RecordPage {
            bib_id: "B100".to_string(),
            cards: vec![NoteCard::new(0, Some("Handwritten note".to_string())), NoteCard::new(1, None)],
        }
    }

    #[tokio::test]
    async fn toggle_and_opt_in_are_local() {
        let notifier = Notifier::new(Duration::from_secs(60));
        let mut page = page();

        let out = handle_interaction(&Unreachable, &notifier, &mut page, Interaction::ToggleVotes { note_index: 1 }).await;
        assert!(out.is_none());
        assert!(!page.cards[1].votes_visible);

        handle_interaction(
            &Unreachable,
            &notifier,
            &mut page,
            Interaction::SetVoteAll { note_index: 0, checked: true },
        )
        .await;
        assert_eq!(page.cards[0].identical_vote_text(), Some("Handwritten note"));
        assert!(notifier.current().await.is_none());
    }

    #[tokio::test]
    async fn vote_routes_to_the_right_card() {
        let notifier = Notifier::new(Duration::from_secs(60));
        let mut page = page();

        let out = handle_interaction(
            &Unreachable,
            &notifier,
            &mut page,
            Interaction::Vote { note_index: 1, classification: "w".to_string() },
        )
        .await;
        assert!(matches!(out, Some(VoteOutcome::NetworkFailure(_))));
    }

    #[tokio::test]
    async fn missing_card_is_logged_not_fatal() {
        let notifier = Notifier::new(Duration::from_secs(60));
        let mut page = page();

        let out = handle_interaction(
            &Unreachable,
            &notifier,
            &mut page,
            Interaction::Vote { note_index: 9, classification: "w".to_string() },
        )
        .await;
        assert!(out.is_none());
        assert!(notifier.current().await.is_none());
    }
}
