use std::ops::{Deref, DerefMut};

use log::{error, warn};

use crate::error::RenderError;
use crate::models::{Classification, VoteDistribution, VoterRoster};
use crate::voting::distribution::{render_distribution, NO_VOTES_FRAGMENT};
use crate::voting::highlight::ButtonStyle;
use crate::voting::roster::render_roster;

pub const HIDE_VOTES_LABEL: &str = "<i class=\"fas fa-eye-slash\"></i> Hide Other Votes";
pub const SHOW_VOTES_LABEL: &str = "<i class=\"fas fa-eye\"></i> Show Other Votes";

#[derive(Debug, Clone, PartialEq)]
pub struct VoteButton {
    /// Raw `data-classification` value.
    pub code: String,
    pub style: ButtonStyle,
    pub disabled: bool,
}

impl VoteButton {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            style: ButtonStyle::Base,
            disabled: false,
        }
    }
}

/// The "vote on all identical notes" checkbox, bound to the note's literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdenticalNotesToggle {
    pub note_text: String,
    pub checked: bool,
}

/// One rendered note and the UI state it owns.
#[derive(Debug, Clone)]
pub struct NoteCard {
    pub note_index: usize,
    pub distribution_html: String,
    /// `None` when the page rendered no voters section for this card.
    pub voters_html: Option<String>,
    pub loading: bool,
    pub buttons: Vec<VoteButton>,
    pub vote_all: Option<IdenticalNotesToggle>,
    pub votes_visible: bool,
    pub toggle_label: String,
    in_flight: bool,
}

impl NoteCard {
    /// A fresh card with one button per classification and no votes shown.
    pub fn new(note_index: usize, note_text: Option<String>) -> Self {
        let buttons = Classification::ALL
            .iter()
            .map(|c| VoteButton::new(c.code()))
            .collect();
        Self::from_parts(
            note_index,
            NO_VOTES_FRAGMENT.to_string(),
            render_roster(None).ok(),
            buttons,
            note_text.map(|note_text| IdenticalNotesToggle {
                note_text,
                checked: false,
            }),
            true,
        )
    }

    pub fn from_parts(
        note_index: usize,
        distribution_html: String,
        voters_html: Option<String>,
        buttons: Vec<VoteButton>,
        vote_all: Option<IdenticalNotesToggle>,
        votes_visible: bool,
    ) -> Self {
        Self {
            note_index,
            distribution_html,
            voters_html,
            loading: false,
            buttons,
            vote_all,
            votes_visible,
            toggle_label: toggle_label(votes_visible).to_string(),
            in_flight: false,
        }
    }

    pub fn button(&self, code: &str) -> Option<&VoteButton> {
        self.buttons.iter().find(|b| b.code == code)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn set_vote_all(&mut self, checked: bool) {
        match self.vote_all.as_mut() {
            Some(toggle) => toggle.checked = checked,
            None => warn!("Note {} has no identical-notes toggle", self.note_index),
        }
    }

    /// Note text to bulk-vote on, if the opt-in is checked right now.
    pub fn identical_vote_text(&self) -> Option<&str> {
        self.vote_all
            .as_ref()
            .filter(|t| t.checked)
            .map(|t| t.note_text.as_str())
    }

    /// Shows or hides the distribution and roster together. Returns the new visibility.
    pub fn toggle_votes(&mut self) -> bool {
        self.votes_visible = !self.votes_visible;
        self.toggle_label = toggle_label(self.votes_visible).to_string();
        self.votes_visible
    }

    /// Replaces the distribution region wholesale.
    pub fn update_vote_display(
        &mut self,
        distribution: &VoteDistribution,
        user_vote: Option<&str>,
    ) -> Result<(), RenderError> {
        self.distribution_html = render_distribution(distribution, user_vote)?;
        Ok(())
    }

    /// Replaces the roster region. Never fails; problems are logged.
    pub fn update_voters_display(&mut self, roster: Option<&VoterRoster>) {
        let Some(section) = self.voters_html.as_mut() else {
            error!("Voters section not found in note card {}", self.note_index);
            return;
        };

        match render_roster(roster) {
            Ok(html) => *section = html,
            Err(e) => error!("Error updating voters display for note {}: {}", self.note_index, e),
        }
    }

    /// Latches the card for one submission.
    ///
    /// Returns `None` while another submission on this card is outstanding.
    /// The returned guard undoes the in-progress state when dropped.
    ///
    /// A caller holding `&mut self` cannot start a second submission on the
    /// same card anyway; the latch catches card state cloned or carried
    /// elsewhere while a submission is in flight.
    pub fn begin_submit(&mut self, code: &str) -> Option<SubmitGuard<'_>> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.loading = true;
        if let Some(button) = self.buttons.iter_mut().find(|b| b.code == code) {
            button.disabled = true;
        }
        Some(SubmitGuard {
            card: self,
            code: code.to_string(),
        })
    }
}

fn toggle_label(visible: bool) -> &'static str {
    if visible { HIDE_VOTES_LABEL } else { SHOW_VOTES_LABEL }
}

/// Holds a card in its in-progress state for the life of one submission.
pub struct SubmitGuard<'a> {
    card: &'a mut NoteCard,
    code: String,
}

impl Deref for SubmitGuard<'_> {
    type Target = NoteCard;

    fn deref(&self) -> &NoteCard {
        self.card
    }
}

impl DerefMut for SubmitGuard<'_> {
    fn deref_mut(&mut self) -> &mut NoteCard {
        self.card
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.card.loading = false;
        if let Some(button) = self.card.buttons.iter_mut().find(|b| b.code == self.code) {
            button.disabled = false;
        }
        self.card.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_starts_empty() {
        let card = NoteCard::new(3, None);
        assert_eq!(card.distribution_html, NO_VOTES_FRAGMENT);
        assert!(card.voters_html.as_deref().unwrap().contains("No votes yet"));
        assert!(card.votes_visible);
        assert_eq!(card.toggle_label, HIDE_VOTES_LABEL);
        assert!(card.buttons.iter().all(|b| b.style == ButtonStyle::Base && !b.disabled));
    }

    #[test]
    fn toggle_flips_visibility_and_label() {
        let mut card = NoteCard::new(0, None);
        assert!(!card.toggle_votes());
        assert_eq!(card.toggle_label, SHOW_VOTES_LABEL);
        assert!(card.toggle_votes());
        assert_eq!(card.toggle_label, HIDE_VOTES_LABEL);
    }

    #[test]
    fn identical_vote_text_only_when_checked() {
        let mut card = NoteCard::new(0, Some("Handwritten note".to_string()));
        assert_eq!(card.identical_vote_text(), None);
        card.set_vote_all(true);
        assert_eq!(card.identical_vote_text(), Some("Handwritten note"));

        let mut bare = NoteCard::new(1, None);
        bare.set_vote_all(true);
        assert_eq!(bare.identical_vote_text(), None);
    }

    #[test]
    fn guard_disables_and_restores() {
        let mut card = NoteCard::new(0, None);
        {
            let guard = card.begin_submit("a").unwrap();
            assert!(guard.loading);
            assert!(guard.is_in_flight());
            assert!(guard.button("a").unwrap().disabled);
            assert!(!guard.button("w").unwrap().disabled);
        }
        assert!(!card.loading);
        assert!(!card.is_in_flight());
        assert!(!card.button("a").unwrap().disabled);
    }

    #[test]
    fn second_submit_is_refused_while_latched() {
        let mut card = NoteCard::new(0, None);
        let mut guard = card.begin_submit("w").unwrap();
        assert!(guard.begin_submit("o").is_none());
        drop(guard);
        assert!(card.begin_submit("o").is_some());
    }

    #[test]
    fn missing_voters_section_is_tolerated() {
        let mut card = NoteCard::from_parts(0, String::new(), None, Vec::new(), None, true);
        card.update_voters_display(Some(&VoterRoster::new()));
        assert!(card.voters_html.is_none());
    }

    #[test]
    fn failed_render_leaves_distribution_untouched() {
        let mut card = NoteCard::new(0, None);
        let broken = VoteDistribution {
            total: 2,
            ..Default::default()
        };
        assert!(card.update_vote_display(&broken, Some("w")).is_err());
        assert_eq!(card.distribution_html, NO_VOTES_FRAGMENT);
    }
}
