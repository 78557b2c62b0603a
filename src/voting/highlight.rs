use crate::cards::NoteCard;
use crate::voting::color_for_classification;

const BASE_CLASSES: &str = "btn btn-sm vote-btn";

/// Visual state of a vote button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Base,
    Solid(&'static str),
    Outline(&'static str),
}

impl ButtonStyle {
    /// Full `class` attribute value.
    pub fn class_list(&self) -> String {
        match self {
            ButtonStyle::Base => BASE_CLASSES.to_string(),
            ButtonStyle::Solid(color) => format!("{} btn-{}", BASE_CLASSES, color),
            ButtonStyle::Outline(color) => format!("{} btn-outline-{}", BASE_CLASSES, color),
        }
    }

    /// Style for `code` given the user's current selection.
    pub fn for_selection(code: &str, selected: &str) -> Self {
        let color = color_for_classification(code);
        if code == selected {
            ButtonStyle::Solid(color)
        } else {
            ButtonStyle::Outline(color)
        }
    }
}

/// Solid style for the selected code, outline for every other button.
pub fn reconcile(card: &mut NoteCard, selected: &str) {
    for button in card.buttons.iter_mut() {
        // Replacing the whole style drops any earlier variant.
        button.style = ButtonStyle::for_selection(&button.code, selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;

    #[test]
    fn class_lists() {
        assert_eq!(ButtonStyle::Base.class_list(), "btn btn-sm vote-btn");
        assert_eq!(ButtonStyle::Solid("info").class_list(), "btn btn-sm vote-btn btn-info");
        assert_eq!(
            ButtonStyle::Outline("danger").class_list(),
            "btn btn-sm vote-btn btn-outline-danger"
        );
    }

    #[test]
    fn selected_button_is_solid_others_outline() {
        let mut card = NoteCard::new(0, Some("note".to_string()));
        reconcile(&mut card, "w");

        for button in &card.buttons {
            let color = color_for_classification(&button.code);
            if button.code == "w" {
                assert_eq!(button.style, ButtonStyle::Solid("info"));
            } else {
                assert_eq!(button.style, ButtonStyle::Outline(color));
            }
        }
        assert_eq!(card.buttons.len(), Classification::ALL.len());
    }

    #[test]
    fn reselecting_moves_the_highlight() {
        let mut card = NoteCard::new(1, None);
        reconcile(&mut card, "w");
        reconcile(&mut card, "?");
        let solid: Vec<_> = card
            .buttons
            .iter()
            .filter(|b| matches!(b.style, ButtonStyle::Solid(_)))
            .map(|b| b.code.as_str())
            .collect();
        assert_eq!(solid, ["?"]);
    }
}
