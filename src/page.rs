//! Reading note cards out of a server-rendered record page, and writing a
//! card's current state back out as markup.

use lazy_static::lazy_static;
use regex::Regex;

use crate::cards::{IdenticalNotesToggle, NoteCard, VoteButton};
use crate::error::PageError;
use crate::voting::escape_html;
use crate::voting::highlight::ButtonStyle;
use crate::voting::known_color;

lazy_static! {
    static ref BIB_ID: Regex =
        Regex::new(r#"(?:const|let|var)\s+BIB_ID\s*=\s*["']([^"']*)["']"#).unwrap();
    static ref DIV_OPEN: Regex = Regex::new(r"<div\b[^>]*>").unwrap();
    static ref DIV_BOUNDARY: Regex = Regex::new(r"<(/?)div\b[^>]*>").unwrap();
    static ref BUTTON_OPEN: Regex = Regex::new(r"<button\b[^>]*>").unwrap();
    static ref INPUT_TAG: Regex = Regex::new(r"<input\b[^>]*>").unwrap();
    static ref ATTR: Regex =
        Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref DISPLAY_NONE: Regex = Regex::new(r"display\s*:\s*none").unwrap();
}

/// The note cards of one bibliographic record.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub bib_id: String,
    pub cards: Vec<NoteCard>,
}

impl RecordPage {
    pub fn parse(html: &str) -> Result<Self, PageError> {
        let bib_id = BIB_ID
            .captures(html)
            .map(|c| unescape_html(&c[1]))
            .ok_or(PageError::MissingBibId)?;

        let starts: Vec<(usize, &str)> = DIV_OPEN
            .find_iter(html)
            .filter(|m| has_class(m.as_str(), "note-card"))
            .map(|m| (m.start(), m.as_str()))
            .collect();

        let mut cards = Vec::with_capacity(starts.len());
        for (i, (start, tag)) in starts.iter().enumerate() {
            let end = starts.get(i + 1).map(|(s, _)| *s).unwrap_or(html.len());
            cards.push(parse_card(tag, &html[*start..end])?);
        }

        Ok(Self { bib_id, cards })
    }

    pub fn card_mut(&mut self, note_index: usize) -> Option<&mut NoteCard> {
        self.cards.iter_mut().find(|c| c.note_index == note_index)
    }
}

fn parse_card(tag: &str, segment: &str) -> Result<NoteCard, PageError> {
    let raw_index = attr(tag, "data-note-index").unwrap_or("");
    let note_index: usize = raw_index
        .trim()
        .parse()
        .map_err(|_| PageError::BadNoteIndex(raw_index.to_string()))?;

    let (distribution_tag, distribution_html) =
        region(segment, "vote-distribution").ok_or(PageError::MissingDistribution(note_index))?;
    let votes_visible = attr(distribution_tag, "style")
        .map(|s| !DISPLAY_NONE.is_match(s))
        .unwrap_or(true);

    let voters_html = region(segment, "voters-section").map(|(_, inner)| inner.to_string());

    let buttons = BUTTON_OPEN
        .find_iter(segment)
        .map(|m| m.as_str())
        .filter(|t| has_class(t, "vote-btn"))
        .filter_map(|t| {
            let code = attr(t, "data-classification")?;
            Some(VoteButton {
                code: unescape_html(code),
                style: style_from_classes(attr(t, "class").unwrap_or("")),
                disabled: has_flag(t, "disabled"),
            })
        })
        .collect();

    let vote_all = INPUT_TAG
        .find_iter(segment)
        .map(|m| m.as_str())
        .find(|t| has_class(t, "vote-all-identical"))
        .and_then(|t| {
            Some(IdenticalNotesToggle {
                note_text: unescape_html(attr(t, "data-note-text")?),
                checked: has_flag(t, "checked"),
            })
        });

    Ok(NoteCard::from_parts(
        note_index,
        distribution_html.to_string(),
        voters_html,
        buttons,
        vote_all,
        votes_visible,
    ))
}

/// Writes a card's current state as note-card markup.
pub fn render_card(card: &NoteCard) -> String {
    let mut html = format!("<div class=\"note-card\" data-note-index=\"{}\">", card.note_index);

    html.push_str(&format!(
        "<div class=\"vote-status\" style=\"display: {}\">\
         <span class=\"spinner-border spinner-border-sm\"></span> Saving...</div>",
        if card.loading { "block" } else { "none" }
    ));

    for button in &card.buttons {
        html.push_str(&format!(
            "<button type=\"button\" class=\"{}\" data-classification=\"{}\"{}>{}</button>",
            button.style.class_list(),
            escape_html(&button.code),
            if button.disabled { " disabled" } else { "" },
            escape_html(&button.code.to_uppercase())
        ));
    }

    if let Some(toggle) = &card.vote_all {
        html.push_str(&format!(
            "<label><input type=\"checkbox\" class=\"form-check-input vote-all-identical\" data-note-text=\"{}\"{}> \
             Vote on all identical notes</label>",
            escape_html(&toggle.note_text),
            if toggle.checked { " checked" } else { "" }
        ));
    }

    html.push_str(&format!(
        "<button type=\"button\" class=\"btn btn-sm btn-link toggle-votes-btn\">{}</button>",
        card.toggle_label
    ));

    let display = if card.votes_visible { "block" } else { "none" };
    html.push_str(&format!(
        "<div class=\"vote-distribution\" style=\"display: {}\">{}</div>",
        display, card.distribution_html
    ));
    if let Some(voters) = &card.voters_html {
        html.push_str(&format!(
            "<div class=\"voters-section\" style=\"display: {}\">{}</div>",
            display, voters
        ));
    }

    html.push_str("</div>");
    html
}

/// Opening tag and inner markup of the first `<div>` in `segment` carrying `class_name`.
fn region<'a>(segment: &'a str, class_name: &str) -> Option<(&'a str, &'a str)> {
    let open = DIV_OPEN
        .find_iter(segment)
        .find(|m| has_class(m.as_str(), class_name))?;
    let body = &segment[open.end()..];

    let mut depth = 1usize;
    for cap in DIV_BOUNDARY.captures_iter(body) {
        if &cap[1] == "/" {
            depth -= 1;
            if depth == 0 {
                let close = cap.get(0)?.start();
                return Some((open.as_str(), &body[..close]));
            }
        } else {
            depth += 1;
        }
    }
    // Unclosed: take everything up to the next card.
    Some((open.as_str(), body))
}

fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    ATTR.captures_iter(tag)
        .find(|c| c[1].eq_ignore_ascii_case(name))
        .and_then(|c| c.get(2).or_else(|| c.get(3)))
        .map(|m| m.as_str())
}

fn has_class(tag: &str, class_name: &str) -> bool {
    attr(tag, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// Valueless boolean attribute such as `checked` or `disabled`.
fn has_flag(tag: &str, flag: &str) -> bool {
    let stripped = ATTR.replace_all(tag, "");
    stripped
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/')
        .split_whitespace()
        .skip(1)
        .any(|word| word.eq_ignore_ascii_case(flag))
}

fn style_from_classes(classes: &str) -> ButtonStyle {
    for class in classes.split_whitespace() {
        if let Some(color) = class.strip_prefix("btn-outline-").and_then(known_color) {
            return ButtonStyle::Outline(color);
        }
        if let Some(color) = class.strip_prefix("btn-").and_then(known_color) {
            return ButtonStyle::Solid(color);
        }
    }
    ButtonStyle::Base
}

fn unescape_html(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
