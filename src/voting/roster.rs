use std::fmt::Write;

use crate::error::RenderError;
use crate::models::VoterRoster;
use crate::voting::escape_html;

const HEADER: &str = "<h6 class=\"mb-2\">Who Voted?</h6>";

/// Builds the "Who Voted?" region of a note card.
///
/// Codes are listed in lexicographic order; usernames keep server order.
pub fn render_roster(roster: Option<&VoterRoster>) -> Result<String, RenderError> {
    let roster = match roster {
        Some(r) if !r.is_empty() => r,
        _ => return Ok(format!("{}<small class=\"text-muted\">No votes yet</small>", HEADER)),
    };

    let mut html = format!("{}<div class=\"voters-list\">", HEADER);
    for (code, users) in roster {
        html.push_str("<div class=\"mb-2\">");
        write!(
            html,
            "<span class=\"badge bg-primary\">{}</span>",
            escape_html(&code.to_uppercase())
        )?;
        html.push_str("<div class=\"mt-1\">");
        for username in users {
            write!(
                html,
                "<small class=\"badge bg-secondary me-1\">{}</small>",
                escape_html(username)
            )?;
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div>");

    Ok(html)
}
