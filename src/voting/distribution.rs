use std::fmt::Write;

use crate::error::RenderError;
use crate::models::VoteDistribution;
use crate::voting::{escape_html, percent, percent_half_even};

pub const NO_VOTES_FRAGMENT: &str =
    "<small class=\"text-warning\"><strong>No votes yet</strong> - be the first to classify!</small>";

/// Entries of `votes` by count descending. Equal counts keep server order.
pub fn sorted_votes(distribution: &VoteDistribution) -> Vec<(&str, u64)> {
    let mut sorted: Vec<(&str, u64)> = distribution
        .votes
        .iter()
        .map(|(code, count)| (code.as_str(), *count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted
}

/// Builds the vote-distribution region of a note card.
///
/// Pure: the same distribution and vote always yield the same markup.
pub fn render_distribution(
    distribution: &VoteDistribution,
    user_vote: Option<&str>,
) -> Result<String, RenderError> {
    if distribution.total == 0 {
        return Ok(NO_VOTES_FRAGMENT.to_string());
    }

    let consensus = distribution
        .consensus
        .as_deref()
        .ok_or(RenderError::MissingConsensus(distribution.total))?;

    let mut html = String::from("<small class=\"text-muted\"><strong>All Votes:</strong><br>");

    for (code, count) in sorted_votes(distribution) {
        let probability = distribution
            .probabilities
            .get(code)
            .copied()
            .ok_or_else(|| RenderError::MissingProbability(code.to_string()))?;
        let badge = if code == consensus { "success" } else { "secondary" };
        write!(
            html,
            "<span class=\"badge bg-{} me-1\">{}: {}% ({})</span>",
            badge,
            escape_html(&code.to_uppercase()),
            percent(probability),
            count
        )?;
    }

    html.push_str("</small><br><small><strong>Consensus:</strong> ");
    write!(
        html,
        "<span class=\"badge bg-primary\">{}</span> ",
        escape_html(&consensus.to_uppercase())
    )?;
    write!(
        html,
        "at {}% confidence ({} vote{})",
        percent(distribution.consensus_probability),
        distribution.total,
        if distribution.total != 1 { "s" } else { "" }
    )?;

    if distribution.is_contentious {
        html.push_str(" <span class=\"badge bg-warning text-dark\">CONTENTIOUS</span>");
    }
    html.push_str("</small>");

    if let Some(vote) = user_vote {
        write!(
            html,
            "<br><small class=\"text-info\"><strong>Your vote:</strong> {}</small>",
            escape_html(&vote.to_uppercase())
        )?;
    }

    Ok(html)
}

/// One-line text form, e.g. `W: 50% (3), O: 33% (2), A: 17% (1)`.
pub fn format_vote_summary(distribution: &VoteDistribution) -> String {
    if distribution.votes.is_empty() {
        return "No votes yet".to_string();
    }

    sorted_votes(distribution)
        .into_iter()
        .map(|(code, count)| {
            let probability = distribution.probabilities.get(code).copied().unwrap_or(0.0);
            format!("{}: {}% ({})", code.to_uppercase(), percent_half_even(probability), count)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
