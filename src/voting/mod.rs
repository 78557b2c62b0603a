pub mod distribution;
pub mod highlight;
pub mod roster;

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Color used for any code the registry does not know.
pub const FALLBACK_COLOR: &str = "secondary";

lazy_static! {
    // Bootstrap color category per classification code
    static ref CLASSIFICATION_COLORS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("w", "info");
        m.insert("o", "warning");
        m.insert("a", "success");
        m.insert("ow", "secondary");
        m.insert("aw", "dark");
        m.insert("ao", "primary");
        m.insert("?", "danger");
        m
    };
}

/// Presentation color for a classification code.
pub fn color_for_classification(code: &str) -> &'static str {
    CLASSIFICATION_COLORS
        .get(code)
        .copied()
        .unwrap_or(FALLBACK_COLOR)
}

/// The registry's own `&'static` name for a color, if it uses that color at all.
pub fn known_color(name: &str) -> Option<&'static str> {
    CLASSIFICATION_COLORS.values().copied().find(|c| *c == name)
}

/// Whole-number percentage, rounded half away from zero.
pub fn percent(probability: f64) -> i64 {
    (probability * 100.0).round() as i64
}

/// Whole-number percentage with halves going to the even neighbour, as the
/// server's own text reports print them.
pub fn percent_half_even(probability: f64) -> i64 {
    (probability * 100.0).round_ties_even() as i64
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;

    #[test]
    fn every_code_has_its_own_color() {
        let expected = [
            ("w", "info"),
            ("o", "warning"),
            ("a", "success"),
            ("ow", "secondary"),
            ("aw", "dark"),
            ("ao", "primary"),
            ("?", "danger"),
        ];
        for (code, color) in expected {
            assert_eq!(color_for_classification(code), color);
        }
        for c in Classification::ALL {
            assert!(!color_for_classification(c.code()).is_empty());
        }
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(color_for_classification("zz"), FALLBACK_COLOR);
        assert_eq!(color_for_classification(""), FALLBACK_COLOR);
        assert_eq!(color_for_classification("W"), FALLBACK_COLOR);
    }

    #[test]
    fn text_percent_rounds_half_to_even() {
        assert_eq!(percent_half_even(0.125), 12);
        assert_eq!(percent_half_even(0.875), 88);
        assert_eq!(percent_half_even(0.667), 67);
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(percent(0.667), 67);
        assert_eq!(percent(0.333), 33);
        assert_eq!(percent(0.125), 13);
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(1.0), 100);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }
}
