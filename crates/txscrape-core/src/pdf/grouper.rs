//! Clusters positioned fragments into text lines.

use super::TextFragment;

/// One reconstructed line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Vertical position of the first fragment that opened the line.
    pub y: f32,
    pub text: String,
}

/// Group fragments whose `y` lies within `tolerance` of a line's
/// representative `y`, then order lines top of page first.
///
/// Single greedy pass: each fragment joins the first line (in creation
/// order) within tolerance. Distinct visual lines can merge when the layout
/// is tight; that is accepted.
pub fn group_lines(fragments: &[TextFragment], tolerance: f32) -> Vec<TextLine> {
    let mut lines: Vec<(f32, Vec<&str>)> = Vec::new();

    for fragment in fragments {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }

        match lines
            .iter_mut()
            .find(|(y, _)| (fragment.y - *y).abs() <= tolerance)
        {
            Some((_, parts)) => parts.push(text),
            None => lines.push((fragment.y, vec![text])),
        }
    }

    // Stable sort keeps creation order for equal y.
    lines.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    lines
        .into_iter()
        .map(|(y, parts)| TextLine {
            y,
            text: parts.join(" "),
        })
        .collect()
}
