//! Text sanitization and number formatting for rendered labels.
//!
//! Everything user-controlled (name, bio, company, repository names) passes
//! through [`sanitize`] before it reaches the rasterizer: control characters,
//! pictographic/emoji code points and joiner/variation-selector characters
//! are stripped and whitespace runs collapsed, so a hostile profile cannot
//! crash the font shaper or leave fallback tofu in the output image.

/// Returns true for code points the rasterizer should never see:
/// C0/C1 controls and DEL.
fn is_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

/// Zero-width joiner and variation selectors, dropped without replacement.
fn is_joiner_or_selector(c: char) -> bool {
    matches!(c, '\u{200D}' | '\u{FE0E}' | '\u{FE0F}')
}

/// Pictographic / emoji code points, replaced with a space. The ranges cover
/// the emoji presentation blocks rather than the full Extended_Pictographic
/// property table; anything the fonts can shape as plain symbols stays.
fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x2190..=0x21FF      // arrows with emoji presentations
        | 0x2300..=0x23FF    // misc technical (watch, hourglass)
        | 0x2600..=0x27BF    // misc symbols + dingbats
        | 0x2B00..=0x2BFF    // misc symbols and arrows
        | 0x1F000..=0x1FAFF  // emoji planes (mahjong .. symbols ext-A)
        | 0x1FB00..=0x1FBFF
    )
}

/// Normalize a free-text field into something safe to render.
///
/// Controls and pictographs become spaces, joiners/selectors vanish, and any
/// run of whitespace collapses to a single space. The result is trimmed.
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for c in value.chars() {
        if is_joiner_or_selector(c) {
            continue;
        }
        if c.is_whitespace() || is_control(c) || is_pictographic(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// Format an integer with grouped digits, e.g. `1234` -> `"1,234"`.
pub fn format_grouped(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Compact notation, e.g. `1234` -> `"1.2K"`, `2_000_000` -> `"2M"`.
pub fn format_compact(n: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];
    for (scale, suffix) in UNITS {
        if n >= scale {
            let scaled = n as f64 / scale as f64;
            return if scaled >= 10.0 || (scaled * 10.0).round() % 10.0 == 0.0 {
                format!("{}{}", scaled.round() as u64, suffix)
            } else {
                format!("{:.1}{}", (scaled * 10.0).floor() / 10.0, suffix)
            };
        }
    }
    n.to_string()
}

/// Deterministic truncation to a fixed character budget with an ellipsis.
pub fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Greedy word wrap at an estimated character budget per line.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if !cur.is_empty() && cur.chars().count() + word.chars().count() + 1 > chars_per_line {
            lines.push(cur);
            cur = word.to_string();
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_controls_and_emoji() {
        let dirty = "Rust\u{0007} dev \u{1F980}\u{FE0F} at\u{200D} home";
        let clean = sanitize(dirty);
        assert_eq!(clean, "Rust dev at home");
        assert!(!clean.chars().any(is_control));
        assert!(!clean.chars().any(is_pictographic));
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize("  a \t\n  b   c  "), "a b c");
        // No run of whitespace longer than one character survives.
        assert!(!sanitize("a \u{1F600} \u{1F600} b").contains("  "));
    }

    #[test]
    fn sanitize_keeps_plain_unicode() {
        assert_eq!(sanitize("Łukasz Müller 北京"), "Łukasz Müller 北京");
    }

    #[test]
    fn grouped_digits() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1234), "1,234");
        assert_eq!(format_grouped(50_669_803), "50,669,803");
    }

    #[test]
    fn compact_notation() {
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(1_234), "1.2K");
        assert_eq!(format_compact(2_000), "2K");
        assert_eq!(format_compact(15_400), "15K");
        assert_eq!(format_compact(3_400_000), "3.4M");
    }

    #[test]
    fn truncation_is_deterministic() {
        assert_eq!(truncate_label("short", 14), "short");
        assert_eq!(truncate_label("a-very-long-repository", 14), "a-very-long-r…");
        assert_eq!(truncate_label("a-very-long-repository", 14).chars().count(), 14);
    }

    #[test]
    fn wrap_respects_budget() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }
}
