//! Paragraph accumulator: a string with emphasis spans and geometry.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use unicode_normalization::char::decompose_compatible;

use super::{FormatKind, FormatSpan, Fragment};

/// Decoder artifacts that stand for a plain hyphen. Longer sequences first.
const MALFORMED_HYPHENS: &[&str] = &[
    "â€\u{90}", "â€‘", "Â\u{AD}", "\u{2010}", "\u{2011}", "\u{2012}", "\u{2212}", "\u{AD}",
];

/// Invisible characters some decoders emit between glyph runs.
const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{FEFF}'];

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize a fragment's text before it joins a run.
///
/// Whitespace runs collapse to a single space, zero-width characters are
/// dropped, presentation-form ligatures
/// (U+FB00..U+FB06) are expanded and malformed hyphen sequences become `-`.
pub fn normalize_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for c in raw.chars() {
        if ZERO_WIDTH.contains(&c) {
            continue;
        }
        if ('\u{FB00}'..='\u{FB06}').contains(&c) {
            decompose_compatible(c, |d| text.push(d));
        } else {
            text.push(c);
        }
    }

    for seq in MALFORMED_HYPHENS {
        if text.contains(seq) {
            text = text.replace(seq, "-");
        }
    }

    whitespace_regex().replace_all(&text, " ").into_owned()
}

/// A run of paragraph (or table cell) text with formatting spans.
///
/// Spans are kept in ascending, non-overlapping order and adjacent spans of
/// the same kind are merged as they are recorded. The geometry fields exist
/// for table column matching: `y` and `height` follow the most recently
/// appended fragment while `x`/`width` grow to the union of all fragments.
#[derive(Debug, Clone, Default)]
pub struct TextRun {
    text: String,
    spans: Vec<FormatSpan>,
    fragments: usize,
    /// Left edge of the run
    pub x: f32,
    /// Y position of the latest fragment
    pub y: f32,
    /// Horizontal extent of the run
    pub width: f32,
    /// Height of the latest fragment
    pub height: f32,
}

impl TextRun {
    /// Create a new empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a run holding a single fragment.
    pub fn from_fragment(fragment: &Fragment, kind: FormatKind) -> Self {
        let mut run = Self::new();
        run.append(fragment, kind);
        run
    }

    /// The merged string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Formatting spans, ascending by start.
    pub fn spans(&self) -> &[FormatSpan] {
        &self.spans
    }

    /// Number of fragments that contributed to this run.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// String with emphasis markers around each formatted span.
    pub fn markup(&self) -> String {
        self.to_string()
    }

    /// Check if the run has no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if the run is empty or holds only whitespace.
    pub fn is_only_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if the string ends with whitespace.
    pub fn ends_with_space(&self) -> bool {
        self.text.ends_with(char::is_whitespace)
    }

    /// Right edge of the run.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Horizontal centre of the run.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Check if an x coordinate falls within the run's horizontal extent.
    pub fn could_contain(&self, x: f32) -> bool {
        self.x <= x && x <= self.right()
    }

    /// Append a fragment's text at the tail.
    pub fn append(&mut self, fragment: &Fragment, kind: FormatKind) {
        let mut piece = normalize_text(&fragment.text);
        if piece.starts_with(' ')
            && (self.ends_with_space() || (self.text.is_empty() && piece != " "))
        {
            piece.remove(0);
        }

        if !piece.is_empty() {
            let start = self.text.len();
            let whitespace_only = piece.trim().is_empty();
            self.text.push_str(&piece);
            self.record_span(kind, start, piece.len(), whitespace_only);
        }

        if self.fragments == 0 || !fragment.is_only_whitespace() {
            self.extend_geometry(fragment);
        }
        self.fragments += 1;
    }

    /// Append a single space unless the run is empty or already ends with one.
    pub fn ensure_trailing_space(&mut self) {
        if self.text.is_empty() || self.ends_with_space() {
            return;
        }
        let start = self.text.len();
        self.text.push(' ');
        self.record_span(FormatKind::None, start, 1, true);
    }

    /// Glue `other` in front of this run, joined by `separator`.
    ///
    /// Used for vertically stacked labels: "Proficiency" prepended onto
    /// "Bonus" gives "Proficiency Bonus". Existing spans shift right by the
    /// inserted length.
    pub fn prepend(&mut self, other: &TextRun, separator: &str) {
        let head = other.text.trim_end();
        if head.is_empty() {
            return;
        }
        let head_len = head.len();

        let lead = self.text.len() - self.text.trim_start().len();
        let body = &self.text[lead..];
        let sep_len = if body.is_empty() { 0 } else { separator.len() };
        let offset = head_len + sep_len;

        let mut spans: Vec<FormatSpan> = other
            .spans
            .iter()
            .filter(|s| s.start < head_len)
            .map(|s| FormatSpan::new(s.kind, s.start, s.end().min(head_len) - s.start))
            .collect();
        if sep_len > 0 {
            match spans.last_mut() {
                Some(last) if last.end() == head_len => last.length += sep_len,
                _ => spans.push(FormatSpan::new(FormatKind::None, head_len, sep_len)),
            }
        }

        for span in &self.spans {
            let start = span.start.saturating_sub(lead);
            let end = span.end().saturating_sub(lead);
            if end > start {
                push_merged(
                    &mut spans,
                    FormatSpan::new(span.kind, start + offset, end - start),
                );
            }
        }

        let mut text = String::with_capacity(offset + body.len());
        text.push_str(head);
        if sep_len > 0 {
            text.push_str(separator);
        }
        text.push_str(body);

        self.text = text;
        self.spans = spans;

        if other.fragments > 0 {
            if self.fragments == 0 {
                self.x = other.x;
                self.width = other.width;
                self.y = other.y;
                self.height = other.height;
            } else {
                let left = self.x.min(other.x);
                let right = self.right().max(other.right());
                self.x = left;
                self.width = right - left;
            }
            self.fragments += other.fragments;
        }
    }

    /// Remove trailing whitespace, clipping spans to the new length.
    pub fn trim_end(&mut self) {
        let len = self.text.trim_end().len();
        self.text.truncate(len);
        self.spans.retain(|s| s.start < len);
        if let Some(last) = self.spans.last_mut() {
            if last.end() > len {
                last.length = len - last.start;
            }
        }
    }

    /// Remove leading whitespace, shifting spans left.
    pub fn trim_start(&mut self) {
        let lead = self.text.len() - self.text.trim_start().len();
        if lead == 0 {
            return;
        }
        self.text.drain(..lead);
        self.spans = self
            .spans
            .iter()
            .filter(|s| s.end() > lead)
            .map(|s| {
                let start = s.start.saturating_sub(lead);
                FormatSpan::new(s.kind, start, s.end() - lead - start)
            })
            .collect();
    }

    /// Remove leading and trailing whitespace.
    pub fn trim(&mut self) {
        self.trim_end();
        self.trim_start();
    }

    /// Append another run at the tail, separated by a single space.
    pub fn append_run(&mut self, other: &TextRun) {
        let body = other.text.trim_start();
        if body.is_empty() {
            return;
        }
        let lead = other.text.len() - body.len();

        self.ensure_trailing_space();
        let offset = self.text.len();
        self.text.push_str(body);
        for span in &other.spans {
            let start = span.start.saturating_sub(lead);
            let end = span.end().saturating_sub(lead);
            if end > start {
                push_merged(
                    &mut self.spans,
                    FormatSpan::new(span.kind, start + offset, end - start),
                );
            }
        }

        if self.fragments == 0 {
            self.x = other.x;
            self.width = other.width;
        } else {
            let left = self.x.min(other.x);
            let right = self.right().max(other.right());
            self.x = left;
            self.width = right - left;
        }
        self.y = other.y;
        self.height = other.height;
        self.fragments += other.fragments;
    }

    fn record_span(&mut self, kind: FormatKind, start: usize, length: usize, whitespace_only: bool) {
        if let Some(last) = self.spans.last_mut() {
            if last.end() == start && (last.kind == kind || whitespace_only) {
                last.length += length;
                return;
            }
        }
        self.spans.push(FormatSpan::new(kind, start, length));
    }

    fn extend_geometry(&mut self, fragment: &Fragment) {
        if self.fragments == 0 {
            self.x = fragment.x;
            self.width = fragment.width;
        } else {
            let left = self.x.min(fragment.x);
            let right = self.right().max(fragment.right());
            self.x = left;
            self.width = right - left;
        }
        self.y = fragment.y;
        self.height = fragment.height;
    }
}

fn push_merged(spans: &mut Vec<FormatSpan>, span: FormatSpan) {
    if let Some(last) = spans.last_mut() {
        if last.end() == span.start && last.kind == span.kind {
            last.length += span.length;
            return;
        }
    }
    spans.push(span);
}

impl fmt::Display for TextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cursor = 0;
        for span in &self.spans {
            if span.start > cursor {
                f.write_str(&self.text[cursor..span.start])?;
            }

            let piece = &self.text[span.start..span.end()];
            let marker = span.kind.marker();
            let inner = piece.trim();
            if marker.is_empty() || inner.is_empty() {
                f.write_str(piece)?;
            } else {
                // markers hug the text, surrounding whitespace stays outside
                let lead = &piece[..piece.len() - piece.trim_start().len()];
                let trail = &piece[piece.trim_end().len()..];
                write!(f, "{lead}{marker}{inner}{marker}{trail}")?;
            }
            cursor = span.end();
        }

        if cursor < self.text.len() {
            f.write_str(&self.text[cursor..])?;
        }
        Ok(())
    }
}

impl Serialize for TextRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TextRun", 3)?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("spans", &self.spans)?;
        state.serialize_field("markup", &self.markup())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str) -> Fragment {
        Fragment::new(text, 0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("the    "), "the ");
        assert_eq!(normalize_text("a \t\n b"), "a b");
        assert_eq!(normalize_text("    "), " ");
    }

    #[test]
    fn test_normalize_hyphens_and_ligatures() {
        assert_eq!(normalize_text("well\u{2010}known"), "well-known");
        assert_eq!(normalize_text("10â€‘foot"), "10-foot");
        assert_eq!(normalize_text("\u{FB01}re"), "fire");
        assert_eq!(normalize_text("o\u{FB00}ense"), "offense");
        assert_eq!(normalize_text("\u{200B}"), "");
    }

    #[test]
    fn test_append_merges_same_kind_spans() {
        let mut run = TextRun::new();
        run.append(&frag("Bold"), FormatKind::Bold);
        run.append(&frag("    "), FormatKind::Bold);
        run.append(&frag("+Also Bold"), FormatKind::Bold);

        assert_eq!(run.text(), "Bold +Also Bold");
        assert_eq!(run.spans(), &[FormatSpan::new(FormatKind::Bold, 0, 15)]);
    }

    #[test]
    fn test_append_different_kinds() {
        let mut run = TextRun::new();
        run.append(&frag("Rage. "), FormatKind::BoldItalic);
        run.append(&frag("In battle, you fight"), FormatKind::None);

        assert_eq!(
            run.spans(),
            &[
                FormatSpan::new(FormatKind::BoldItalic, 0, 6),
                FormatSpan::new(FormatKind::None, 6, 20),
            ]
        );
        assert_eq!(run.markup(), "***Rage.*** In battle, you fight");
    }

    #[test]
    fn test_whitespace_joins_previous_span() {
        let mut run = TextRun::new();
        run.append(&frag("Armor"), FormatKind::Bold);
        run.append(&frag(" "), FormatKind::None);
        run.append(&frag("Class"), FormatKind::Bold);

        assert_eq!(run.spans(), &[FormatSpan::new(FormatKind::Bold, 0, 11)]);
    }

    #[test]
    fn test_no_double_space_across_join() {
        let mut run = TextRun::new();
        run.append(&frag("on using "), FormatKind::None);
        run.append(&frag("  the"), FormatKind::None);
        assert_eq!(run.text(), "on using the");
    }

    #[test]
    fn test_prepend_label() {
        let mut bonus = TextRun::from_fragment(
            &Fragment::new("Bonus", 110.0, 700.0, 25.0, 9.0),
            FormatKind::Bold,
        );
        let proficiency = TextRun::from_fragment(
            &Fragment::new("Proficiency ", 100.0, 710.0, 45.0, 9.0),
            FormatKind::Bold,
        );

        bonus.prepend(&proficiency, " ");

        assert_eq!(bonus.text(), "Proficiency Bonus");
        assert_eq!(bonus.spans(), &[FormatSpan::new(FormatKind::Bold, 0, 17)]);
        assert_eq!(bonus.x, 100.0);
        assert_eq!(bonus.width, 45.0);
    }

    #[test]
    fn test_prepend_shifts_spans() {
        let mut run = TextRun::new();
        run.append(&frag(" plain"), FormatKind::None);
        run.append(&frag(" strong"), FormatKind::Bold);
        let label = TextRun::from_fragment(&frag("Label"), FormatKind::Italic);

        run.prepend(&label, ": ");

        assert_eq!(run.text(), "Label: plain strong");
        assert_eq!(
            run.spans(),
            &[
                FormatSpan::new(FormatKind::Italic, 0, 7),
                FormatSpan::new(FormatKind::None, 7, 5),
                FormatSpan::new(FormatKind::Bold, 12, 7),
            ]
        );
        assert_eq!(run.markup(), "*Label:* plain **strong**");
    }

    #[test]
    fn test_prepend_empty_other_is_noop() {
        let mut run = TextRun::from_fragment(&frag("Bonus"), FormatKind::None);
        run.prepend(&TextRun::from_fragment(&frag("   "), FormatKind::None), " ");
        assert_eq!(run.text(), "Bonus");
    }

    #[test]
    fn test_trim_end_clips_spans() {
        let mut run = TextRun::new();
        run.append(&frag("Speed"), FormatKind::Bold);
        run.append(&frag("30 ft.   "), FormatKind::None);
        run.trim_end();

        assert_eq!(run.text(), "Speed30 ft.");
        assert_eq!(run.spans().last(), Some(&FormatSpan::new(FormatKind::None, 5, 6)));
    }

    #[test]
    fn test_trim_end_whitespace_runs() {
        let mut run = TextRun::new();
        run.append(&frag("Speed"), FormatKind::None);
        run.append(&frag(" "), FormatKind::Bold);
        run.append(&frag("x"), FormatKind::Bold);
        run.trim_end();
        assert_eq!(run.spans().len(), 2);

        let mut ws = TextRun::from_fragment(&frag("   "), FormatKind::None);
        ws.trim_end();
        assert!(ws.is_empty());
        assert!(ws.spans().is_empty());
    }

    #[test]
    fn test_trim_start_shifts_spans() {
        let mut run = TextRun::from_fragment(&frag(" "), FormatKind::None);
        run.append(&frag("Rage"), FormatKind::Bold);
        run.trim();

        assert_eq!(run.text(), "Rage");
        assert_eq!(run.spans(), &[FormatSpan::new(FormatKind::Bold, 0, 4)]);
    }

    #[test]
    fn test_append_run() {
        let mut first = TextRun::from_fragment(
            &Fragment::new("Extra", 400.0, 700.0, 20.0, 9.0),
            FormatKind::None,
        );
        let second = TextRun::from_fragment(
            &Fragment::new("Attack", 398.0, 690.0, 25.0, 9.0),
            FormatKind::Italic,
        );
        first.append_run(&second);

        assert_eq!(first.text(), "Extra Attack");
        assert_eq!(
            first.spans(),
            &[
                FormatSpan::new(FormatKind::None, 0, 6),
                FormatSpan::new(FormatKind::Italic, 6, 6),
            ]
        );
        assert_eq!(first.x, 398.0);
        assert_eq!(first.y, 690.0);
        assert_eq!(first.fragment_count(), 2);
    }

    #[test]
    fn test_ensure_trailing_space() {
        let mut run = TextRun::from_fragment(&frag("word"), FormatKind::Bold);
        run.ensure_trailing_space();
        run.ensure_trailing_space();
        assert_eq!(run.text(), "word ");
        assert_eq!(run.spans(), &[FormatSpan::new(FormatKind::Bold, 0, 5)]);
    }

    #[test]
    fn test_geometry_tracks_union_and_latest() {
        let mut run = TextRun::new();
        run.append(&Fragment::new("Extra Attack,", 200.0, 680.0, 60.0, 9.0), FormatKind::None);
        run.append(&Fragment::new("Fast Movement", 195.0, 670.0, 70.0, 8.0), FormatKind::None);

        assert_eq!(run.x, 195.0);
        assert_eq!(run.width, 70.0);
        assert_eq!(run.y, 670.0);
        assert_eq!(run.height, 8.0);
        assert!(run.could_contain(260.0));
        assert!(!run.could_contain(270.0));
    }

    #[test]
    fn test_whitespace_fragment_keeps_geometry() {
        let mut run = TextRun::from_fragment(
            &Fragment::new("cell", 10.0, 100.0, 20.0, 9.0),
            FormatKind::None,
        );
        run.append(&Fragment::new(" ", 400.0, 100.0, 3.0, 9.0), FormatKind::None);
        assert_eq!(run.right(), 30.0);
    }

    #[test]
    fn test_serialize_has_markup() {
        let run = TextRun::from_fragment(&frag("Bold"), FormatKind::Bold);
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["text"], "Bold");
        assert_eq!(json["markup"], "**Bold**");
        assert!(json.get("x").is_none());
    }
}
