use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Node title used for lines read before any `title:` header, or after `===`.
pub const NO_TITLE: &str = "NO_TITLE";

/// Prefix of identifiers synthesized for lines without a `#line:` tag.
pub const AUTO_ID_PREFIX: &str = "auto_id_";

const LINE_ID_TAG: &str = "line:";
const NODE_HEADER: &str = "title:";
const BODY_START: &str = "---";
const NODE_END: &str = "===";
const CHOICE_ARROW: &str = "->";

/// One exported dialogue line or choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub line_id: String,
    pub node_title: String,
    pub character_name: String,
    pub text: String,
    pub tags: Vec<String>,
}

impl DialogueRecord {
    pub fn is_auto_id(&self) -> bool {
        self.line_id.starts_with(AUTO_ID_PREFIX)
    }

    pub fn joined_tags(&self, separator: &str) -> String {
        self.tags.join(separator)
    }
}

/// Mutable state carried across lines of a single script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    pub current_node_title: String,
    pub in_body: bool,
    pub auto_id_counter: usize,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            current_node_title: NO_TITLE.to_string(),
            in_body: false,
            auto_id_counter: 0,
        }
    }
}

impl ParseState {
    fn next_auto_id(&mut self) -> String {
        let id = format!("{}{}", AUTO_ID_PREFIX, self.auto_id_counter);
        self.auto_id_counter += 1;
        id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub nodes_seen: usize,
    pub body_lines: usize,
    pub skipped_comments: usize,
    pub ignored_outside_body: usize,
    pub dropped_empty: usize,
    pub auto_ids_assigned: usize,
    pub choices: usize,
    pub records_emitted: usize,
}

impl ExtractionStats {
    pub fn display_summary(&self) -> String {
        format!(
            "Extraction Results:\n  Lines read: {}\n  Nodes: {}\n  Records: {} ({} choices)\n  \
             Synthesized IDs: {}\n  Skipped comments/commands: {}\n  Ignored outside body: {}\n  \
             Dropped empty lines: {}\n",
            self.lines_read,
            self.nodes_seen,
            self.records_emitted,
            self.choices,
            self.auto_ids_assigned,
            self.skipped_comments,
            self.ignored_outside_body,
            self.dropped_empty,
        )
    }
}

/// Structural role of a single trimmed script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLine<'a> {
    Blank,
    NodeHeader(&'a str),
    BodyStart,
    NodeEnd,
    Comment,
    Command,
    Content(&'a str),
}

/// Classifies a trimmed line. Comment and command detection only matters
/// for lines that end up inside a node body.
pub fn classify_line(line: &str) -> ScriptLine<'_> {
    if line.is_empty() {
        ScriptLine::Blank
    } else if let Some(title) = line.strip_prefix(NODE_HEADER) {
        ScriptLine::NodeHeader(title.trim())
    } else if line == BODY_START {
        ScriptLine::BodyStart
    } else if line == NODE_END {
        ScriptLine::NodeEnd
    } else if line.starts_with("//") {
        ScriptLine::Comment
    } else if line.starts_with("<<") {
        ScriptLine::Command
    } else {
        ScriptLine::Content(line)
    }
}

/// Removes every `#tag` token from `line`, returning the trimmed remainder and
/// the tag values (without `#`) in order of appearance.
///
/// A tag is a `#` followed by at least one non-whitespace character and runs
/// until the next whitespace, so `#a#b` is the single tag `a#b`. A bare `#`
/// is left in the text.
pub fn split_tags(line: &str) -> (String, Vec<String>) {
    let mut text = String::with_capacity(line.len());
    let mut tags = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '#' && chars.peek().is_some_and(|&(_, next)| !next.is_whitespace()) {
            let mut end = line.len();
            while let Some(&(idx, ch)) = chars.peek() {
                if ch.is_whitespace() {
                    end = idx;
                    break;
                }
                chars.next();
            }
            tags.push(line[start + 1..end].to_string());
            continue;
        }
        text.push(c);
    }

    (text.trim().to_string(), tags)
}

/// Removes the span from the first `<<` through the last `>>` that follows it.
/// Text without a complete pair is returned unchanged.
pub fn strip_inline_conditional(text: &str) -> String {
    let Some(open) = text.find("<<") else {
        return text.to_string();
    };
    let body_start = open + 2;

    match text[body_start..].rfind(">>") {
        Some(offset) => {
            let close = body_start + offset + 2;
            format!("{}{}", &text[..open], &text[close..])
        }
        None => text.to_string(),
    }
}

/// Splits `Name: text` into `(name, text)`, both trimmed. The name must be at
/// least one character before the first colon.
pub fn split_speaker(text: &str) -> Option<(&str, &str)> {
    match text.find(':') {
        Some(colon) if colon > 0 => Some((text[..colon].trim(), text[colon + 1..].trim())),
        _ => None,
    }
}

fn is_line_id_tag(tag: &str) -> bool {
    tag.get(..LINE_ID_TAG.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(LINE_ID_TAG))
}

fn clean_choice_text(text: &str) -> String {
    let without_arrow = text.trim_start_matches(['-', '>']).trim();
    strip_inline_conditional(without_arrow).trim().to_string()
}

/// Single forward pass over a Yarn script, turning body lines into records.
#[derive(Debug, Default)]
pub struct LineExtractor {
    state: ParseState,
    stats: ExtractionStats,
}

impl LineExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears node tracking, the synthesized-ID counter and statistics so the
    /// extractor can be reused for another file.
    pub fn reset(&mut self) {
        self.state = ParseState::default();
        self.stats = ExtractionStats::default();
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    pub fn extract<I, S>(&mut self, lines: I) -> Vec<DialogueRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records: Vec<DialogueRecord> = lines
            .into_iter()
            .filter_map(|line| self.process_line(line.as_ref()))
            .collect();

        debug!(
            records = records.len(),
            nodes = self.stats.nodes_seen,
            auto_ids = self.stats.auto_ids_assigned,
            "extraction finished"
        );

        records
    }

    pub fn process_line(&mut self, raw: &str) -> Option<DialogueRecord> {
        self.stats.lines_read += 1;

        match classify_line(raw.trim()) {
            ScriptLine::Blank => {
                self.stats.blank_lines += 1;
                None
            }
            ScriptLine::NodeHeader(title) => {
                trace!(title, "node header");
                self.stats.nodes_seen += 1;
                self.state.current_node_title = title.to_string();
                self.state.in_body = false;
                None
            }
            ScriptLine::BodyStart => {
                self.state.in_body = true;
                None
            }
            ScriptLine::NodeEnd => {
                self.state.in_body = false;
                self.state.current_node_title = NO_TITLE.to_string();
                None
            }
            _ if !self.state.in_body => {
                self.stats.ignored_outside_body += 1;
                None
            }
            ScriptLine::Comment | ScriptLine::Command => {
                self.stats.body_lines += 1;
                self.stats.skipped_comments += 1;
                None
            }
            ScriptLine::Content(line) => {
                self.stats.body_lines += 1;
                self.extract_content(line)
            }
        }
    }

    fn extract_content(&mut self, line: &str) -> Option<DialogueRecord> {
        let (text, tags) = split_tags(line);

        let mut line_id = None;
        let mut other_tags = Vec::with_capacity(tags.len());
        for tag in tags {
            if is_line_id_tag(&tag) {
                if line_id.is_none() {
                    line_id = Some(tag);
                }
            } else {
                other_tags.push(tag);
            }
        }

        // The counter advances even when the line is dropped below.
        let line_id = match line_id {
            Some(id) => id,
            None => {
                self.stats.auto_ids_assigned += 1;
                self.state.next_auto_id()
            }
        };

        if text.is_empty() {
            trace!(line_id = %line_id, "dropping line with no text after tag removal");
            self.stats.dropped_empty += 1;
            return None;
        }

        let is_choice = text.starts_with(CHOICE_ARROW);
        let (character_name, text) = if is_choice {
            (String::new(), clean_choice_text(&text))
        } else {
            match split_speaker(&text) {
                Some((speaker, rest)) => (speaker.to_string(), rest.to_string()),
                None => (String::new(), text),
            }
        };

        if text.is_empty() {
            trace!(line_id = %line_id, "dropping line with no text after cleanup");
            self.stats.dropped_empty += 1;
            return None;
        }

        self.stats.records_emitted += 1;
        if is_choice {
            self.stats.choices += 1;
        }
        Some(DialogueRecord {
            line_id,
            node_title: self.state.current_node_title.clone(),
            character_name,
            text,
            tags: other_tags,
        })
    }
}

/// Splits a whole script into lines after dropping a leading BOM. Accepts
/// `\n`, `\r\n` and lone `\r` terminators; a trailing terminator does not
/// produce an extra empty line.
pub fn script_lines(source: &str) -> impl Iterator<Item = &str> {
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);

    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(lines: &[&str]) -> Vec<DialogueRecord> {
        let mut all = vec!["title: Test", "---"];
        all.extend_from_slice(lines);
        all.push("===");
        LineExtractor::new().extract(all)
    }

    #[test]
    fn test_dialogue_line_with_id_and_tags() {
        let records = body(&["Alice: Hello there. #line:001 #happy"]);
        assert_eq!(
            records,
            vec![DialogueRecord {
                line_id: "line:001".to_string(),
                node_title: "Test".to_string(),
                character_name: "Alice".to_string(),
                text: "Hello there.".to_string(),
                tags: vec!["happy".to_string()],
            }]
        );
    }

    #[test]
    fn test_choice_with_conditional() {
        let records = body(&["-> Leave <<if $flag>> #line:002"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_id, "line:002");
        assert_eq!(records[0].character_name, "");
        assert_eq!(records[0].text, "Leave");
        assert!(records[0].tags.is_empty());
    }

    #[test]
    fn test_choice_skips_speaker_extraction() {
        let records = body(&["-> Ask: why?"]);
        assert_eq!(records[0].character_name, "");
        assert_eq!(records[0].text, "Ask: why?");
    }

    #[test]
    fn test_auto_ids_are_sequential() {
        let records = body(&["Bob: One", "Bob: Two #line:x", "Three"]);
        let ids: Vec<_> = records.iter().map(|r| r.line_id.as_str()).collect();
        assert_eq!(ids, vec!["auto_id_0", "line:x", "auto_id_1"]);
        assert!(records[0].is_auto_id());
        assert!(!records[1].is_auto_id());
    }

    #[test]
    fn test_dropped_tag_only_line_still_consumes_auto_id() {
        let mut extractor = LineExtractor::new();
        let records = extractor.extract(["---", "#mood", "Bob: After", "==="]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_id, "auto_id_1");
        assert_eq!(extractor.stats().dropped_empty, 1);
        assert_eq!(extractor.stats().auto_ids_assigned, 2);
    }

    #[test]
    fn test_tag_only_line_with_id_does_not_advance_counter() {
        let records = body(&["#line:abc", "Next"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_id, "auto_id_0");
    }

    #[test]
    fn test_lines_outside_body_are_ignored() {
        let mut extractor = LineExtractor::new();
        let records = extractor.extract([
            "Stray: before any node",
            "title: Start",
            "tags: intro",
            "---",
            "Bob: Hi",
            "===",
            "Stray: after the node",
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_title, "Start");
        assert_eq!(records[0].line_id, "auto_id_0");
        assert_eq!(extractor.stats().ignored_outside_body, 3);
        assert_eq!(extractor.state().current_node_title, NO_TITLE);
        assert!(!extractor.state().in_body);
    }

    #[test]
    fn test_body_after_node_end_reverts_to_no_title() {
        let records = LineExtractor::new().extract([
            "title: Start",
            "---",
            "Bob: Hi",
            "===",
            "---",
            "Orphan line",
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].node_title, "Start");
        assert_eq!(records[1].node_title, NO_TITLE);
    }

    #[test]
    fn test_body_without_header_has_no_title() {
        let records = LineExtractor::new().extract(["---", "Hello"]);
        assert_eq!(records[0].node_title, NO_TITLE);
    }

    #[test]
    fn test_title_header_exits_body() {
        let records = LineExtractor::new().extract([
            "title: A",
            "---",
            "First",
            "title: B",
            "Not in a body",
            "---",
            "Second",
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].node_title, "A");
        assert_eq!(records[1].node_title, "B");
    }

    #[test]
    fn test_comments_and_commands_are_skipped() {
        let mut extractor = LineExtractor::new();
        let records = extractor.extract([
            "---",
            "// a comment #line:zzz",
            "<<set $gold to 10>>",
            "  <<jump Elsewhere>>  ",
            "Real line",
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_id, "auto_id_0");
        assert_eq!(extractor.stats().skipped_comments, 3);
    }

    #[test]
    fn test_whitespace_is_trimmed_and_blank_lines_ignored() {
        let mut extractor = LineExtractor::new();
        let records = extractor.extract(["   title:   Padded   ", "", "  ---  ", "   ", "  Eve:   Hey  "]);

        assert_eq!(records[0].node_title, "Padded");
        assert_eq!(records[0].character_name, "Eve");
        assert_eq!(records[0].text, "Hey");
        assert_eq!(extractor.stats().blank_lines, 2);
    }

    #[test]
    fn test_first_line_id_tag_wins_case_insensitively() {
        let records = body(&["Hi #LINE:First #mood #line:second"]);
        assert_eq!(records[0].line_id, "LINE:First");
        assert_eq!(records[0].tags, vec!["mood".to_string()]);
    }

    #[test]
    fn test_split_tags() {
        let (text, tags) = split_tags("Hello #a there #b#c # end");
        assert_eq!(text, "Hello  there  # end");
        assert_eq!(tags, vec!["a".to_string(), "b#c".to_string()]);

        let (text, tags) = split_tags("trailing #");
        assert_eq!(text, "trailing #");
        assert!(tags.is_empty());

        let (text, tags) = split_tags("##double");
        assert_eq!(text, "");
        assert_eq!(tags, vec!["#double".to_string()]);

        let (text, tags) = split_tags("Ünïcode #tåg ok");
        assert_eq!(text, "Ünïcode  ok");
        assert_eq!(tags, vec!["tåg".to_string()]);
    }

    #[test]
    fn test_strip_inline_conditional() {
        assert_eq!(strip_inline_conditional("Go <<if $a>>"), "Go ");
        assert_eq!(
            strip_inline_conditional("A <<if $x>> B <<endif>> C"),
            "A  C"
        );
        assert_eq!(strip_inline_conditional("<<>>>x"), "x");
        assert_eq!(strip_inline_conditional("open <<if only"), "open <<if only");
        assert_eq!(strip_inline_conditional("close only>>"), "close only>>");
        assert_eq!(strip_inline_conditional("<<>"), "<<>");
    }

    #[test]
    fn test_split_speaker() {
        assert_eq!(split_speaker("Bob: Hi"), Some(("Bob", "Hi")));
        assert_eq!(split_speaker("Bob:Hi: there"), Some(("Bob", "Hi: there")));
        assert_eq!(split_speaker("No speaker here"), None);
        assert_eq!(split_speaker(":leading colon"), None);
    }

    #[test]
    fn test_choice_arrow_variants() {
        let records = body(&["->> Run away", "->-> Hide <<if $dark>>"]);
        assert_eq!(records[0].text, "Run away");
        assert_eq!(records[1].text, "Hide");
    }

    #[test]
    fn test_records_never_have_empty_text() {
        let mut extractor = LineExtractor::new();
        let records = extractor.extract(["---", "->", "-> <<if $a>>", "Bob:", "Kept"]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Kept");
        assert_eq!(records[0].line_id, "auto_id_3");
        assert!(records.iter().all(|r| !r.text.is_empty()));
    }

    #[test]
    fn test_line_id_round_trip() {
        for id in ["line:abc123", "line:0", "Line:MiXeD"] {
            let line = format!("Text #{}", id);
            let records = body(&[line.as_str()]);
            assert_eq!(records[0].line_id, id);
        }
    }

    #[test]
    fn test_reset_restarts_counter() {
        let mut extractor = LineExtractor::new();
        extractor.extract(["---", "One", "Two"]);
        assert_eq!(extractor.state().auto_id_counter, 2);

        extractor.reset();
        assert_eq!(extractor.state(), &ParseState::default());

        let records = extractor.extract(["---", "Again"]);
        assert_eq!(records[0].line_id, "auto_id_0");
    }

    #[test]
    fn test_script_lines_handles_crlf_and_bom() {
        let source = "\u{feff}title: Start\r\n---\r\nBob: Hi #line:1\r\n===\r\n";
        let lines: Vec<_> = script_lines(source).collect();
        assert_eq!(lines, vec!["title: Start", "---", "Bob: Hi #line:1", "==="]);

        let records = LineExtractor::new().extract(script_lines(source));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_title, "Start");
        assert_eq!(records[0].text, "Hi");
    }

    #[test]
    fn test_script_lines_splits_on_lone_carriage_return() {
        let source = "title: A\r---\rBob: Hi\r===\r";
        let lines: Vec<_> = script_lines(source).collect();
        assert_eq!(lines, vec!["title: A", "---", "Bob: Hi", "==="]);

        let records = LineExtractor::new().extract(script_lines(source));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_title, "A");
        assert_eq!(records[0].character_name, "Bob");
    }

    #[test]
    fn test_script_lines_keeps_interior_blank_lines() {
        let lines: Vec<_> = script_lines("a\n\nb\r\rc").collect();
        assert_eq!(lines, vec!["a", "", "b", "", "c"]);
        assert_eq!(script_lines("").count(), 0);
    }

    #[test]
    fn test_dropped_choices_are_not_counted() {
        let mut extractor = LineExtractor::new();
        let records = extractor.extract(["---", "->", "-> <<if $a>>", "-> Go", "Kept"]);

        let choice_rows = records.iter().filter(|r| r.text == "Go").count();
        assert_eq!(records.len(), 2);
        assert_eq!(extractor.stats().choices, choice_rows);
        assert_eq!(extractor.stats().records_emitted, 2);
        assert_eq!(extractor.stats().dropped_empty, 2);
        assert!(extractor.stats().display_summary().contains("Records: 2 (1 choices)"));
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), ScriptLine::Blank);
        assert_eq!(classify_line("title: X"), ScriptLine::NodeHeader("X"));
        assert_eq!(classify_line("title:"), ScriptLine::NodeHeader(""));
        assert_eq!(classify_line("---"), ScriptLine::BodyStart);
        assert_eq!(classify_line("----"), ScriptLine::Content("----"));
        assert_eq!(classify_line("==="), ScriptLine::NodeEnd);
        assert_eq!(classify_line("// note"), ScriptLine::Comment);
        assert_eq!(classify_line("<<wait 1>>"), ScriptLine::Command);
        assert_eq!(classify_line("Hi"), ScriptLine::Content("Hi"));
    }
}
