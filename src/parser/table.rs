use std::sync::LazyLock;

use regex::Regex;

use crate::chunk::Recommendation;

// Separator rows: dashes optionally framed by pipes/whitespace, e.g.
// "|---|---|---|" or "----".
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s|]*-[\s|-]*$").unwrap());

/// How literal "CoR"/"LoE" rows are treated. A data row whose first two
/// cells genuinely read COR/LOE is indistinguishable from a header, so the
/// choice is configurable rather than silently resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HeaderMode {
    /// Drop every such row wherever it appears (legacy behavior).
    #[default]
    SkipAll,
    /// Drop such a row only before the first data row; keep later ones.
    FirstOnly,
}

/// Extract recommendation rows from a pipe-delimited 3-column table
/// (CoR | LoE | recommendation text). Malformed lines are dropped, never
/// reported: the caller distinguishes "no rows" from "no source" itself.
pub fn parse(markdown: &str, mode: HeaderMode) -> Vec<Recommendation> {
    let mut records = Vec::new();

    for line in markdown.lines() {
        if !line.contains('|') || SEPARATOR_RE.is_match(line) {
            continue;
        }

        // Drop the fragments before the leading and after the trailing pipe.
        let fragments: Vec<&str> = line.split('|').collect();
        if fragments.len() < 3 {
            continue;
        }
        let cells: Vec<&str> = fragments[1..fragments.len() - 1]
            .iter()
            .map(|c| c.trim())
            .collect();
        if cells.len() != 3 {
            continue;
        }

        let is_header =
            cells[0].eq_ignore_ascii_case("cor") && cells[1].eq_ignore_ascii_case("loe");
        if is_header {
            match mode {
                HeaderMode::SkipAll => continue,
                HeaderMode::FirstOnly if records.is_empty() => continue,
                HeaderMode::FirstOnly => {}
            }
        }

        records.push(Recommendation {
            class_label: cells[0].to_string(),
            rating: cells[1].to_string(),
            content: cells[2].to_string(),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# Rehabilitation guideline

| CoR | LoE | Recommendation |
|---|---|---|
| A | IV | Apply splint for 4 weeks |
| B | II | Begin range-of-motion exercises |
";

    #[test]
    fn well_formed_table() {
        let recs = parse(TABLE, HeaderMode::default());
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].class_label, "A");
        assert_eq!(recs[0].rating, "IV");
        assert_eq!(recs[0].content, "Apply splint for 4 weeks");
        assert_eq!(recs[1].content, "Begin range-of-motion exercises");
    }

    #[test]
    fn no_pipes_no_records() {
        let recs = parse("Just prose.\nNo table here.\n- a list\n", HeaderMode::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(parse("", HeaderMode::default()).is_empty());
    }

    #[test]
    fn separator_rows_filtered() {
        let recs = parse("|---|---|---|\n| - | -- | --- |\n", HeaderMode::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn wrong_cell_count_dropped() {
        let md = "| A | IV |\n| A | IV | text | extra |\n| A | IV | kept |\n";
        let recs = parse(md, HeaderMode::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].content, "kept");
    }

    #[test]
    fn header_excluded_regardless_of_position() {
        let md = "| A | IV | first |\n| CoR | LoE | Recommendation |\n| B | II | second |\n";
        let recs = parse(md, HeaderMode::SkipAll);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].content, "first");
        assert_eq!(recs[1].content, "second");
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let md = "| COR | loe | Recommendation |\n| A | IV | row |\n";
        let recs = parse(md, HeaderMode::SkipAll);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn first_only_mode_keeps_late_literal_row() {
        let md = "| CoR | LoE | Recommendation |\n| A | IV | row |\n| cor | loe | literal values |\n";
        let recs = parse(md, HeaderMode::FirstOnly);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].class_label, "cor");
    }

    #[test]
    fn cells_are_trimmed() {
        let md = "|  A  |  IV  |  padded text  |\n";
        let recs = parse(md, HeaderMode::default());
        assert_eq!(recs[0].class_label, "A");
        assert_eq!(recs[0].content, "padded text");
    }

    #[test]
    fn order_matches_input() {
        let md = "| A | I | one |\n| B | II | two |\n| C | III | three |\n";
        let recs = parse(md, HeaderMode::default());
        let contents: Vec<&str> = recs.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn missing_trailing_pipe_drops_row() {
        // only two cells survive the outer-fragment trim
        let recs = parse("| A | IV | no trailing pipe", HeaderMode::default());
        assert!(recs.is_empty());
    }
}
