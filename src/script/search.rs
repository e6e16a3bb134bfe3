//! Statement-boundary-aware search over `GO`-delimited batch scripts
//!
//! A batch is a run of text terminated by a line containing exactly `GO`.
//! All offsets are byte offsets into the UTF-8 script and always fall on
//! character boundaries.

use crate::script::matcher::BoundedSearch;
use std::ops::Range;
use std::sync::Arc;

/// Span `start..end` of one or more batches
///
/// `end` is exclusive and points just past the terminating `GO` of the last
/// batch, or at the end of the script when that batch has no `GO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementRange {
    pub start: usize,
    pub end: usize,
}

impl StatementRange {
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A `GO` terminator line
#[derive(Debug, Clone, Copy)]
pub(crate) struct Terminator {
    /// Offset of the `G`
    pub start: usize,
    /// Offset just past the `O`
    pub end: usize,
    /// Offset of the line following the terminator
    pub next_line: usize,
}

pub(crate) fn terminators(input: &str) -> Vec<Terminator> {
    let mut found = Vec::new();
    let mut line_start = 0;

    loop {
        let newline = input[line_start..].find('\n').map(|i| line_start + i);
        let line_end = newline.unwrap_or(input.len());
        let line = &input[line_start..line_end];
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line == "GO" {
            found.push(Terminator {
                start: line_start,
                end: line_start + 2,
                next_line: newline.map_or(input.len(), |n| n + 1),
            });
        }

        match newline {
            Some(n) => line_start = n + 1,
            None => break,
        }
    }

    found
}

/// Range of the batch containing `hit`, widened backward by `leading_batches`
/// preceding batches
///
/// Blank lines in front of the first included batch are not part of the range.
pub fn batch_range(input: &str, hit: Range<usize>, leading_batches: usize) -> StatementRange {
    let terminators = terminators(input);

    let preceding = terminators.iter().take_while(|t| t.end <= hit.start).count();
    let boundary = if preceding > leading_batches {
        terminators[preceding - leading_batches - 1].next_line
    } else {
        0
    };

    let between = &input[boundary..hit.start];
    let start = boundary + (between.len() - between.trim_start().len());

    let end = terminators
        .iter()
        .find(|t| t.start >= hit.end)
        .map_or(input.len(), |t| t.end);

    StatementRange { start, end }
}

/// Find the batch containing the first occurrence of `statement` starting
/// strictly after `start_after_index`
///
/// Returns `None` when there is no such occurrence, or when
/// `start_after_index` is past the end or inside a character. The result
/// depends only on the arguments.
///
/// # Panics
///
/// Panics when `statement` is empty.
pub fn find_statement_range(
    input: &str,
    statement: &str,
    start_after_index: usize,
    leading_batches: usize,
) -> Option<StatementRange> {
    assert!(!statement.is_empty(), "statement to search for must not be empty");

    let tail = input.get(start_after_index..)?;
    let from = start_after_index + tail.chars().next()?.len_utf8();
    let offset = input[from..].find(statement)? + from;
    Some(batch_range(input, offset..offset + statement.len(), leading_batches))
}

/// Rewrite every batch containing the literal `statement`
///
/// See [`for_each_located_match`].
pub fn for_each_match<T>(input: &str, statement: &str, leading_batches: usize, transform: T) -> String
where
    T: FnMut(&str) -> String,
{
    assert!(!statement.is_empty(), "statement to search for must not be empty");

    for_each_located_match(
        input,
        leading_batches,
        |script, from| {
            let offset = script.get(from..)?.find(statement)? + from;
            Some(offset..offset + statement.len())
        },
        transform,
    )
}

/// Rewrite every batch in which `locate` finds an occurrence
///
/// `locate(script, from)` returns the next occurrence at or after `from`. The
/// batch range around it is handed to `transform` and replaced by its output.
/// The search continues after the inserted text, so replacements never
/// overlap and inserted text is never matched again. Without any occurrence
/// the input is returned unchanged and `transform` is never called.
pub fn for_each_located_match<L, T>(
    input: &str,
    leading_batches: usize,
    mut locate: L,
    mut transform: T,
) -> String
where
    L: FnMut(&str, usize) -> Option<Range<usize>>,
    T: FnMut(&str) -> String,
{
    let mut script = input.to_string();
    let mut search_from = 0;

    while search_from <= script.len() {
        let Some(hit) = locate(&script, search_from) else {
            break;
        };
        search_from = replace_batch(&mut script, hit, search_from, leading_batches, &mut transform);
    }

    script
}

/// [`for_each_located_match`] driven by a time-bounded search
///
/// Occurrences are located through `search`; once it gives up, the
/// replacements made so far are kept and the rest of the script is left as is.
pub async fn for_each_bounded_match<T>(
    input: &str,
    leading_batches: usize,
    search: &mut BoundedSearch<'_>,
    mut transform: T,
) -> String
where
    T: FnMut(&str) -> String,
{
    let mut script = input.to_string();
    let mut search_from = 0;

    while search_from <= script.len() {
        let snapshot: Arc<str> = Arc::from(script.as_str());
        let Some(hit) = search.find(&snapshot, search_from).await else {
            break;
        };
        search_from = replace_batch(&mut script, hit, search_from, leading_batches, &mut transform);
    }

    script
}

/// Replace the batch range around `hit`, returning the offset just past the
/// inserted text
fn replace_batch<T>(
    script: &mut String,
    hit: Range<usize>,
    search_from: usize,
    leading_batches: usize,
    transform: &mut T,
) -> usize
where
    T: FnMut(&str) -> String,
{
    let mut range = batch_range(script.as_str(), hit, leading_batches);
    // leading batches must not reach back into text that was already replaced
    range.start = range.start.max(search_from);

    let replacement = transform(&script[range.as_range()]);
    script.replace_range(range.as_range(), &replacement);
    range.start + replacement.len()
}
