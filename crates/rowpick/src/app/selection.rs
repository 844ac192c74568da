//! Row selection state and shift-click range resolution.

use std::collections::HashSet;

use crate::domain::model::TableRow;

/// Result of resolving the rows spanned by a shift-click.
///
/// The stale-anchor degrade is a deliberate, tagged branch rather than an
/// implicit fallthrough: callers can observe (and tests can assert) that a
/// missing anchor collapsed the gesture to a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome<'a> {
    /// Contiguous run between the two endpoints, inclusive, in row order.
    Span(&'a [TableRow]),
    /// Only one endpoint was present in `rows` (stale or unset anchor); the
    /// range collapses to that row.
    SingleRowFallback(&'a [TableRow]),
    /// Neither endpoint occurs in `rows`.
    Empty,
}

impl<'a> RangeOutcome<'a> {
    /// The rows covered by the outcome, empty when nothing matched.
    pub fn rows(&self) -> &'a [TableRow] {
        match *self {
            RangeOutcome::Span(rows) | RangeOutcome::SingleRowFallback(rows) => rows,
            RangeOutcome::Empty => &[],
        }
    }
}

/// Resolve the contiguous run of `rows` between `current_id` and `anchor_id`,
/// inclusive of both endpoints, in the original row order.
///
/// A single forward scan: the first row matching either id opens the span,
/// the second closes it and stops the scan. Which id comes first does not
/// matter. Equal ids degenerate to that one row. An id that never occurs
/// degrades per [`RangeOutcome::SingleRowFallback`] instead of failing; the
/// function is total over its inputs.
pub fn resolve_range<'a>(
    rows: &'a [TableRow],
    current_id: &str,
    anchor_id: &str,
) -> RangeOutcome<'a> {
    let mut start = None;
    for (idx, row) in rows.iter().enumerate() {
        if row.id == current_id || row.id == anchor_id {
            match start {
                None if current_id == anchor_id => {
                    return RangeOutcome::Span(&rows[idx..=idx]);
                }
                None => start = Some(idx),
                Some(first) => return RangeOutcome::Span(&rows[first..=idx]),
            }
        }
    }

    match start {
        Some(idx) => {
            tracing::debug!(
                current = current_id,
                anchor = anchor_id,
                "range endpoint missing, falling back to single row"
            );
            RangeOutcome::SingleRowFallback(&rows[idx..=idx])
        }
        None => RangeOutcome::Empty,
    }
}

/// Cumulative page/row selection state for the header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    All,
    Some,
    None,
}

/// Tracks which row ids are selected plus the anchor for range gestures.
///
/// The anchor is the id of the most recently toggled row. It is updated after
/// every row-level act, shift-modified or not, and lives only as long as the
/// owning view.
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    selected: HashSet<String>,
    anchor: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Id of the most recently toggled row, if any.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Iterate over the selected ids in arbitrary order.
    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Flip the row's membership and record it as the new anchor.
    pub fn toggle(&mut self, row: &TableRow) {
        if !self.selected.remove(&row.id) {
            self.selected.insert(row.id.clone());
        }
        self.anchor = Some(row.id.clone());
    }

    /// Shift-click semantics: set every row between the anchor and `row`
    /// (inclusive) to the anchor row's *current* state, extending rather
    /// than inverting, then move the anchor to `row`.
    ///
    /// With no anchor recorded this is a plain [`toggle`](Self::toggle).
    pub fn extend_to(&mut self, rows: &[TableRow], row: &TableRow) {
        let Some(anchor_id) = self.anchor.clone() else {
            self.toggle(row);
            return;
        };

        let target = self.selected.contains(&anchor_id);
        let outcome = resolve_range(rows, &row.id, &anchor_id);
        for spanned in outcome.rows() {
            self.set_selected(&spanned.id, target);
        }
        self.anchor = Some(row.id.clone());
    }

    /// Header checkbox over the given rows: clear them when every one is
    /// already selected, otherwise select them all. Used both for the page
    /// rows and, under the shift chord, for the full row set.
    pub fn toggle_rows(&mut self, rows: &[TableRow]) {
        match self.check_state(rows) {
            CheckState::All => {
                for row in rows {
                    self.selected.remove(&row.id);
                }
            }
            CheckState::Some | CheckState::None => {
                for row in rows {
                    self.selected.insert(row.id.clone());
                }
            }
        }
    }

    /// Aggregate state of the given rows for rendering the header checkbox.
    pub fn check_state(&self, rows: &[TableRow]) -> CheckState {
        if rows.is_empty() {
            return CheckState::None;
        }
        let selected = rows.iter().filter(|row| self.is_selected(&row.id)).count();
        if selected == 0 {
            CheckState::None
        } else if selected == rows.len() {
            CheckState::All
        } else {
            CheckState::Some
        }
    }

    /// Count how many of the given rows are selected.
    pub fn count_selected(&self, rows: &[TableRow]) -> usize {
        rows.iter().filter(|row| self.is_selected(&row.id)).count()
    }

    pub fn set_selected(&mut self, id: &str, on: bool) {
        if on {
            self.selected.insert(id.to_owned());
        } else {
            self.selected.remove(id);
        }
    }

    /// Restore persisted state, replacing whatever is tracked now.
    pub fn restore(&mut self, ids: impl IntoIterator<Item = String>, anchor: Option<String>) {
        self.selected = ids.into_iter().collect();
        self.anchor = anchor;
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(ids: &[&str]) -> Vec<TableRow> {
        ids.iter()
            .map(|id| TableRow::new(*id, vec![id.to_string()]))
            .collect()
    }

    fn ids(outcome: RangeOutcome<'_>) -> Vec<&str> {
        outcome.rows().iter().map(|row| row.id.as_str()).collect()
    }

    #[test]
    fn equal_endpoints_resolve_to_single_row() {
        let rows = rows(&["a", "b", "c"]);
        let outcome = resolve_range(&rows, "b", "b");
        assert_eq!(outcome, RangeOutcome::Span(&rows[1..=1]));
        assert_eq!(ids(outcome), vec!["b"]);
    }

    #[test]
    fn range_is_direction_independent_and_inclusive() {
        let rows = rows(&["a", "b", "c", "d", "e"]);
        let forward = resolve_range(&rows, "d", "b");
        let backward = resolve_range(&rows, "b", "d");
        assert_eq!(forward, backward);
        assert_eq!(ids(forward), vec!["b", "c", "d"]);
    }

    #[test]
    fn anchor_before_current_spans_from_anchor() {
        let rows = rows(&["a", "b", "c", "d", "e"]);
        assert_eq!(ids(resolve_range(&rows, "a", "c")), vec!["a", "b", "c"]);
    }

    #[test]
    fn full_span_covers_every_row() {
        let rows = rows(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            ids(resolve_range(&rows, "e", "a")),
            vec!["a", "b", "c", "d", "e"]
        );
    }

    #[test]
    fn stale_anchor_degrades_to_current_row() {
        let rows = rows(&["a", "b", "c"]);
        let outcome = resolve_range(&rows, "b", "missing");
        assert!(matches!(outcome, RangeOutcome::SingleRowFallback(_)));
        assert_eq!(ids(outcome), vec!["b"]);
    }

    #[test]
    fn empty_rows_resolve_to_empty() {
        let rows: Vec<TableRow> = Vec::new();
        assert_eq!(resolve_range(&rows, "a", "b"), RangeOutcome::Empty);
    }

    #[test]
    fn unknown_endpoints_resolve_to_empty() {
        let rows = rows(&["a", "b"]);
        assert_eq!(resolve_range(&rows, "x", "y"), RangeOutcome::Empty);
    }

    #[test]
    fn toggle_flips_membership_and_moves_anchor() {
        let rows = rows(&["a", "b"]);
        let mut state = SelectionState::new();

        state.toggle(&rows[0]);
        assert!(state.is_selected("a"));
        assert_eq!(state.anchor(), Some("a"));

        state.toggle(&rows[0]);
        assert!(!state.is_selected("a"));
        assert_eq!(state.anchor(), Some("a"));
    }

    #[test]
    fn extend_applies_anchor_state_across_range() {
        let rows = rows(&["a", "b", "c", "d", "e"]);
        let mut state = SelectionState::new();

        state.toggle(&rows[1]); // select b, anchor = b
        state.extend_to(&rows, &rows[3]);

        for id in ["b", "c", "d"] {
            assert!(state.is_selected(id), "{id} should be selected");
        }
        assert!(!state.is_selected("a"));
        assert!(!state.is_selected("e"));
        assert_eq!(state.anchor(), Some("d"));
    }

    #[test]
    fn extend_from_deselected_anchor_clears_range() {
        let rows = rows(&["a", "b", "c", "d"]);
        let mut state = SelectionState::new();
        for row in &rows {
            state.set_selected(&row.id, true);
        }

        // Toggling b deselects it and anchors there; the extend then clears
        // the whole run to match the anchor's state.
        state.toggle(&rows[1]);
        state.extend_to(&rows, &rows[3]);

        assert!(state.is_selected("a"));
        for id in ["b", "c", "d"] {
            assert!(!state.is_selected(id), "{id} should be cleared");
        }
    }

    #[test]
    fn extend_with_stale_anchor_touches_only_current_row() {
        let rows = rows(&["a", "b", "c"]);
        let mut state = SelectionState::new();
        state.restore(vec!["missing".to_owned()], Some("missing".to_owned()));

        state.extend_to(&rows, &rows[1]);

        // The vanished anchor was selected, so its state extends to b alone.
        assert!(state.is_selected("b"));
        assert!(!state.is_selected("a"));
        assert!(!state.is_selected("c"));
        assert_eq!(state.anchor(), Some("b"));
    }

    #[test]
    fn extend_without_anchor_falls_back_to_toggle() {
        let rows = rows(&["a", "b", "c"]);
        let mut state = SelectionState::new();

        state.extend_to(&rows, &rows[2]);

        assert!(state.is_selected("c"));
        assert_eq!(state.len(), 1);
        assert_eq!(state.anchor(), Some("c"));
    }

    #[test]
    fn toggle_rows_selects_then_clears() {
        let rows = rows(&["a", "b", "c"]);
        let mut state = SelectionState::new();

        state.toggle_rows(&rows);
        assert_eq!(state.check_state(&rows), CheckState::All);

        state.toggle_rows(&rows);
        assert_eq!(state.check_state(&rows), CheckState::None);
    }

    #[test]
    fn partially_selected_rows_complete_on_toggle() {
        let rows = rows(&["a", "b", "c"]);
        let mut state = SelectionState::new();
        state.set_selected("a", true);
        assert_eq!(state.check_state(&rows), CheckState::Some);

        state.toggle_rows(&rows);
        assert_eq!(state.check_state(&rows), CheckState::All);
    }
}
