//! Table reconstruction from positionally scattered fragments.
//!
//! A [`TableBlock`] owns two row-major grids of [`TextRun`] cells: the header
//! grid (fragments in the table-header style) and the body grid. Row and cell
//! boundaries are inferred from geometry as fragments arrive; the structural
//! repairs that need the whole table (vertical header merge, split-column
//! knitting, trimming) run in [`TableBlock::finish`].
//!
//! Every ambiguous case degrades to "start a new row/cell": occasional
//! over-splitting is preferred to silently losing text.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::{Diagnostic, FormatKind, Fragment, TextRun};
use crate::builder::{ReconstructOptions, Thresholds};

/// Which grid a fragment is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridKind {
    /// Header grid (table-header style)
    Header,
    /// Body grid
    Body,
}

#[derive(Debug, Clone, Default)]
struct Row {
    cells: Vec<TextRun>,
    /// Started right of the header extent, in the next page column. Either
    /// the tail of the row before it or a row of its own.
    detached: bool,
}

#[derive(Debug, Clone, Default)]
struct Grid {
    rows: Vec<Row>,
    last_y: Option<f32>,
}

impl Grid {
    fn starts_row(&self, y: f32, thresholds: &Thresholds) -> bool {
        match (self.rows.is_empty(), self.last_y) {
            (false, Some(last_y)) => thresholds.is_row_break(last_y, y),
            _ => true,
        }
    }

    fn strings(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.text().to_string()).collect())
            .collect()
    }
}

/// A table reconstructed from header and body fragments.
#[derive(Debug, Clone, Default)]
pub struct TableBlock {
    headers: Grid,
    body: Grid,
    last_y: f32,
    last_height: f32,
    fragments: usize,
}

impl TableBlock {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Y of the most recently fed fragment.
    pub fn last_y(&self) -> f32 {
        self.last_y
    }

    /// Height of the most recently fed fragment.
    pub fn last_height(&self) -> f32 {
        self.last_height
    }

    /// Number of fragments fed so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Check if the table holds no cells at all.
    pub fn is_empty(&self) -> bool {
        self.headers.rows.iter().all(|r| r.cells.is_empty())
            && self.body.rows.iter().all(|r| r.cells.is_empty())
    }

    /// A table with no body rows yet still collects header fragments.
    pub fn is_awaiting_headers(&self) -> bool {
        self.body.rows.is_empty()
    }

    /// Header rows as cell slices.
    pub fn header_rows(&self) -> impl Iterator<Item = &[TextRun]> {
        self.headers.rows.iter().map(|r| r.cells.as_slice())
    }

    /// Body rows as cell slices.
    pub fn body_rows(&self) -> impl Iterator<Item = &[TextRun]> {
        self.body.rows.iter().map(|r| r.cells.as_slice())
    }

    /// Header grid as plain strings.
    pub fn header_strings(&self) -> Vec<Vec<String>> {
        self.headers.strings()
    }

    /// Body grid as plain strings.
    pub fn row_strings(&self) -> Vec<Vec<String>> {
        self.body.strings()
    }

    /// Number of header rows.
    pub fn header_row_count(&self) -> usize {
        self.headers.rows.len()
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.body.rows.len()
    }

    /// Number of columns named by the header.
    pub fn column_count(&self) -> usize {
        self.column_headers().map(|cells| cells.len()).unwrap_or(0)
    }

    /// Forget the row cursors so the first fragment of the next page starts
    /// a new row.
    pub fn break_page(&mut self) {
        self.headers.last_y = None;
        self.body.last_y = None;
    }

    /// Route one fragment into the header or body grid.
    pub fn feed(&mut self, fragment: &Fragment, options: &ReconstructOptions) {
        let kind = options.format_of(fragment);
        let grid = if options.is_table_header(fragment) {
            GridKind::Header
        } else {
            GridKind::Body
        };
        self.fragments += 1;

        if fragment.is_only_whitespace() {
            self.feed_whitespace(grid, fragment, kind, &options.thresholds);
            return;
        }

        match grid {
            GridKind::Header => {
                if self.headers.starts_row(fragment.y, &options.thresholds) {
                    log::trace!("table: new header row at y={}", fragment.y);
                    self.headers.rows.push(Row::default());
                }
                self.resume_header(fragment, kind, &options.thresholds);
                self.headers.last_y = Some(fragment.y);
            }
            GridKind::Body => {
                let jumped = self.jumps_column(fragment, &options.thresholds);
                if jumped || self.body.starts_row(fragment.y, &options.thresholds) {
                    let detached = !self.body.rows.is_empty() && self.is_beyond_headers(fragment.x);
                    log::trace!(
                        "table: new body row at y={} (detached: {})",
                        fragment.y,
                        detached
                    );
                    self.body.rows.push(Row {
                        cells: Vec::new(),
                        detached,
                    });
                }
                self.extract_resume_part(fragment, kind, &options.thresholds);
                self.body.last_y = Some(fragment.y);
            }
        }

        self.last_y = fragment.y;
        self.last_height = fragment.height;
    }

    /// Structural repairs once the table is complete.
    pub fn finish(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for row in self.headers.rows.iter_mut().chain(self.body.rows.iter_mut()) {
            for cell in &mut row.cells {
                cell.trim();
            }
        }

        self.merge_header_labels(&mut diagnostics);

        for row in self.headers.rows.iter_mut().chain(self.body.rows.iter_mut()) {
            while row.cells.last().is_some_and(|c| c.is_only_whitespace()) {
                row.cells.pop();
            }
        }
        self.knit_detached_rows();
        self.body.rows.retain(|row| !row.cells.is_empty());

        diagnostics
    }

    fn feed_whitespace(
        &mut self,
        grid: GridKind,
        fragment: &Fragment,
        kind: FormatKind,
        thresholds: &Thresholds,
    ) {
        let placeholder = match grid {
            GridKind::Header => false,
            GridKind::Body => match self.body.rows.last() {
                Some(row) if !row.cells.is_empty() => {
                    let col = row.cells.len() - 1;
                    !self.in_column(col, fragment.x, self.body.rows.len() - 1, thresholds)
                }
                _ => false,
            },
        };

        let target = match grid {
            GridKind::Header => &mut self.headers,
            GridKind::Body => &mut self.body,
        };
        if target.last_y.is_none() {
            return;
        }
        let Some(row) = target.rows.last_mut() else {
            return;
        };

        if placeholder {
            // blank cell keeps the following cells in their columns
            row.cells.push(TextRun::from_fragment(fragment, kind));
        } else if let Some(cell) = row.cells.last_mut() {
            cell.append(fragment, kind);
        }
    }

    fn resume_header(&mut self, fragment: &Fragment, kind: FormatKind, thresholds: &Thresholds) {
        let Some(row) = self.headers.rows.last_mut() else {
            return;
        };
        match row.cells.last_mut() {
            Some(cell) if thresholds.adjoins(cell.x, cell.right(), fragment.x) => {
                join_cell(cell, fragment, kind);
            }
            _ => row.cells.push(TextRun::from_fragment(fragment, kind)),
        }
    }

    /// Decide whether a body fragment extends the current row's last cell,
    /// starts a new cell, or belongs to the previous row.
    fn extract_resume_part(&mut self, fragment: &Fragment, kind: FormatKind, thresholds: &Thresholds) {
        let row_idx = self.body.rows.len() - 1;
        let (cell_count, detached) = {
            let row = &self.body.rows[row_idx];
            (row.cells.len(), row.detached)
        };

        if cell_count == 0 {
            if !detached && row_idx > 0 && self.consolidate_column_cell(fragment, kind, thresholds) {
                self.body.rows.pop();
                return;
            }
            self.body.rows[row_idx]
                .cells
                .push(TextRun::from_fragment(fragment, kind));
            return;
        }

        let col = cell_count - 1;
        let continues = self.in_column(col, fragment.x, row_idx, thresholds);
        let cells = &mut self.body.rows[row_idx].cells;
        if continues {
            join_cell(&mut cells[col], fragment, kind);
        } else {
            cells.push(TextRun::from_fragment(fragment, kind));
        }
    }

    /// Merge a fragment that opened an empty row back into the previous row
    /// when that row is still missing columns and the fragment falls in its
    /// trailing column or a later one. Returns false when the fragment
    /// really starts a new row.
    fn consolidate_column_cell(
        &mut self,
        fragment: &Fragment,
        kind: FormatKind,
        thresholds: &Thresholds,
    ) -> bool {
        let prev_idx = self.body.rows.len() - 2;
        let prev = &self.body.rows[prev_idx];
        let columns = self.column_count();
        if prev.detached || prev.cells.is_empty() || prev.cells.len() >= columns {
            return false;
        }

        let trailing = prev.cells.len() - 1;
        // the first column always opens a row
        let Some(target) = self
            .column_index_of(fragment.x, prev_idx + 1, thresholds)
            .filter(|&col| col > 0)
        else {
            return false;
        };

        let cells = &mut self.body.rows[prev_idx].cells;
        if target == trailing {
            log::trace!("table: {:?} continues previous row cell {}", fragment.text, target);
            join_cell(&mut cells[trailing], fragment, kind);
            true
        } else if target > trailing {
            log::trace!("table: {:?} completes previous row at column {}", fragment.text, target);
            cells.push(TextRun::from_fragment(fragment, kind));
            true
        } else {
            false
        }
    }

    /// The header row naming the columns: the last header row with more
    /// than one cell, else the last header row.
    fn column_headers(&self) -> Option<&[TextRun]> {
        self.headers
            .rows
            .iter()
            .rev()
            .find(|r| r.cells.len() > 1)
            .or_else(|| self.headers.rows.last())
            .map(|r| r.cells.as_slice())
    }

    /// A fragment that moves up the page into the area right of the header,
    /// while the current row already has every column, starts a row in the
    /// next page column. A short row keeps it as its trailing cell.
    fn jumps_column(&self, fragment: &Fragment, thresholds: &Thresholds) -> bool {
        let (Some(row), Some(last_y)) = (self.body.rows.last(), self.body.last_y) else {
            return false;
        };
        thresholds.rises_above(last_y, fragment.y)
            && self.is_beyond_headers(fragment.x)
            && row.cells.len() >= self.column_count()
    }

    fn is_beyond_headers(&self, x: f32) -> bool {
        let right = self
            .headers
            .rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.right())
            .fold(f32::NEG_INFINITY, f32::max);
        right.is_finite() && x > right
    }

    /// Column membership of `x` for column `col`: the header cell at that
    /// index, else the same index in body rows before `row_idx`, else
    /// adjacency to the current cell itself.
    fn in_column(&self, col: usize, x: f32, row_idx: usize, thresholds: &Thresholds) -> bool {
        if self
            .column_headers()
            .and_then(|cells| cells.get(col))
            .is_some_and(|header| header.could_contain(x))
        {
            return true;
        }

        if self.body.rows[..row_idx]
            .iter()
            .filter(|r| !r.detached)
            .filter_map(|r| r.cells.get(col))
            .any(|cell| cell.could_contain(x))
        {
            return true;
        }

        self.body.rows[row_idx]
            .cells
            .get(col)
            .is_some_and(|cell| thresholds.adjoins(cell.x, cell.right(), x))
    }

    fn column_index_of(&self, x: f32, row_idx: usize, thresholds: &Thresholds) -> Option<usize> {
        (0..self.column_count()).find(|&col| {
            self.column_headers()
                .and_then(|cells| cells.get(col))
                .is_some_and(|header| header.could_contain(x))
                || self.body.rows[..row_idx]
                    .iter()
                    .filter(|r| !r.detached)
                    .filter_map(|r| r.cells.get(col))
                    .any(|cell| cell.could_contain(x))
                || (row_idx > 0
                    && self.body.rows[row_idx - 1]
                        .cells
                        .last()
                        .is_some_and(|cell| {
                            col + 1 == self.body.rows[row_idx - 1].cells.len()
                                && thresholds.adjoins(cell.x, cell.right(), x)
                        }))
        })
    }

    /// Fold a stacked label row into the column-name row beneath it.
    ///
    /// With a title row, a label row ("Proficiency") and the column-name row
    /// ("Bonus"), each label is prepended onto the name cell under its centre.
    fn merge_header_labels(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        let rows = self.headers.rows.len();
        if rows > 3 {
            log::warn!("table has {} header rows, leaving them unmerged", rows);
            diagnostics.push(Diagnostic::UnexpectedHeaderRows { rows });
            return;
        }
        if rows != 3 {
            return;
        }

        let labels = self.headers.rows.remove(1);
        let names = &mut self.headers.rows[1].cells;

        let mut placements = Vec::new();
        for label in labels.cells.into_iter().filter(|c| !c.is_only_whitespace()) {
            let center = label.center_x();
            let target = match names.iter().position(|c| c.could_contain(center)) {
                Some(idx) => Some(idx),
                None => {
                    let nearest = names
                        .iter()
                        .enumerate()
                        .min_by(|(_, a), (_, b)| {
                            (a.center_x() - center)
                                .abs()
                                .total_cmp(&(b.center_x() - center).abs())
                        })
                        .map(|(idx, _)| idx);
                    log::warn!(
                        "header label {:?} is not above any column, using nearest {:?}",
                        label.text(),
                        nearest
                    );
                    diagnostics.push(Diagnostic::UnmatchedHeaderLabel {
                        label: label.text().to_string(),
                    });
                    nearest
                }
            };
            placements.push((target, label));
        }

        for (target, label) in placements {
            match target {
                Some(idx) => names[idx].prepend(&label, " "),
                None => names.push(label),
            }
        }
    }

    /// Join a detached row onto the row before it when that row is missing
    /// columns and the detached cells fill no more than the gap. A row takes
    /// at most one tail; any other detached row stays a row of its own.
    fn knit_detached_rows(&mut self) {
        let columns = self.column_count();
        let mut knitted: Vec<Row> = Vec::with_capacity(self.body.rows.len());
        let mut base_has_tail = false;
        for row in self.body.rows.drain(..) {
            let tail = row.cells.iter().filter(|c| !c.is_only_whitespace()).count();
            match knitted.last_mut() {
                Some(base)
                    if row.detached
                        && !base_has_tail
                        && tail > 0
                        && base.cells.len() + tail <= columns =>
                {
                    log::debug!("table: knitting split row of {} cells", tail);
                    base.cells
                        .extend(row.cells.into_iter().filter(|c| !c.is_only_whitespace()));
                    base.cells.sort_by(|a, b| a.x.total_cmp(&b.x));
                    base_has_tail = true;
                }
                _ => {
                    if row.detached {
                        log::trace!("table: detached row of {} cells kept as a row", tail);
                    }
                    knitted.push(row);
                    base_has_tail = false;
                }
            }
        }
        self.body.rows = knitted;
    }
}

/// Cell fragments are words or lines; keep them apart with a space.
fn join_cell(cell: &mut TextRun, fragment: &Fragment, kind: FormatKind) {
    if !fragment.text.starts_with(char::is_whitespace) {
        cell.ensure_trailing_space();
    }
    cell.append(fragment, kind);
}

impl Serialize for TableBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TableBlock", 2)?;
        state.serialize_field("headers", &self.header_strings())?;
        state.serialize_field("rows", &self.row_strings())?;
        state.end()
    }
}
