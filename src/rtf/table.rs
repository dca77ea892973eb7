//! Tables.
//!
//! A table is built in two phases. While staged, rows and columns of cell
//! content can be appended freely. The first geometry access freezes the
//! staged content into a fixed `rows x columns` grid: short rows are padded
//! with empty cells and every column gets `width / columns` points. After
//! that, staging fails with [`RtfError::TableFrozen`].
//!
//! Merging cells moves the covered content into the top-left
//! ("representative") cell. Only the representative and the first cell of
//! each continuation row are written; the rest of the region is covered by
//! their widened cell boundaries.

use super::block::{BlockList, ContentPolicy};
use super::border::{Border, Borders};
use super::error::{RtfError, RtfResult};
use super::format::CharFormat;
use super::types::{Alignment, ColorDescriptor, Direction, Margins, VerticalAlignment};
use super::writer::RtfWriter;
use crate::common::unit::pt_to_twip;
use log::debug;
use smallvec::SmallVec;

/// Half the gap between cell contents, in twips.
const DEFAULT_CELL_GAP: i64 = 108;

/// Where a cell sits inside a merged region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMergeInfo {
    /// Row and column of the representative cell
    pub representative: (usize, usize),
    pub row_span: usize,
    pub col_span: usize,
    /// Offset of this cell from the representative
    pub row_offset: usize,
    pub col_offset: usize,
}

impl CellMergeInfo {
    #[inline]
    pub fn is_representative(&self) -> bool {
        self.row_offset == 0 && self.col_offset == 0
    }

    /// Whether this cell is written: it begins the region's column span
    /// in its row.
    #[inline]
    pub fn starts_column_span(&self) -> bool {
        self.col_offset == 0
    }
}

/// A merged region of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRegion {
    pub top: usize,
    pub left: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl MergeRegion {
    fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.top
            && row < self.top + self.row_span
            && col >= self.left
            && col < self.left + self.col_span
    }

    /// Cells along one outer edge, in scan order.
    fn edge_cells(&self, direction: Direction) -> Vec<(usize, usize)> {
        let bottom = self.top + self.row_span - 1;
        let right = self.left + self.col_span - 1;
        match direction {
            Direction::Top => (self.left..=right).map(|c| (self.top, c)).collect(),
            Direction::Bottom => (self.left..=right).map(|c| (bottom, c)).collect(),
            Direction::Left => (self.top..=bottom).map(|r| (r, self.left)).collect(),
            Direction::Right => (self.top..=bottom).map(|r| (r, right)).collect(),
        }
    }
}

/// A cell of a frozen table.
#[derive(Debug, Clone)]
pub struct TableCell {
    blocks: BlockList,
    borders: Borders,
    background: Option<ColorDescriptor>,
    vertical_alignment: VerticalAlignment,
    /// Width in points
    width: f32,
    merge: Option<CellMergeInfo>,
}

impl TableCell {
    fn new(blocks: BlockList, width: f32) -> Self {
        Self {
            blocks,
            borders: Borders::default(),
            background: None,
            vertical_alignment: VerticalAlignment::default(),
            width,
            merge: None,
        }
    }

    #[inline]
    pub fn blocks(&self) -> &BlockList {
        &self.blocks
    }

    #[inline]
    pub fn blocks_mut(&mut self) -> &mut BlockList {
        &mut self.blocks
    }

    #[inline]
    pub fn borders(&self) -> &Borders {
        &self.borders
    }

    #[inline]
    pub fn borders_mut(&mut self) -> &mut Borders {
        &mut self.borders
    }

    pub fn set_border(&mut self, direction: Direction, border: Border) -> &mut Self {
        *self.borders.get_mut(direction) = border;
        self
    }

    #[inline]
    pub fn background(&self) -> Option<ColorDescriptor> {
        self.background
    }

    pub fn set_background(&mut self, color: ColorDescriptor) -> &mut Self {
        self.background = Some(color);
        self
    }

    #[inline]
    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) -> &mut Self {
        self.vertical_alignment = alignment;
        self
    }

    /// Width in points.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn merge_info(&self) -> Option<&CellMergeInfo> {
        self.merge.as_ref()
    }

    #[inline]
    pub fn is_merged(&self) -> bool {
        self.merge.is_some()
    }
}

/// A table block.
#[derive(Debug, Clone)]
pub struct Table {
    /// Total width in points
    width: f32,
    staged: Vec<Vec<BlockList>>,
    frozen: bool,
    /// Row-major grid, valid once frozen
    cells: Vec<TableCell>,
    rows: usize,
    cols: usize,
    row_heights: Vec<Option<f32>>,
    row_keep: Vec<bool>,
    merges: Vec<MergeRegion>,
    alignment: Alignment,
    start_new_page: bool,
    cell_padding: Margins,
    title_rows: usize,
    header_background: Option<ColorDescriptor>,
    row_background: Option<ColorDescriptor>,
    alt_row_background: Option<ColorDescriptor>,
}

fn cell_blocks() -> BlockList {
    BlockList::with_policy(ContentPolicy::TABLE_CELL)
}

impl Table {
    /// Create an empty table `width` points wide, ready for staging.
    pub fn new(width: f32) -> Self {
        Self {
            width,
            staged: Vec::new(),
            frozen: false,
            cells: Vec::new(),
            rows: 0,
            cols: 0,
            row_heights: Vec::new(),
            row_keep: Vec::new(),
            merges: Vec::new(),
            alignment: Alignment::default(),
            start_new_page: false,
            cell_padding: Margins::default(),
            title_rows: 0,
            header_background: None,
            row_background: None,
            alt_row_background: None,
        }
    }

    /// Create a frozen table with an empty `rows x cols` grid.
    pub fn with_grid(rows: usize, cols: usize, width: f32) -> Self {
        let mut table = Self::new(width);
        table.staged = (0..rows)
            .map(|_| (0..cols).map(|_| cell_blocks()).collect())
            .collect();
        table.freeze();
        table
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Width in points.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Number of rows; counts staged rows until the table is frozen.
    pub fn row_count(&self) -> usize {
        if self.frozen {
            self.rows
        } else {
            self.staged.len()
        }
    }

    /// Number of columns; the longest staged row until the table is frozen.
    pub fn column_count(&self) -> usize {
        if self.frozen {
            self.cols
        } else {
            self.staged.iter().map(Vec::len).max().unwrap_or(0)
        }
    }

    fn ensure_staging(&self) -> RtfResult<()> {
        if self.frozen {
            return Err(RtfError::TableFrozen);
        }
        Ok(())
    }

    /// Stage a row of `cells` empty cells and return them for filling.
    pub fn stage_row(&mut self, cells: usize) -> RtfResult<&mut [BlockList]> {
        self.ensure_staging()?;
        let index = self.staged.len();
        self.staged.push((0..cells).map(|_| cell_blocks()).collect());
        Ok(&mut self.staged[index])
    }

    /// Stage a row with one text paragraph per cell.
    pub fn stage_text_row<I, S>(&mut self, texts: I) -> RtfResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_staging()?;
        let row = texts
            .into_iter()
            .map(|text| {
                let mut blocks = cell_blocks();
                blocks.add_text_paragraph(text.as_ref());
                blocks
            })
            .collect();
        self.staged.push(row);
        Ok(self)
    }

    /// Stage a new last column: every staged row is padded to the current
    /// column count and gets one more empty cell. Returns the column index.
    pub fn stage_column(&mut self) -> RtfResult<usize> {
        self.ensure_staging()?;
        if self.staged.is_empty() {
            self.staged.push(Vec::new());
        }
        let col = self.column_count();
        for row in &mut self.staged {
            row.resize_with(col + 1, cell_blocks);
        }
        Ok(col)
    }

    /// Staged cell content, for filling cells staged by [`Table::stage_column`].
    pub fn staged_cell_mut(&mut self, row: usize, col: usize) -> RtfResult<&mut BlockList> {
        self.ensure_staging()?;
        self.staged
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(RtfError::InvalidCellIndex { row, col })
    }

    /// Freeze the staged content into the grid. Later calls do nothing.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        let rows = self.staged.len();
        let cols = self.column_count();
        let width = if cols == 0 { 0.0 } else { self.width / cols as f32 };

        let mut cells = Vec::with_capacity(rows * cols);
        for mut row in self.staged.drain(..) {
            row.resize_with(cols, cell_blocks);
            cells.extend(row.into_iter().map(|blocks| TableCell::new(blocks, width)));
        }
        self.cells = cells;
        self.rows = rows;
        self.cols = cols;
        self.row_heights = vec![None; rows];
        self.row_keep = vec![false; rows];
        self.frozen = true;
        debug!("table frozen into a {rows}x{cols} grid, {width}pt per column");
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn check_cell(&self, row: usize, col: usize) -> RtfResult<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(RtfError::InvalidCellIndex { row, col });
        }
        Ok(self.index(row, col))
    }

    /// A cell of the frozen grid. An unfrozen table has no cells yet.
    pub fn cell(&self, row: usize, col: usize) -> RtfResult<&TableCell> {
        let index = self.check_cell(row, col)?;
        Ok(&self.cells[index])
    }

    /// A cell of the grid, freezing the table first.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> RtfResult<&mut TableCell> {
        self.freeze();
        let index = self.check_cell(row, col)?;
        Ok(&mut self.cells[index])
    }

    #[inline]
    pub fn merges(&self) -> &[MergeRegion] {
        &self.merges
    }

    /// Merge a `row_span x col_span` region whose top-left cell is
    /// (`top`, `left`).
    ///
    /// Fails without touching the grid when the region leaves the grid or
    /// overlaps an earlier merge. Returns the representative cell.
    pub fn merge(
        &mut self,
        top: usize,
        left: usize,
        row_span: usize,
        col_span: usize,
    ) -> RtfResult<&mut TableCell> {
        self.freeze();
        let fits = |start: usize, span: usize, limit: usize| {
            span > 0 && start.checked_add(span).is_some_and(|end| end <= limit)
        };
        if !fits(top, row_span, self.rows) || !fits(left, col_span, self.cols) {
            return Err(RtfError::InvalidSpan {
                row: top,
                col: left,
                row_span,
                col_span,
            });
        }
        let region = MergeRegion {
            top,
            left,
            row_span,
            col_span,
        };
        for row in top..top + row_span {
            for col in left..left + col_span {
                if self.cells[self.index(row, col)].merge.is_some() {
                    return Err(RtfError::AlreadyMerged { row, col });
                }
            }
        }

        let rep = self.index(top, left);
        if row_span == 1 && col_span == 1 {
            return Ok(&mut self.cells[rep]);
        }

        let width: f32 = (left..left + col_span)
            .map(|col| self.cells[self.index(top, col)].width)
            .sum();
        let mut moved = Vec::new();
        for row in top..top + row_span {
            for col in left..left + col_span {
                let index = self.index(row, col);
                let cell = &mut self.cells[index];
                if index != rep {
                    moved.extend(cell.blocks.take_blocks());
                }
                if col == left {
                    cell.width = width;
                }
                cell.merge = Some(CellMergeInfo {
                    representative: (top, left),
                    row_span,
                    col_span,
                    row_offset: row - top,
                    col_offset: col - left,
                });
            }
        }
        self.cells[rep].blocks.extend_blocks(moved);
        self.merges.push(region);
        debug!("merged {row_span}x{col_span} cells at ({top}, {left})");
        Ok(&mut self.cells[rep])
    }

    /// Set the width of one column in points.
    ///
    /// Fails if a merge spanning more than this column touches it.
    pub fn set_column_width(&mut self, col: usize, width: f32) -> RtfResult<&mut Self> {
        self.freeze();
        if col >= self.cols {
            return Err(RtfError::InvalidCellIndex { row: 0, col });
        }
        if let Some(region) = self
            .merges
            .iter()
            .find(|m| m.col_span > 1 && m.left <= col && col < m.left + m.col_span)
        {
            return Err(RtfError::GeometryConflict(format!(
                "column {col} is part of a merge spanning {} columns at ({}, {})",
                region.col_span, region.top, region.left
            )));
        }
        for row in 0..self.rows {
            let index = self.index(row, col);
            self.cells[index].width = width;
        }
        Ok(self)
    }

    /// Set the minimum height of one row in points.
    ///
    /// Fails if a merge spanning more than this row touches it.
    pub fn set_row_height(&mut self, row: usize, height: f32) -> RtfResult<&mut Self> {
        self.freeze();
        if row >= self.rows {
            return Err(RtfError::InvalidCellIndex { row, col: 0 });
        }
        if let Some(region) = self
            .merges
            .iter()
            .find(|m| m.row_span > 1 && m.top <= row && row < m.top + m.row_span)
        {
            return Err(RtfError::GeometryConflict(format!(
                "row {row} is part of a merge spanning {} rows at ({}, {})",
                region.row_span, region.top, region.left
            )));
        }
        self.row_heights[row] = Some(height);
        Ok(self)
    }

    /// Keep a row together on one page.
    pub fn set_row_keep(&mut self, row: usize, keep: bool) -> RtfResult<&mut Self> {
        self.freeze();
        if row >= self.rows {
            return Err(RtfError::InvalidCellIndex { row, col: 0 });
        }
        self.row_keep[row] = keep;
        Ok(self)
    }

    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        self.alignment = alignment;
        self
    }

    #[inline]
    pub fn start_new_page(&self) -> bool {
        self.start_new_page
    }

    pub fn set_start_new_page(&mut self, start: bool) -> &mut Self {
        self.start_new_page = start;
        self
    }

    /// Space between cell borders and cell content, in points.
    pub fn set_cell_padding(&mut self, padding: Margins) -> &mut Self {
        self.cell_padding = padding;
        self
    }

    /// Repeat the first `count` rows at the top of every page.
    pub fn set_title_rows(&mut self, count: usize) -> &mut Self {
        self.title_rows = count;
        self
    }

    #[inline]
    pub fn title_row_count(&self) -> usize {
        self.title_rows
    }

    /// Background of title rows.
    pub fn set_header_background(&mut self, color: ColorDescriptor) -> &mut Self {
        self.header_background = Some(color);
        self
    }

    /// Backgrounds of body rows, alternating between `even` and `odd`.
    pub fn set_row_backgrounds(
        &mut self,
        even: Option<ColorDescriptor>,
        odd: Option<ColorDescriptor>,
    ) -> &mut Self {
        self.row_background = even;
        self.alt_row_background = odd;
        self
    }

    /// Set the edges on the outside of the grid.
    pub fn set_outer_border(&mut self, border: Border) -> &mut Self {
        self.freeze();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let index = self.index(row, col);
                let borders = &mut self.cells[index].borders;
                if row == 0 {
                    borders.top = border;
                }
                if row + 1 == self.rows {
                    borders.bottom = border;
                }
                if col == 0 {
                    borders.left = border;
                }
                if col + 1 == self.cols {
                    borders.right = border;
                }
            }
        }
        self
    }

    /// Set the edges between cells.
    pub fn set_inner_border(&mut self, border: Border) -> &mut Self {
        self.freeze();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let index = self.index(row, col);
                let borders = &mut self.cells[index].borders;
                if row > 0 {
                    borders.top = border;
                }
                if row + 1 < self.rows {
                    borders.bottom = border;
                }
                if col > 0 {
                    borders.left = border;
                }
                if col + 1 < self.cols {
                    borders.right = border;
                }
            }
        }
        self
    }

    /// Set one edge of one cell.
    pub fn set_border(
        &mut self,
        row: usize,
        col: usize,
        direction: Direction,
        border: Border,
    ) -> RtfResult<&mut Self> {
        self.cell_mut(row, col)?.set_border(direction, border);
        Ok(self)
    }

    /// Give every merged region consistent outer borders.
    ///
    /// For each outer edge the borders of the covered cells along it are
    /// tallied by stroke (color ignored) and the most frequent one wins; a
    /// tie goes to the one met first. The winner is stored on the
    /// representative and on the written cells of the continuation rows.
    /// Running this again changes nothing.
    pub fn resolve_merged_borders(&mut self) {
        for region in self.merges.clone() {
            for direction in Direction::ALL {
                let mut tally: SmallVec<[(Border, usize); 4]> = SmallVec::new();
                for (row, col) in region.edge_cells(direction) {
                    let border = *self.cells[self.index(row, col)].borders.get(direction);
                    match tally.iter_mut().find(|(b, _)| b.same_stroke(&border)) {
                        Some((_, count)) => *count += 1,
                        None => tally.push((border, 1)),
                    }
                }
                let mut winner: Option<(Border, usize)> = None;
                for &(border, count) in &tally {
                    if winner.is_none_or(|(_, best)| count > best) {
                        winner = Some((border, count));
                    }
                }
                let Some((winner, _)) = winner else {
                    continue;
                };

                let rep = self.index(region.top, region.left);
                let current = self.cells[rep].borders.get(direction);
                if !current.same_stroke(&winner) {
                    debug!(
                        "merged cell ({}, {}) takes majority {direction:?} border {winner:?}",
                        region.top, region.left
                    );
                }
                *self.cells[rep].borders.get_mut(direction) = winner;

                let last_row = region.top + region.row_span - 1;
                for row in region.top..=last_row {
                    let index = self.index(row, region.left);
                    let borders = &mut self.cells[index].borders;
                    match direction {
                        Direction::Left | Direction::Right => *borders.get_mut(direction) = winner,
                        Direction::Bottom if row == last_row => borders.bottom = winner,
                        _ => {},
                    }
                }
            }
        }
    }

    /// Region covering (`row`, `col`), if merged.
    pub fn merge_region_at(&self, row: usize, col: usize) -> Option<&MergeRegion> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    fn background_at(&self, row: usize, col: usize) -> Option<ColorDescriptor> {
        let (row, col) = self.cells[self.index(row, col)]
            .merge
            .map_or((row, col), |m| m.representative);
        if let Some(color) = self.cells[self.index(row, col)].background {
            return Some(color);
        }
        if row < self.title_rows {
            return self.header_background;
        }
        if (row - self.title_rows) % 2 == 1 && self.alt_row_background.is_some() {
            return self.alt_row_background;
        }
        self.row_background
    }

    fn write_row_header(&self, out: &mut RtfWriter, row: usize) {
        out.open_group()
            .control_word("trowd", None)
            .control_word("trgaph", Some(DEFAULT_CELL_GAP))
            .control_word(self.alignment.row_word(), None);
        if let Some(height) = self.row_heights[row] {
            out.control_word("trrh", Some(pt_to_twip(height) as i64));
        }
        if self.row_keep[row] {
            out.control_word("trkeep", None);
        }
        if row < self.title_rows {
            out.control_word("trhdr", None);
        }
        let padding = [
            (Direction::Left, "trpaddl", "trpaddfl"),
            (Direction::Top, "trpaddt", "trpaddft"),
            (Direction::Bottom, "trpaddb", "trpaddfb"),
            (Direction::Right, "trpaddr", "trpaddfr"),
        ];
        for (direction, word, unit) in padding {
            let pad = self.cell_padding.get(direction);
            if pad > 0.0 {
                out.control_word(word, Some(pt_to_twip(pad) as i64))
                    .control_word(unit, Some(3));
            }
        }
    }

    /// Write the table. Unfrozen tables have no grid and write nothing.
    pub(crate) fn write(&self, out: &mut RtfWriter, inherited: Option<&CharFormat>) {
        if !self.frozen {
            debug!("skipping a table that was never frozen");
            return;
        }
        if self.start_new_page {
            out.control_word("page", None);
        }
        for row in 0..self.rows {
            self.write_row_header(out, row);

            let mut right_edge = 0i64;
            let mut written = Vec::with_capacity(self.cols);
            for col in 0..self.cols {
                let cell = &self.cells[self.index(row, col)];
                if cell.merge.is_some_and(|m| !m.starts_column_span()) {
                    continue;
                }
                let rep = cell.merge.map_or(cell, |m| {
                    &self.cells[self.index(m.representative.0, m.representative.1)]
                });
                if let Some(m) = cell.merge.filter(|m| m.row_span > 1) {
                    let word = if m.row_offset == 0 { "clvmgf" } else { "clvmrg" };
                    out.control_word(word, None);
                }
                out.control_word(rep.vertical_alignment.cell_word(), None);
                cell.borders
                    .write_edges(out, ["clbrdrt", "clbrdrr", "clbrdrb", "clbrdrl"]);
                if let Some(color) = self.background_at(row, col) {
                    out.control_word("clcbpat", Some(color.index() as i64));
                }
                right_edge += pt_to_twip(cell.width) as i64;
                out.control_word("cellx", Some(right_edge));
                written.push(cell);
            }

            for cell in written {
                if cell.merge.is_some_and(|m| m.row_offset > 0) {
                    out.raw("\\pard\\intbl\\cell");
                } else {
                    cell.blocks.write_in_cell(out, inherited);
                }
            }
            out.raw("\\row}").newline();
        }
    }
}
