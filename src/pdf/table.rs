use crate::config::PageGeometry;
use crate::error::Error;
use crate::fonts::FontFace;

use super::layout::{DrawOp, LayoutEngine, PageCursor, PageSet, TextAlign, TextRole};

const HEADER_FILL: u8 = 240;
const STRIPE_FILL: u8 = 250;
const CELL_FONT_SIZE: f32 = 10.0;
/// Baseline position inside a row, as a fraction of the row height.
const BASELINE_RATIO: f32 = 0.7;

/// Uniform-column grid renderer with a repeated header row.
pub struct TableRenderer<'a> {
    geometry: &'a PageGeometry,
    engine: LayoutEngine,
}

impl<'a> TableRenderer<'a> {
    pub fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            engine: LayoutEngine::new(geometry),
        }
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    fn column_width(&self, columns: usize) -> f32 {
        self.geometry.content_width() / columns.max(1) as f32
    }

    fn draw_row(
        &self,
        pages: &mut PageSet,
        at: PageCursor,
        cells: &[String],
        columns: usize,
        role: TextRole,
        fill: Option<u8>,
    ) {
        let g = self.geometry;
        let col_w = self.column_width(columns);
        let row_h = g.row_height;
        let face = match role {
            TextRole::TableHeader => FontFace::Bold,
            _ => FontFace::Regular,
        };

        if let Some(gray) = fill {
            pages.draw(
                at.page,
                DrawOp::FillRect {
                    x: g.margin_left,
                    y: at.y,
                    width: g.content_width(),
                    height: row_h,
                    gray,
                },
            );
        }

        for ci in 0..columns {
            let cell_x = g.margin_left + ci as f32 * col_w;
            pages.draw(
                at.page,
                DrawOp::StrokeRect {
                    x: cell_x,
                    y: at.y,
                    width: col_w,
                    height: row_h,
                },
            );
            // Short rows leave trailing cells blank.
            let Some(text) = cells.get(ci) else {
                continue;
            };
            let inner_w = (col_w - 2.0 * g.cell_padding).max(0.0);
            pages.draw(
                at.page,
                DrawOp::Text {
                    x: cell_x + g.cell_padding,
                    y: at.y + row_h * BASELINE_RATIO,
                    text: face.fit_text(text, CELL_FONT_SIZE, inner_w),
                    face,
                    size: CELL_FONT_SIZE,
                    align: TextAlign::Left,
                    role,
                },
            );
        }
    }

    /// Draw `headers` then `rows` starting at `start`. The header row is
    /// repeated at the top of every continuation page. Returns the cursor
    /// below the table plus the inter-table gap.
    pub fn render(
        &self,
        pages: &mut PageSet,
        headers: &[String],
        rows: &[Vec<String>],
        start: PageCursor,
    ) -> Result<PageCursor, Error> {
        let columns = headers
            .len()
            .max(rows.iter().map(Vec::len).max().unwrap_or(0))
            .max(1);
        let row_h = self.geometry.row_height;

        // The header never ends a page on its own.
        let lead = if rows.is_empty() { row_h } else { 2.0 * row_h };
        let mut cursor = self.engine.ensure(pages, start, lead)?;
        self.draw_row(pages, cursor, headers, columns, TextRole::TableHeader, Some(HEADER_FILL));
        cursor = cursor.down(row_h);

        for (ri, row) in rows.iter().enumerate() {
            let step = self.engine.advance(pages, cursor, row_h)?;
            let mut at = step.at;
            if step.new_page {
                self.draw_row(pages, at, headers, columns, TextRole::TableHeader, Some(HEADER_FILL));
                at = self.engine.advance(pages, at.down(row_h), row_h)?.at;
            }
            log::debug!("table row={ri} page={} y={:.2}", at.page, at.y);
            let stripe = (ri % 2 == 1).then_some(STRIPE_FILL);
            self.draw_row(pages, at, row, columns, TextRole::Cell, stripe);
            cursor = at.down(row_h);
        }

        Ok(cursor.down(self.geometry.table_gap))
    }
}

/// Convenience wrapper over [`TableRenderer::render`].
pub fn render_table(
    geometry: &PageGeometry,
    pages: &mut PageSet,
    headers: &[String],
    rows: &[Vec<String>],
    start: PageCursor,
) -> Result<PageCursor, Error> {
    TableRenderer::new(geometry).render(pages, headers, rows, start)
}
