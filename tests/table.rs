mod common;

use form_export::pdf::{DrawOp, Page, PageCursor, PageSet, TableRenderer, TextRole};
use form_export::{FontFace, PageGeometry};

fn headers() -> Vec<String> {
    vec!["Field".to_string(), "Value".to_string()]
}

fn rows(n: usize) -> Vec<Vec<String>> {
    (0..n)
        .map(|i| vec![format!("Field {i}"), format!("Value {i}")])
        .collect()
}

fn fills(pages: &PageSet, wanted: u8) -> usize {
    pages
        .pages()
        .iter()
        .flat_map(|p| &p.ops)
        .filter(|op| matches!(op, DrawOp::FillRect { gray, .. } if *gray == wanted))
        .count()
}

/// (x, width) of each header cell: the stroked cells of the page's first row.
fn header_cells(page: &Page) -> Vec<(f32, f32)> {
    let strokes = || {
        page.ops.iter().filter_map(|op| match op {
            DrawOp::StrokeRect { x, y, width, .. } => Some((*x, *y, *width)),
            _ => None,
        })
    };
    let top = strokes().next().map(|(_, y, _)| y);
    strokes()
        .filter(|(_, y, _)| Some(*y) == top)
        .map(|(x, _, width)| (x, width))
        .collect()
}

fn header_text_xs(page: &Page) -> Vec<f32> {
    page.texts_with_role(TextRole::TableHeader)
        .filter_map(|op| match op {
            DrawOp::Text { x, .. } => Some(*x),
            _ => None,
        })
        .collect()
}

#[test]
fn header_repeats_on_every_continuation_page() {
    common::init_logging();
    let geometry = PageGeometry::default();
    let renderer = TableRenderer::new(&geometry);
    let mut pages = PageSet::new();

    // 34 data rows fit under the header on a page starting at the top margin.
    let data = rows(100);
    let end = renderer
        .render(&mut pages, &headers(), &data, PageCursor::new(1, 20.0))
        .expect("render");

    assert_eq!(pages.len(), 3);
    assert_eq!(end.page, 3);
    for page in pages.pages() {
        let first_text = page.texts().next();
        assert_eq!(first_text, Some("Field"), "page {} must open with the header", page.number);
        assert_eq!(page.texts_with_role(TextRole::TableHeader).count(), 2);
    }

    // Repeated headers keep page 1's column positions and widths.
    let first = &pages.pages()[0];
    let columns = header_cells(first);
    let width = geometry.content_width() / 2.0;
    let left = geometry.margin_left;
    assert_eq!(columns, [(left, width), (left + width, width)]);
    for page in &pages.pages()[1..] {
        assert_eq!(header_cells(page), columns, "page {}", page.number);
        assert_eq!(header_text_xs(page), header_text_xs(first), "page {}", page.number);
    }

    // Every data row exactly once, in order.
    let cells: Vec<&str> = pages
        .pages()
        .iter()
        .flat_map(|p| p.texts_with_role(TextRole::Cell))
        .filter_map(DrawOp::text_content)
        .collect();
    assert_eq!(cells.len(), 200);
    for (i, pair) in cells.chunks(2).enumerate() {
        assert_eq!(pair, [format!("Field {i}"), format!("Value {i}")]);
    }
}

#[test]
fn nothing_drawn_below_content_bottom() {
    let geometry = PageGeometry::default();
    let mut pages = PageSet::new();
    TableRenderer::new(&geometry)
        .render(&mut pages, &headers(), &rows(75), PageCursor::new(1, 200.0))
        .expect("render");

    for page in pages.pages() {
        for op in &page.ops {
            assert!(
                op.bottom() <= geometry.content_bottom,
                "page {} op reaches {:.2}: {op:?}",
                page.number,
                op.bottom()
            );
        }
    }
}

#[test]
fn header_never_orphaned_at_page_foot() {
    let geometry = PageGeometry::default();
    let mut pages = PageSet::new();

    // Room for the header row but not for header plus one data row.
    TableRenderer::new(&geometry)
        .render(&mut pages, &headers(), &rows(3), PageCursor::new(1, 260.0))
        .expect("render");

    assert_eq!(pages.len(), 2);
    assert!(pages.pages()[0].ops.is_empty());
    assert_eq!(pages.pages()[1].texts_with_role(TextRole::TableHeader).count(), 2);
}

#[test]
fn zero_rows_draw_header_only() {
    let geometry = PageGeometry::default();
    let mut pages = PageSet::new();
    let end = TableRenderer::new(&geometry)
        .render(&mut pages, &headers(), &[], PageCursor::new(1, 40.0))
        .expect("render");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages.pages()[0].texts().collect::<Vec<_>>(), ["Field", "Value"]);
    assert_eq!(end, PageCursor::new(1, 40.0 + 7.0 + 10.0));
}

#[test]
fn odd_rows_are_striped_and_header_filled() {
    let geometry = PageGeometry::default();
    let mut pages = PageSet::new();
    TableRenderer::new(&geometry)
        .render(&mut pages, &headers(), &rows(5), PageCursor::new(1, 20.0))
        .expect("render");

    assert_eq!(fills(&pages, 240), 1);
    assert_eq!(fills(&pages, 250), 2);
}

#[test]
fn long_cell_text_is_truncated_to_column() {
    let geometry = PageGeometry::default();
    let mut pages = PageSet::new();
    let long = "An unusually long value that cannot possibly fit into half of an A4 content width";
    TableRenderer::new(&geometry)
        .render(
            &mut pages,
            &headers(),
            &[vec!["Notes".to_string(), long.to_string()]],
            PageCursor::new(1, 20.0),
        )
        .expect("render");

    let inner = geometry.content_width() / 2.0 - 2.0 * geometry.cell_padding;
    let value = pages.pages()[0]
        .texts_with_role(TextRole::Cell)
        .filter_map(DrawOp::text_content)
        .nth(1)
        .expect("value cell");
    assert!(value.ends_with("..."), "{value:?}");
    assert!(long.starts_with(value.trim_end_matches("...")));
    assert!(FontFace::Regular.text_width(value, 10.0) <= inner + 0.01);
}
