mod layout;
mod table;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::config::{ExportConfig, PageGeometry};
use crate::error::Error;
use crate::fonts::{FontFace, MM_PER_PT, register_fonts, to_winansi_bytes};
use crate::model::FormExport;

pub use layout::{
    Advance, DrawOp, LayoutEngine, Page, PageCursor, PageSet, TextAlign, TextRole,
};
pub use table::{TableRenderer, render_table};

const TITLE_FONT_SIZE: f32 = 18.0;
const SUBTITLE_FONT_SIZE: f32 = 10.0;
const HEADING_FONT_SIZE: f32 = 14.0;
const TOC_FONT_SIZE: f32 = 12.0;
const FOOTER_FONT_SIZE: f32 = 10.0;
const TOC_INDENT: f32 = 5.0;
/// Gap above and below the rule that closes the table of contents.
const TOC_RULE_GAP_ABOVE: f32 = 5.0;
const TOC_RULE_GAP_BELOW: f32 = 10.0;

/// Paginated page description of one form, ready for encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedDocument {
    pub title: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text ops of one role across all pages, in page order.
    pub fn texts_with_role(&self, role: TextRole) -> Vec<&DrawOp> {
        self.pages
            .iter()
            .flat_map(|p| p.texts_with_role(role))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ComposeState {
    Title,
    TableOfContents,
    SectionBody(usize),
    Footer,
    Done,
}

/// Lays out one form: title block, optional table of contents, one
/// Field/Value table per section, then "Page i of N" on every page.
pub struct DocumentComposer<'a> {
    geometry: &'a PageGeometry,
    include_toc: bool,
}

impl<'a> DocumentComposer<'a> {
    pub fn new(geometry: &'a PageGeometry, include_toc: bool) -> Self {
        Self {
            geometry,
            include_toc,
        }
    }

    pub fn compose(&self, form: &FormExport, exported_at: &str) -> Result<RenderedDocument, Error> {
        self.geometry.validate()?;
        let g = self.geometry;
        let engine = LayoutEngine::new(g);
        let tables = TableRenderer::new(g);
        let sections = form.extracted_data.sections();

        let mut pages = PageSet::new();
        let mut cursor = engine.first_page();
        let mut state = ComposeState::Title;

        loop {
            state = match state {
                ComposeState::Title => {
                    cursor = self.title_block(&mut pages, form, exported_at);
                    if sections.is_empty() {
                        ComposeState::Footer
                    } else if self.include_toc {
                        ComposeState::TableOfContents
                    } else {
                        ComposeState::SectionBody(0)
                    }
                }
                ComposeState::TableOfContents => {
                    cursor = self.table_of_contents(&mut pages, &engine, form, cursor)?;
                    ComposeState::SectionBody(0)
                }
                ComposeState::SectionBody(i) => {
                    let section = &sections[i];
                    let min_h = if section.fields.is_empty() {
                        g.section_header_height + g.row_height
                    } else {
                        g.section_min_height()
                    };
                    // A section header never sits alone at the foot of a page.
                    let at = engine.ensure(&mut pages, cursor, min_h)?;
                    pages.draw(
                        at.page,
                        DrawOp::Text {
                            x: g.margin_left,
                            y: at.y + g.section_header_height * 0.7,
                            text: section.name.clone(),
                            face: FontFace::Bold,
                            size: HEADING_FONT_SIZE,
                            align: TextAlign::Left,
                            role: TextRole::SectionHeader,
                        },
                    );
                    let headers = ["Field".to_string(), "Value".to_string()];
                    let rows: Vec<Vec<String>> = section
                        .fields
                        .iter()
                        .map(|f| vec![f.name.clone(), f.value.clone()])
                        .collect();
                    cursor = tables
                        .render(&mut pages, &headers, &rows, at.down(g.section_header_height))?
                        .down(g.section_gap);
                    if i + 1 < sections.len() {
                        ComposeState::SectionBody(i + 1)
                    } else {
                        ComposeState::Footer
                    }
                }
                ComposeState::Footer => {
                    self.stamp_page_numbers(&mut pages);
                    ComposeState::Done
                }
                ComposeState::Done => break,
            };
        }

        let pages = pages.into_pages();
        log::debug!(
            "composed {:?}: sections={} fields={} pages={}",
            form.template_type,
            sections.len(),
            form.extracted_data.field_count(),
            pages.len()
        );
        Ok(RenderedDocument {
            title: document_title(&form.template_type),
            geometry: *g,
            pages,
        })
    }

    /// Template name, source file, timestamp and a rule, always on page 1.
    fn title_block(&self, pages: &mut PageSet, form: &FormExport, exported_at: &str) -> PageCursor {
        let g = self.geometry;
        let center = g.page_width / 2.0;
        let top = g.margin_top;
        let centered = |y: f32, text: String, face: FontFace, size: f32, role: TextRole| DrawOp::Text {
            x: center,
            y,
            text,
            face,
            size,
            align: TextAlign::Center,
            role,
        };

        pages.draw(
            1,
            centered(
                top,
                document_title(&form.template_type),
                FontFace::Bold,
                TITLE_FONT_SIZE,
                TextRole::Title,
            ),
        );
        pages.draw(
            1,
            centered(
                top + 10.0,
                format!("Original File: {}", form.file_name),
                FontFace::Regular,
                SUBTITLE_FONT_SIZE,
                TextRole::Subtitle,
            ),
        );
        pages.draw(
            1,
            centered(
                top + 15.0,
                format!("Exported on: {exported_at}"),
                FontFace::Regular,
                SUBTITLE_FONT_SIZE,
                TextRole::Subtitle,
            ),
        );
        let rule_y = top + 20.0;
        pages.draw(
            1,
            DrawOp::Line {
                x1: g.margin_left,
                y1: rule_y,
                x2: g.page_width - g.margin_right,
                y2: rule_y,
            },
        );
        PageCursor::new(1, rule_y + 10.0)
    }

    fn table_of_contents(
        &self,
        pages: &mut PageSet,
        engine: &LayoutEngine,
        form: &FormExport,
        cursor: PageCursor,
    ) -> Result<PageCursor, Error> {
        let g = self.geometry;
        let heading = engine.advance(pages, cursor, g.section_header_height)?;
        pages.draw(
            heading.at.page,
            DrawOp::Text {
                x: g.margin_left,
                y: heading.at.y + g.section_header_height * 0.7,
                text: "Form Sections:".to_string(),
                face: FontFace::Bold,
                size: HEADING_FONT_SIZE,
                align: TextAlign::Left,
                role: TextRole::TocHeading,
            },
        );

        let mut cursor = heading.next;
        for (i, section) in form.extracted_data.sections().iter().enumerate() {
            let entry = engine.advance(pages, cursor, g.toc_line_height)?;
            pages.draw(
                entry.at.page,
                DrawOp::Text {
                    x: g.margin_left + TOC_INDENT,
                    y: entry.at.y + g.toc_line_height * 0.7,
                    text: format!("{}. {}", i + 1, section.name),
                    face: FontFace::Regular,
                    size: TOC_FONT_SIZE,
                    align: TextAlign::Left,
                    role: TextRole::TocEntry,
                },
            );
            cursor = entry.next;
        }

        let rule = engine.advance(pages, cursor, TOC_RULE_GAP_ABOVE)?;
        let rule_y = rule.next.y;
        pages.draw(
            rule.at.page,
            DrawOp::Line {
                x1: g.margin_left,
                y1: rule_y,
                x2: g.page_width - g.margin_right,
                y2: rule_y,
            },
        );
        Ok(rule.next.down(TOC_RULE_GAP_BELOW))
    }

    /// Second pass: the total is only known once the body is laid out.
    fn stamp_page_numbers(&self, pages: &mut PageSet) {
        let g = self.geometry;
        let total = pages.len();
        for page in pages.pages_mut() {
            page.ops.push(DrawOp::Text {
                x: g.page_width / 2.0,
                y: g.footer_baseline,
                text: format!("Page {} of {}", page.number, total),
                face: FontFace::Regular,
                size: FOOTER_FONT_SIZE,
                align: TextAlign::Center,
                role: TextRole::Footer,
            });
        }
    }
}

pub(crate) fn document_title(template_type: &str) -> String {
    format!("{template_type} Form")
}

/// Lay out `form` with the page settings in `config`.
pub fn compose(
    form: &FormExport,
    exported_at: &str,
    config: &ExportConfig,
) -> Result<RenderedDocument, Error> {
    DocumentComposer::new(&config.page, config.include_toc).compose(form, exported_at)
}

fn pt(units: f32) -> f32 {
    units / MM_PER_PT
}

fn page_content(page: &Page, geometry: &PageGeometry) -> Content {
    let page_h = pt(geometry.page_height);
    // Flip from top-left page units to bottom-left points.
    let y_pt = |y: f32| page_h - pt(y);
    let mut content = Content::new();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                face,
                size,
                align,
                ..
            } => {
                if text.is_empty() {
                    continue;
                }
                let x = match align {
                    TextAlign::Left => pt(*x),
                    TextAlign::Center => pt(*x) - face.text_width_pt(text, *size) / 2.0,
                };
                content.begin_text();
                content.set_font(Name(face.resource_name().as_bytes()), *size);
                content.next_line(x, y_pt(*y));
                content.show(Str(&to_winansi_bytes(text)));
                content.end_text();
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                gray,
            } => {
                content.save_state();
                content.set_fill_gray(*gray as f32 / 255.0);
                content.rect(pt(*x), y_pt(y + height), pt(*width), pt(*height));
                content.fill_nonzero();
                content.restore_state();
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
            } => {
                content.save_state();
                content.set_line_width(0.5);
                content.set_stroke_gray(0.6);
                content.rect(pt(*x), y_pt(y + height), pt(*width), pt(*height));
                content.stroke();
                content.restore_state();
            }
            DrawOp::Line { x1, y1, x2, y2 } => {
                content.save_state();
                content.set_line_width(0.5);
                content.move_to(pt(*x1), y_pt(*y1));
                content.line_to(pt(*x2), y_pt(*y2));
                content.stroke();
                content.restore_state();
            }
        }
    }
    content
}

/// Encode a page description as PDF bytes.
pub fn render(doc: &RenderedDocument) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();
    let font_pairs = register_fonts(&mut pdf, &mut alloc);

    let n = doc.pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in doc.pages.iter().enumerate() {
        let raw = page_content(page, &doc.geometry).finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let media_box = Rect::new(0.0, 0.0, pt(doc.geometry.page_width), pt(doc.geometry.page_height));
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(media_box)
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        for (name, font_ref) in &font_pairs {
            fonts.pair(Name(name.as_bytes()), *font_ref);
        }
    }

    pdf.document_info(info_id)
        .title(TextStr(&doc.title))
        .producer(TextStr(concat!("form-export ", env!("CARGO_PKG_VERSION"))));

    let bytes = pdf.finish();
    log::info!(
        "PDF encode: pages={} bytes={} in {:.1}ms",
        n,
        bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(bytes)
}
