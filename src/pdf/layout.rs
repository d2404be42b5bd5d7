use crate::config::PageGeometry;
use crate::error::Error;
use crate::fonts::FontFace;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextAlign {
    Left,
    Center,
}

/// What a piece of text is, so page descriptions can be inspected without
/// re-deriving structure from coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Subtitle,
    TocHeading,
    TocEntry,
    SectionHeader,
    TableHeader,
    Cell,
    Footer,
}

/// One positioned drawing instruction. Coordinates are page units from the
/// top-left corner; `y` of a text op is its baseline.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size: f32,
        align: TextAlign,
        role: TextRole,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: u8,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
}

impl DrawOp {
    pub fn text_content(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Lowest y the op touches.
    pub fn bottom(&self) -> f32 {
        match *self {
            DrawOp::Text { y, .. } => y,
            DrawOp::FillRect { y, height, .. } | DrawOp::StrokeRect { y, height, .. } => y + height,
            DrawOp::Line { y1, y2, .. } => y1.max(y2),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text_content)
    }

    /// Text ops of one role, in drawing order.
    pub fn texts_with_role(&self, wanted: TextRole) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(move |op| matches!(op, DrawOp::Text { role, .. } if *role == wanted))
    }
}

/// Pages produced so far. Always holds at least page 1, and pages stay
/// addressable after later ones exist so a final pass can stamp them.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSet {
    pages: Vec<Page>,
}

impl Default for PageSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSet {
    pub fn new() -> Self {
        Self {
            pages: vec![Page {
                number: 1,
                ops: Vec::new(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    fn start_page(&mut self) -> usize {
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            number,
            ops: Vec::new(),
        });
        number
    }

    /// Append `op` to page `number`, creating any pages up to it.
    pub fn draw(&mut self, number: usize, op: DrawOp) {
        while self.pages.len() < number {
            self.start_page();
        }
        self.pages[number.max(1) - 1].ops.push(op);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageCursor {
    /// 1-based.
    pub page: usize,
    pub y: f32,
}

impl PageCursor {
    pub fn new(page: usize, y: f32) -> Self {
        Self { page, y }
    }

    pub fn down(self, dy: f32) -> Self {
        Self {
            page: self.page,
            y: self.y + dy,
        }
    }
}

/// Result of reserving vertical space: draw at `at`, continue from `next`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Advance {
    pub at: PageCursor,
    pub next: PageCursor,
    pub new_page: bool,
}

/// Page-flow primitive: decides where a block of a given height goes and
/// opens pages when the current one cannot hold it.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEngine {
    top: f32,
    bottom: f32,
}

impl LayoutEngine {
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            top: geometry.margin_top,
            bottom: geometry.content_bottom,
        }
    }

    /// Engine with an explicit top margin and bottom threshold.
    pub fn with_bounds(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Cursor at the top of page 1.
    pub fn first_page(&self) -> PageCursor {
        PageCursor::new(1, self.top)
    }

    /// Whether `needed` fits below `cursor` without crossing the bottom.
    /// Ending exactly on the bottom threshold fits.
    pub fn fits(&self, cursor: PageCursor, needed: f32) -> bool {
        cursor.y + needed <= self.bottom
    }

    /// Break to a new page when `needed` does not fit; the cursor does not move
    /// otherwise.
    pub fn ensure(
        &self,
        pages: &mut PageSet,
        cursor: PageCursor,
        needed: f32,
    ) -> Result<PageCursor, Error> {
        let available = self.bottom - self.top;
        if needed > available {
            return Err(Error::LayoutOverflow { needed, available });
        }
        if self.fits(cursor, needed) {
            return Ok(cursor);
        }
        let page = cursor.page + 1;
        while pages.len() < page {
            pages.start_page();
        }
        log::debug!(
            "page break: y={:.2} needed={:.2} bottom={:.2} -> page {page}",
            cursor.y,
            needed,
            self.bottom
        );
        Ok(PageCursor::new(page, self.top))
    }

    /// Reserve `needed` units: place them on the current page when they fit,
    /// otherwise at the top of a new page.
    pub fn advance(
        &self,
        pages: &mut PageSet,
        cursor: PageCursor,
        needed: f32,
    ) -> Result<Advance, Error> {
        let at = self.ensure(pages, cursor, needed)?;
        Ok(Advance {
            at,
            next: at.down(needed),
            new_page: at.page != cursor.page,
        })
    }
}
