//! Static export configuration: page geometry and which outputs to produce.
//!
//! All lengths are page units (millimetres on A4) measured from the top-left
//! corner, growing downward. The PDF encoder converts to points.

use crate::error::Error;
use crate::sheet::ViewStrategy;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    /// Lowest y any body content may reach.
    pub content_bottom: f32,
    /// Baseline of the "Page i of N" footer.
    pub footer_baseline: f32,
    pub row_height: f32,
    pub cell_padding: f32,
    pub table_gap: f32,
    pub section_gap: f32,
    pub section_header_height: f32,
    pub toc_line_height: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 20.0,
            margin_right: 20.0,
            margin_top: 20.0,
            content_bottom: 270.0,
            footer_baseline: 287.0,
            row_height: 7.0,
            cell_padding: 5.0,
            table_gap: 10.0,
            section_gap: 5.0,
            section_header_height: 10.0,
            toc_line_height: 8.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Vertical space available between the top margin and the content bottom.
    pub fn body_height(&self) -> f32 {
        self.content_bottom - self.margin_top
    }

    /// Space a section needs before it may start on the current page: its
    /// header, the table header row and the first data row.
    pub fn section_min_height(&self) -> f32 {
        self.section_header_height + 2.0 * self.row_height
    }

    /// Rejects geometries where a fresh page cannot hold a section start, or
    /// where the vertical thresholds are out of order.
    pub fn validate(&self) -> Result<(), Error> {
        if self.content_width() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "margins {:.1}+{:.1} leave no width on a {:.1} wide page",
                self.margin_left, self.margin_right, self.page_width
            )));
        }
        if !(self.margin_top < self.content_bottom
            && self.content_bottom < self.footer_baseline
            && self.footer_baseline <= self.page_height)
        {
            return Err(Error::InvalidGeometry(format!(
                "expected top {:.1} < content bottom {:.1} < footer {:.1} <= page height {:.1}",
                self.margin_top,
                self.content_bottom,
                self.footer_baseline,
                self.page_height
            )));
        }
        if self.row_height <= 0.0 || self.section_min_height() > self.body_height() {
            return Err(Error::InvalidGeometry(format!(
                "section start of {:.1} does not fit into body height {:.1}",
                self.section_min_height(),
                self.body_height()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub page: PageGeometry,
    pub include_toc: bool,
    /// Fill in template sections/fields missing from the saved data.
    pub complete_with_template: bool,
    pub form_views: Vec<ViewStrategy>,
    pub all_forms_views: Vec<ViewStrategy>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            include_toc: true,
            complete_with_template: true,
            form_views: vec![
                ViewStrategy::Summary,
                ViewStrategy::Triple,
                ViewStrategy::SectionDetail,
            ],
            all_forms_views: vec![ViewStrategy::Summary, ViewStrategy::CrossFormPivot],
        }
    }
}
