//! Page geometry for exporting rendered charts, one chart per page.
//!
//! Rasterizing is left to whatever renders the charts; this module only
//! decides where each image goes. All lengths are millimetres.

use serde::Serialize;

use crate::request::{ChartKind, Page};

pub const A4_SHORT_MM: f64 = 210.0;
pub const A4_LONG_MM: f64 = 297.0;
/// Image size used by the centred layout
pub const CENTERED_IMAGE: ImageSize = ImageSize { width: 1100, height: 600 };
/// Default renderer size for full-width exports
pub const DEFAULT_IMAGE: ImageSize = ImageSize { width: 700, height: 500 };

const CENTERED_WIDTH_MM: f64 = 277.0;
const CENTERED_MAX_HEIGHT_MM: f64 = 190.0;
const FULL_WIDTH_MARGIN_MM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Height over width
    pub fn aspect(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        f64::from(self.height) / f64::from(self.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn a4(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => PageSize { width: A4_SHORT_MM, height: A4_LONG_MM },
            Orientation::Landscape => PageSize { width: A4_LONG_MM, height: A4_SHORT_MM },
        }
    }
}

/// Image rectangle on a page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportLayout {
    /// A4 landscape, 277 mm wide, height capped at 190 mm, centred
    Centered,
    /// A4, placed at (10, 10) and spanning the page width minus 20 mm
    FullWidth(Orientation),
}

impl ExportLayout {
    /// Layout each page exports with
    pub fn for_page(page: Page) -> Self {
        match page {
            Page::Overview => ExportLayout::Centered,
            Page::Detail | Page::Market => ExportLayout::FullWidth(Orientation::Portrait),
        }
    }

    pub fn page_size(&self) -> PageSize {
        match self {
            ExportLayout::Centered => PageSize::a4(Orientation::Landscape),
            ExportLayout::FullWidth(orientation) => PageSize::a4(*orientation),
        }
    }

    /// Size the chart is rendered at before placing
    pub fn image_size(&self) -> ImageSize {
        match self {
            ExportLayout::Centered => CENTERED_IMAGE,
            ExportLayout::FullWidth(_) => DEFAULT_IMAGE,
        }
    }

    pub fn place(&self, image: ImageSize) -> Placement {
        let page = self.page_size();
        let aspect = image.aspect();
        match self {
            ExportLayout::Centered => {
                let mut width = CENTERED_WIDTH_MM;
                let mut height = width * aspect;
                if height > CENTERED_MAX_HEIGHT_MM {
                    height = CENTERED_MAX_HEIGHT_MM;
                    width = height / aspect;
                }
                Placement {
                    x: (page.width - width) / 2.0,
                    y: (page.height - height) / 2.0,
                    width,
                    height,
                }
            }
            ExportLayout::FullWidth(_) => {
                let width = page.width - 2.0 * FULL_WIDTH_MARGIN_MM;
                Placement {
                    x: FULL_WIDTH_MARGIN_MM,
                    y: FULL_WIDTH_MARGIN_MM,
                    width,
                    height: width * aspect,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPage {
    pub chart: ChartKind,
    pub title: &'static str,
    pub image: ImageSize,
    pub placement: Placement,
}

/// Pages of one export document, in request order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportManifest {
    pub layout: ExportLayout,
    pub page_size: PageSize,
    pub pages: Vec<ExportPage>,
}

impl ExportManifest {
    /// One page per chart in `charts` that `is_ready` accepts
    pub fn build(page: Page, charts: &[ChartKind], is_ready: impl Fn(ChartKind) -> bool) -> Self {
        let layout = ExportLayout::for_page(page);
        let image = layout.image_size();
        let placement = layout.place(image);
        let pages: Vec<ExportPage> = charts
            .iter()
            .copied()
            .filter(|&chart| is_ready(chart))
            .map(|chart| ExportPage {
                chart,
                title: chart.title(),
                image,
                placement,
            })
            .collect();
        tracing::debug!("Export manifest for {:?}: {} pages", page, pages.len());

        Self {
            layout,
            page_size: layout.page_size(),
            pages,
        }
    }
}
