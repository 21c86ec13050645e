use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};
use tracing::{debug, warn};

use crate::error::RenderError;

pub const REGULAR_FONT_FILE: &str = "DejaVuSans.ttf";
pub const BOLD_FONT_FILE: &str = "DejaVuSans-Bold.ttf";

/// Family name the charts draw with.
pub const CHART_FONT_FAMILY: &str = "sans-serif";

/// DejaVu Sans, compiled into the binary so chart and PDF text never depend
/// on the working directory.
const BUNDLED_REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// A TrueType family, regular and bold.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Vec<u8>,
    pub bold: Vec<u8>,
}

impl FontSet {
    /// The faces shipped with the crate.
    pub fn bundled() -> Self {
        Self {
            regular: BUNDLED_REGULAR.to_vec(),
            bold: BUNDLED_BOLD.to_vec(),
        }
    }

    /// Reads both faces from `dir`.
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        Ok(Self {
            regular: read_font(&dir.join(REGULAR_FONT_FILE))?,
            bold: read_font(&dir.join(BOLD_FONT_FILE))?,
        })
    }
}

fn read_font(path: &PathBuf) -> Result<Vec<u8>, RenderError> {
    std::fs::read(path).map_err(|e| RenderError::FontLoad {
        path: path.clone(),
        reason: e.to_string(),
    })
}

static CHART_FONTS: OnceLock<bool> = OnceLock::new();

/// Makes `fonts` available to chart text. Only the first call registers;
/// later calls report the first outcome.
pub fn register_chart_fonts(fonts: &FontSet) -> bool {
    *CHART_FONTS.get_or_init(|| {
        // The chart backend keeps font data for the life of the process.
        let regular: &'static [u8] = Box::leak(fonts.regular.clone().into_boxed_slice());
        let bold: &'static [u8] = Box::leak(fonts.bold.clone().into_boxed_slice());

        let ok = register_font(CHART_FONT_FAMILY, FontStyle::Normal, regular).is_ok()
            && register_font(CHART_FONT_FAMILY, FontStyle::Bold, bold).is_ok();
        if ok {
            debug!("chart fonts registered");
        } else {
            warn!("chart fonts rejected, charts will be drawn without text");
        }
        ok
    })
}

/// Whether chart text can be drawn.
pub fn chart_fonts_registered() -> bool {
    CHART_FONTS.get().copied().unwrap_or(false)
}
