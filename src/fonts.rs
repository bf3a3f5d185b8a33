//! Font selection for the report renderer.
//!
//! A Roboto pair found in one of the search directories is embedded into the
//! document. When none of the directories holds the files, the renderer falls
//! back to the PDF built-in Helvetica family, which needs no font data at all.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};

use crate::error::RenderError;

/// Environment variable pointing at a directory with the bundled font files.
pub const FONTS_DIR_ENV: &str = "LIBRARY_REPORT_FONTS_DIR";

/// Name of the bundled font family.
pub const BUNDLED_FONT_FAMILY_NAME: &str = "Roboto";

const REGULAR_FONT_FILE: &str = "Roboto-Regular.ttf";
const BOLD_FONT_FILE: &str = "Roboto-Bold.ttf";

/// Where the renderer takes its fonts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// TrueType files embedded into the document.
    Bundled { regular: PathBuf, bold: PathBuf },
    /// Helvetica and Helvetica-Bold from the PDF base-14 set.
    Builtin,
}

/// Font handles registered with a document.
pub struct ReportFonts {
    pub regular: IndirectFontRef,
    pub bold: IndirectFontRef,
}

fn font_directory_candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = preferred {
        candidates.push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV) {
        if !path.is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            candidates.push(bin_dir.join("assets/fonts"));
        }
    }

    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));
    candidates.dedup();
    candidates
}

fn bundled_pair(directory: &Path) -> Option<(PathBuf, PathBuf)> {
    let regular = directory.join(REGULAR_FONT_FILE);
    let bold = directory.join(BOLD_FONT_FILE);
    (regular.is_file() && bold.is_file()).then_some((regular, bold))
}

/// Picks the first directory holding the bundled pair, checking `preferred`
/// first, then the environment, the executable's `assets/fonts`, and the
/// crate's own `assets/fonts`.
pub fn resolve_font_source(preferred: Option<&Path>) -> FontSource {
    resolve_from(&font_directory_candidates(preferred), preferred.is_some())
}

fn resolve_from(candidates: &[PathBuf], warn_on_fallback: bool) -> FontSource {
    for candidate in candidates {
        if let Some((regular, bold)) = bundled_pair(candidate) {
            debug!(
                "Using bundled {} fonts from {}",
                BUNDLED_FONT_FAMILY_NAME,
                candidate.display()
            );
            return FontSource::Bundled { regular, bold };
        }
    }

    if warn_on_fallback {
        warn!(
            "No {} fonts found (checked {}); falling back to built-in Helvetica",
            BUNDLED_FONT_FAMILY_NAME,
            candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    } else {
        debug!("No bundled fonts found; using built-in Helvetica");
    }

    FontSource::Builtin
}

fn load_external(
    document: &PdfDocumentReference,
    path: &Path,
) -> Result<IndirectFontRef, RenderError> {
    let file = File::open(path).map_err(|err| RenderError::FontLoad {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    document
        .add_external_font(file)
        .map_err(|err| RenderError::FontLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn load_builtin(
    document: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, RenderError> {
    document
        .add_builtin_font(font)
        .map_err(|err| RenderError::Pdf(err.to_string()))
}

/// Registers the regular and bold faces of `source` with the document.
pub fn install_fonts(
    document: &PdfDocumentReference,
    source: &FontSource,
) -> Result<ReportFonts, RenderError> {
    match source {
        FontSource::Bundled { regular, bold } => Ok(ReportFonts {
            regular: load_external(document, regular)?,
            bold: load_external(document, bold)?,
        }),
        FontSource::Builtin => Ok(ReportFonts {
            regular: load_builtin(document, BuiltinFont::Helvetica)?,
            bold: load_builtin(document, BuiltinFont::HelveticaBold)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directories_fall_back_to_builtin() {
        let first = tempfile::tempdir().expect("temp dir");
        let second = tempfile::tempdir().expect("temp dir");
        let candidates = [first.path().to_path_buf(), second.path().to_path_buf()];

        assert!(bundled_pair(first.path()).is_none());
        assert_eq!(resolve_from(&candidates, true), FontSource::Builtin);
        assert_eq!(resolve_from(&[], false), FontSource::Builtin);
    }

    #[test]
    fn first_complete_candidate_is_used() {
        let empty = tempfile::tempdir().expect("temp dir");
        let full = tempfile::tempdir().expect("temp dir");
        std::fs::write(full.path().join(REGULAR_FONT_FILE), b"regular").expect("write font");
        std::fs::write(full.path().join(BOLD_FONT_FILE), b"bold").expect("write font");
        let candidates = [empty.path().to_path_buf(), full.path().to_path_buf()];

        assert_eq!(
            resolve_from(&candidates, false),
            FontSource::Bundled {
                regular: full.path().join(REGULAR_FONT_FILE),
                bold: full.path().join(BOLD_FONT_FILE),
            }
        );
    }

    #[test]
    fn preferred_directory_wins() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join(REGULAR_FONT_FILE), b"regular").expect("write font");
        std::fs::write(dir.path().join(BOLD_FONT_FILE), b"bold").expect("write font");

        assert_eq!(
            resolve_font_source(Some(dir.path())),
            FontSource::Bundled {
                regular: dir.path().join(REGULAR_FONT_FILE),
                bold: dir.path().join(BOLD_FONT_FILE),
            }
        );
    }

    #[test]
    fn half_a_pair_is_not_enough() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join(REGULAR_FONT_FILE), b"regular").expect("write font");

        assert!(bundled_pair(dir.path()).is_none());
    }
}
