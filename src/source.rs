use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One physical page of the input document: its zero-based position and the
/// plain text pulled out of it. Pages that yield no text come through as empty
/// strings and get rejected downstream instead of aborting the run.
#[derive(Debug, Clone)]
pub struct PhysicalPage {
    pub index: usize,
    pub text: String,
}

/// Page-text acquisition boundary. The pipeline only sees ordered pages, so
/// swapping the PDF reader for something else never touches extraction.
pub trait PageSource {
    fn pages(&self) -> Result<Vec<PhysicalPage>>;
}

/// Pulls per-page text out of a PDF.
pub struct PdfSource {
    path: PathBuf,
}

impl PdfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PdfSource { path: path.into() }
    }
}

impl PageSource for PdfSource {
    fn pages(&self) -> Result<Vec<PhysicalPage>> {
        let texts = pdf_extract::extract_text_by_pages(&self.path)
            .with_context(|| format!("Failed to extract text from {}", self.path.display()))?;
        Ok(number_pages(texts))
    }
}

/// Plain-text source with pages separated by form feeds. Used for fixtures
/// and for re-running extraction on already-dumped text.
pub struct TextSource {
    text: String,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        TextSource { text: text.into() }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(TextSource::new(text))
    }
}

impl PageSource for TextSource {
    fn pages(&self) -> Result<Vec<PhysicalPage>> {
        let texts: Vec<String> = self.text.split('\u{c}').map(str::to_string).collect();
        Ok(number_pages(texts))
    }
}

fn number_pages(texts: Vec<String>) -> Vec<PhysicalPage> {
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| PhysicalPage { index, text })
        .collect()
}

/// Pick a source by file extension: `.pdf` goes through the PDF reader,
/// anything else is treated as form-feed-separated plain text.
pub fn load_pages(path: &Path) -> Result<Vec<PhysicalPage>> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        PdfSource::new(path).pages()
    } else {
        TextSource::from_path(path)?.pages()
    }
}
