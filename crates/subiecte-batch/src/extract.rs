use std::path::Path;
use std::sync::Arc;

use subiecte_core::{BackendError, PdfBackend};
use subiecte_parsing::{CorpusEra, anchors_present, fix_mojibake};

/// Text extraction with an optional OCR fallback.
///
/// The primary backend reads the embedded text layer. Scanned papers have
/// no usable layer: the output is empty or misses the subject anchors, and
/// only then is the (much slower) OCR backend consulted.
pub struct Extractor {
    primary: Arc<dyn PdfBackend>,
    ocr: Option<Arc<dyn PdfBackend>>,
    era: CorpusEra,
}

impl Extractor {
    pub fn new(primary: Arc<dyn PdfBackend>, ocr: Option<Arc<dyn PdfBackend>>, era: CorpusEra) -> Self {
        Self { primary, ocr, era }
    }

    pub fn era(&self) -> CorpusEra {
        self.era
    }

    pub fn extract(&self, path: &Path) -> Result<String, BackendError> {
        let text = fix_mojibake(&self.primary.extract_text(path, true)?);

        if let Some(ocr) = &self.ocr
            && (text.trim().is_empty() || !anchors_present(&text, self.era))
        {
            tracing::debug!(path = %path.display(), "text layer unusable, falling back to OCR");
            return Ok(fix_mojibake(&ocr.extract_text(path, true)?));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend {
        text: &'static str,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn new(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl PdfBackend for FixedBackend {
        fn extract_text(&self, _path: &Path, _normalize: bool) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    const GOOD: &str = "Subiectul I (30 de puncte)\nA\nSubiectul al II-lea (30 de puncte)\nB\nSubiectul al III-lea (30 de puncte)\nC";

    #[test]
    fn usable_text_layer_skips_ocr() {
        let primary = FixedBackend::new(GOOD);
        let ocr = FixedBackend::new("ocr output");
        let extractor = Extractor::new(primary.clone(), Some(ocr.clone()), CorpusEra::Modern);

        let text = extractor.extract(Path::new("x.pdf")).unwrap();
        assert!(text.contains("Subiectul I"));
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_anchors_trigger_ocr_fallback() {
        let primary = FixedBackend::new("doar zgomot, fără ancore");
        let ocr = FixedBackend::new(GOOD);
        let extractor = Extractor::new(primary, Some(ocr.clone()), CorpusEra::Modern);

        let text = extractor.extract(Path::new("x.pdf")).unwrap();
        assert!(text.contains("Subiectul I"));
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_text_layer_triggers_ocr_fallback() {
        let primary = FixedBackend::new("  \n  ");
        let ocr = FixedBackend::new(GOOD);
        let extractor = Extractor::new(primary, Some(ocr.clone()), CorpusEra::Modern);

        extractor.extract(Path::new("x.pdf")).unwrap();
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn without_ocr_backend_primary_output_is_kept_as_is() {
        let primary = FixedBackend::new("fără ancore");
        let extractor = Extractor::new(primary, None, CorpusEra::Modern);
        assert_eq!(extractor.extract(Path::new("x.pdf")).unwrap(), "fără ancore");
    }

    #[test]
    fn mojibake_is_repaired_on_the_way_out() {
        let primary = FixedBackend::new("noÅƒiune");
        let extractor = Extractor::new(primary, None, CorpusEra::Modern);
        assert_eq!(extractor.extract(Path::new("x.pdf")).unwrap(), "noÅ£iune");
    }
}
