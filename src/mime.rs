//! Best-effort MIME detection, modeled as a strategy selected at startup.
//!
//! `ContentProbe` sniffs the file's leading bytes and falls back to the
//! extension table; `ExtensionProbe` uses the extension table alone. Both
//! degrade silently to `None` instead of failing the run.

use std::path::Path;

pub trait MimeProbe: Send + Sync {
    fn mime_type(&self, path: &Path) -> Option<String>;

    fn is_audio(&self, path: &Path) -> bool {
        self.mime_type(path)
            .is_some_and(|mime| mime.starts_with("audio"))
    }
}

/// Content-based sniffing via `infer`, with the extension table as a
/// fallback for files whose magic bytes are not recognized.
pub struct ContentProbe;

impl MimeProbe for ContentProbe {
    fn mime_type(&self, path: &Path) -> Option<String> {
        if let Ok(Some(kind)) = infer::get_from_path(path) {
            return Some(kind.mime_type().to_string());
        }
        guess_from_extension(path)
    }
}

/// Extension-table guessing only.
pub struct ExtensionProbe;

impl MimeProbe for ExtensionProbe {
    fn mime_type(&self, path: &Path) -> Option<String> {
        guess_from_extension(path)
    }
}

fn guess_from_extension(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
