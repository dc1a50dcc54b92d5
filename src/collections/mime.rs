/// MIME types accepted for product file uploads. `type/*` admits a whole family.
pub const PRODUCT_FILE_MIME_TYPES: &[&str] = &[
    // Images
    "image/*",
    // Fonts
    "font/*",
    // Documents
    "application/postscript",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
    // Presentations
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
    "application/vnd.openxmlformats-officedocument.presentationml.slide",
    "application/vnd.openxmlformats-officedocument.presentationml.template",
    // Audio and video
    "audio/*",
    "video/*",
    // 3D models
    "model/*",
    "application/*",
    // Code
    "text/javascript",
    "application/x-php",
    "text/html",
    "text/css",
    "application/python-bytecode",
    // Design templates
    "application/vnd.adobe.photoshop",
    "application/vnd.adobe.illustrator",
    "application/vnd.adobe.indesign",
    // Ebooks
    "application/epub+zip",
    "application/x-mobipocket-ebook",
    // Archives
    "application/zip",
    "application/x-rar-compressed",
    "application/x-7z-compressed",
    // Spreadsheets
    "text/csv",
    "application/vnd.oasis.opendocument.spreadsheet",
    // Drawings
    "image/svg+xml",
    // Other
    "application/x-shockwave-flash",
    "application/x-director",
    "application/x-java-applet",
    "application/x-ms-wmv",
    "application/wasm",
    "model/gltf+json",
    "image/webp",
    "image/avif",
];

/// Whitelist of upload MIME types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePolicy {
    allowed: Vec<String>,
}

impl MimePolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed.into_iter().map(|s| s.as_ref().to_ascii_lowercase()).collect(),
        }
    }

    pub fn product_files() -> Self {
        Self::new(PRODUCT_FILE_MIME_TYPES)
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Case-insensitive match ignoring parameters such as `; charset=utf-8`
    pub fn accepts(&self, mime_type: &str) -> bool {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let Some((top_level, subtype)) = essence.split_once('/') else {
            return false;
        };
        if top_level.is_empty() || subtype.is_empty() {
            return false;
        }

        self.allowed.iter().any(|pattern| match pattern.strip_suffix("/*") {
            Some(family) => family == top_level,
            None => *pattern == essence,
        })
    }
}
