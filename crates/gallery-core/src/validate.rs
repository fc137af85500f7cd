//! Upload validation before anything is stored.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::UploadError;
use crate::types::Upload;

/// Checks uploads against configured limits.
pub struct UploadValidator {
    limits: LimitsConfig,
}

impl UploadValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Checks, in order:
    /// - the upload is not empty
    /// - the extension is a supported format
    /// - the size is within limits
    /// - the content starts with image magic bytes
    pub fn validate(&self, upload: &Upload) -> Result<(), UploadError> {
        if upload.bytes.is_empty() || upload.file_name.trim().is_empty() {
            return Err(UploadError::Empty);
        }

        let ext = Path::new(&upload.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let supported = ext.is_some_and(|ext| {
            self.limits
                .supported_formats
                .iter()
                .any(|f| f.eq_ignore_ascii_case(&ext))
        });
        if !supported {
            return Err(UploadError::UnsupportedFormat {
                file_name: upload.file_name.clone(),
            });
        }

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        let size = upload.bytes.len() as u64;
        if size > max_bytes {
            return Err(UploadError::TooLarge {
                file_name: upload.file_name.clone(),
                size_mb: size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if !is_image_header(&upload.bytes) {
            return Err(UploadError::NotAnImage {
                file_name: upload.file_name.clone(),
            });
        }

        Ok(())
    }
}

/// Whether the leading bytes match a known image format.
fn is_image_header(bytes: &[u8]) -> bool {
    match bytes {
        // JPEG
        [0xFF, 0xD8, 0xFF, ..] => true,
        // PNG
        [0x89, b'P', b'N', b'G', ..] => true,
        // GIF
        [b'G', b'I', b'F', b'8', ..] => true,
        // WebP: RIFF....WEBP
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => true,
        // BMP
        [b'B', b'M', _, _, ..] => true,
        // TIFF, little and big endian
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => true,
        // HEIC/HEIF/AVIF: ftyp box at offset 4
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    fn validator() -> UploadValidator {
        UploadValidator::new(LimitsConfig::default())
    }

    #[test]
    fn test_valid_jpeg() {
        assert!(validator().validate(&Upload::new("dog.JPG", JPEG.to_vec())).is_ok());
    }

    #[test]
    fn test_empty_upload() {
        let err = validator().validate(&Upload::new("dog.jpg", vec![])).unwrap_err();
        assert!(matches!(err, UploadError::Empty));
        assert_eq!(err.to_string(), "No file uploaded");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = validator()
            .validate(&Upload::new("notes.txt", JPEG.to_vec()))
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat { .. }));

        let err = validator()
            .validate(&Upload::new("no_extension", JPEG.to_vec()))
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_too_large() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..Default::default()
        };
        let mut bytes = JPEG.to_vec();
        bytes.resize(1024 * 1024 + 1, 0);
        let err = UploadValidator::new(limits)
            .validate(&Upload::new("big.jpg", bytes))
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { max_mb: 1, .. }));
    }

    #[test]
    fn test_huge_limit_does_not_overflow() {
        let limits = LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..Default::default()
        };
        assert!(UploadValidator::new(limits)
            .validate(&Upload::new("dog.jpg", JPEG.to_vec()))
            .is_ok());
    }

    #[test]
    fn test_wrong_magic_bytes() {
        let err = validator()
            .validate(&Upload::new("fake.png", b"hello world".to_vec()))
            .unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage { .. }));
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_image_header(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]));
        assert!(is_image_header(b"GIF89a"));
        assert!(is_image_header(b"RIFF\0\0\0\0WEBPVP8 "));
        assert!(is_image_header(&[b'I', b'I', 0x2A, 0x00]));
        assert!(!is_image_header(&[b'I', b'I', 0x00, 0x00]));
        assert!(!is_image_header(b"RIFF\0\0\0\0WAVE"));
        assert!(!is_image_header(&[0xFF, 0xD8]));
    }
}
