//! Uploaded reference images and their inline encoding.

use std::path::Path;

use base64::Engine;

use crate::errors::SubmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Accepts `jpg`, `jpeg` and `png`, ignoring case.
    pub fn from_extension(ext: &str) -> Option<ImageKind> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

/// An image attached to one submission. Dropped with the submission.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub name: String,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedImage {
    /// Builds an image from an upload, deriving the kind from the file name.
    pub fn from_upload(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SubmitError> {
        let name = name.into();
        let kind = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageKind::from_extension)
            .ok_or_else(|| SubmitError::UnsupportedImage { name: name.clone() })?;
        Ok(Self { name, kind, bytes })
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URL suitable for an `image_url` content part.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.kind.mime_type(), self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("Png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("gif"), None);
    }

    #[test]
    fn test_from_upload_rejects_other_types() {
        let err = UploadedImage::from_upload("moodboard.webp", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, SubmitError::UnsupportedImage { ref name } if name == "moodboard.webp"));

        let err = UploadedImage::from_upload("no_extension", vec![]).unwrap_err();
        assert!(matches!(err, SubmitError::UnsupportedImage { .. }));
    }

    #[test]
    fn test_data_url() {
        let image = UploadedImage::from_upload("sofa.png", b"hello".to_vec()).unwrap();
        assert_eq!(image.kind, ImageKind::Png);
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");

        let image = UploadedImage::from_upload("room.JPEG", b"hi".to_vec()).unwrap();
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn test_debug_omits_bytes() {
        let image = UploadedImage::from_upload("a.jpg", vec![0; 1024]).unwrap();
        let debug = format!("{:?}", image);
        assert!(debug.contains("len: 1024"));
        assert!(!debug.contains("0, 0"));
    }
}
