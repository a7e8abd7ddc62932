use std::sync::Arc;
use uuid::Uuid;

use super::WizardError;

/// Most images a single ad can be generated from
pub const MAX_IMAGES: usize = 4;

/// Uploaded image kept in memory until submission
///
/// The bytes are shared, so cloning a session does not copy image data.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    handle: String,
    file_name: String,
    content_type: String,
    data: Arc<Vec<u8>>,
}

impl ImageBlob {
    /// Wraps raw upload bytes
    ///
    /// # Returns
    /// * `Err(WizardError::InvalidImage)` - if the payload is empty or not an image
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, WizardError> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        if !content_type.starts_with("image/") {
            return Err(WizardError::InvalidImage(format!(
                "{} has content type {}",
                file_name, content_type
            )));
        }
        if data.is_empty() {
            return Err(WizardError::InvalidImage(format!("{} is empty", file_name)));
        }

        Ok(Self {
            handle: format!("local-{}", Uuid::new_v4()),
            file_name,
            content_type,
            data: Arc::new(data),
        })
    }

    /// Preview handle clients use to display or remove the image
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_image_payload() {
        let blob = ImageBlob::new("mug.png", "image/png", vec![1, 2, 3]).unwrap();
        assert!(blob.handle().starts_with("local-"));
        assert_eq!(blob.len(), 3);
    }

    #[test]
    fn rejects_non_images() {
        let err = ImageBlob::new("notes.txt", "text/plain", vec![1]).unwrap_err();
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(ImageBlob::new("mug.png", "image/png", vec![]).is_err());
    }

    #[test]
    fn handles_are_unique() {
        let a = ImageBlob::new("a.png", "image/png", vec![1]).unwrap();
        let b = ImageBlob::new("a.png", "image/png", vec![1]).unwrap();
        assert_ne!(a.handle(), b.handle());
    }
}
