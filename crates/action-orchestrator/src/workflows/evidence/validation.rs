use super::domain::{EvidencePolicy, PhotoFile, PhotoRejection};

/// Gate a file before it takes a slot: image MIME type, non-empty, within the size cap.
pub fn validate_photo(file: &PhotoFile, policy: &EvidencePolicy) -> Result<(), PhotoRejection> {
    let is_image = file
        .content_type
        .trim()
        .to_ascii_lowercase()
        .parse::<mime::Mime>()
        .map(|parsed| parsed.type_() == mime::IMAGE)
        .unwrap_or(false);
    if !is_image {
        return Err(PhotoRejection::UnsupportedType {
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
        });
    }

    if file.bytes.is_empty() {
        return Err(PhotoRejection::Empty {
            file_name: file.file_name.clone(),
        });
    }

    if file.size() > policy.max_photo_bytes {
        return Err(PhotoRejection::TooLarge {
            file_name: file.file_name.clone(),
            size: file.size(),
            max: policy.max_photo_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> EvidencePolicy {
        EvidencePolicy {
            max_photos: 5,
            max_photo_bytes: 8,
        }
    }

    #[test]
    fn accepts_image_types_with_parameters() {
        let file = PhotoFile::new("leak.jpg", "image/jpeg", vec![1, 2, 3]);
        assert!(validate_photo(&file, &policy()).is_ok());

        let file = PhotoFile::new("leak.heic", "Image/HEIC; quality=high", vec![1]);
        assert!(validate_photo(&file, &policy()).is_ok());
    }

    #[test]
    fn rejects_non_images_and_garbage_types() {
        for content_type in ["application/pdf", "text/plain", "not a mime", ""] {
            let file = PhotoFile::new("doc", content_type, vec![1]);
            assert!(matches!(
                validate_photo(&file, &policy()),
                Err(PhotoRejection::UnsupportedType { .. })
            ));
        }
    }

    #[test]
    fn enforces_size_bounds() {
        let file = PhotoFile::new("big.png", "image/png", vec![0; 9]);
        assert_eq!(
            validate_photo(&file, &policy()),
            Err(PhotoRejection::TooLarge {
                file_name: "big.png".to_string(),
                size: 9,
                max: 8,
            })
        );

        let file = PhotoFile::new("exact.png", "image/png", vec![0; 8]);
        assert!(validate_photo(&file, &policy()).is_ok());

        let file = PhotoFile::new("empty.png", "image/png", Vec::new());
        assert!(matches!(
            validate_photo(&file, &policy()),
            Err(PhotoRejection::Empty { .. })
        ));
    }
}
