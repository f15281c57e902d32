use std::path::Path;

use super::data_url::{self, DataUrl};
use super::edit::{EditRequest, EditResult};
use super::error::VintageError;
use crate::api::ImageEditor;

/// State of one editing session: the uploaded photo, its vintage edit,
/// and whether an operation is in flight.
///
/// Each operation comes in two halves. `begin_*` checks the busy flag,
/// clears the previous outcome and marks the session busy; `finish_*`
/// commits the outcome and always clears the busy flag. The combined
/// `select_file` / `request_edit` run both halves around the awaited call.
#[derive(Debug, Default)]
pub struct Session {
    original_image: Option<DataUrl>,
    edited_image: Option<DataUrl>,
    text_response: Option<String>,
    busy: bool,
    error: Option<String>,
    file_name: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original_image(&self) -> Option<&DataUrl> {
        self.original_image.as_ref()
    }

    pub fn edited_image(&self) -> Option<&DataUrl> {
        self.edited_image.as_ref()
    }

    /// Commentary the model sent alongside the last edited image
    pub fn text_response(&self) -> Option<&str> {
        self.text_response.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// File name offered when saving the edited image
    pub fn download_name(&self) -> String {
        format!("vintage-{}", self.file_name.as_deref().unwrap_or("image.png"))
    }

    /// Start loading a new photo
    pub fn begin_select(&mut self, path: &Path) -> Result<(), VintageError> {
        if self.busy {
            return Err(VintageError::Busy);
        }

        self.clear_outcome();
        self.busy = true;
        self.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(())
    }

    /// Commit the result of reading the photo
    pub fn finish_select(&mut self, result: Result<DataUrl, VintageError>) {
        match result {
            Ok(image) => self.original_image = Some(image),
            Err(e) => {
                tracing::error!("Failed to read file: {:?}", e);
                self.error = Some(e.to_string());
            }
        }
        self.busy = false;
    }

    /// Start an edit of the current photo.
    ///
    /// Without a photo the session records the "upload first" error and
    /// never becomes busy.
    pub fn begin_edit(&mut self) -> Result<EditRequest, VintageError> {
        if self.busy {
            return Err(VintageError::Busy);
        }

        let Some(original) = &self.original_image else {
            self.error = Some(VintageError::NoImageSelected.to_string());
            return Err(VintageError::NoImageSelected);
        };
        let request = EditRequest::vintage(original.decode());

        self.clear_outcome();
        self.busy = true;
        Ok(request)
    }

    /// Commit the result of an edit call
    pub fn finish_edit(&mut self, result: Result<EditResult, VintageError>) {
        match result {
            Ok(EditResult::Edited { image, text }) => {
                self.edited_image = Some(image);
                self.text_response = text;
            }
            Ok(EditResult::Declined { message }) => {
                tracing::warn!("Edit declined: {}", message);
                self.error = Some(message);
            }
            Err(e) => {
                tracing::error!("Edit failed: {:?}", e);
                self.error = Some(e.to_string());
            }
        }
        self.busy = false;
    }

    /// Load a photo from disk.
    ///
    /// Returns an error only when the operation could not start; a failed
    /// read is recorded in [`Session::error`].
    pub async fn select_file(&mut self, path: &Path) -> Result<(), VintageError> {
        self.begin_select(path)?;
        let result = data_url::encode_file(path).await;
        self.finish_select(result);
        Ok(())
    }

    /// Send the current photo off for the vintage look.
    ///
    /// Returns an error only when the operation could not start; the edit
    /// outcome is recorded in the session.
    pub async fn request_edit<E>(&mut self, editor: &E) -> Result<(), VintageError>
    where
        E: ImageEditor + ?Sized,
    {
        let request = self.begin_edit()?;
        let result = editor.submit_edit(&request).await;
        self.finish_edit(result);
        Ok(())
    }

    fn clear_outcome(&mut self) {
        self.edited_image = None;
        self.text_response = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NO_IMAGE_MESSAGE;
    use crate::core::VINTAGE_PROMPT;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Responder = fn() -> Result<EditResult, VintageError>;

    struct FakeEditor {
        respond: Responder,
        calls: Mutex<Vec<EditRequest>>,
    }

    impl FakeEditor {
        fn new(respond: Responder) -> Self {
            Self {
                respond,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<EditRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageEditor for FakeEditor {
        async fn submit_edit(&self, request: &EditRequest) -> Result<EditResult, VintageError> {
            self.calls.lock().unwrap().push(request.clone());
            (self.respond)()
        }
    }

    fn png_result() -> Result<EditResult, VintageError> {
        Ok(EditResult::Edited {
            image: data_url::encode(b"\x89PNG edited", "image/png"),
            text: Some("looks great".to_string()),
        })
    }

    fn jpeg_bytes() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend((0..10 * 1024).map(|i| (i % 251) as u8));
        bytes
    }

    async fn session_with_photo(dir: &tempfile::TempDir) -> (Session, Vec<u8>) {
        let bytes = jpeg_bytes();
        let path = dir.path().join("holiday.jpg");
        std::fs::write(&path, &bytes).unwrap();

        let mut session = Session::new();
        session.select_file(&path).await.unwrap();
        (session, bytes)
    }

    #[test]
    fn starts_idle() {
        let session = Session::new();
        assert!(!session.is_busy());
        assert!(session.original_image().is_none());
        assert!(session.edited_image().is_none());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn upload_then_edit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, bytes) = session_with_photo(&dir).await;

        assert!(session.original_image().is_some());
        assert!(session.error().is_none());
        assert!(!session.is_busy());
        assert_eq!(session.file_name(), Some("holiday.jpg"));

        let editor = FakeEditor::new(png_result);
        session.request_edit(&editor).await.unwrap();

        let calls = editor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].mime_type(), "image/jpeg");
        assert_eq!(calls[0].prompt(), VINTAGE_PROMPT);
        assert_eq!(
            data_url::decode(&format!("data:x;base64,{}", calls[0].base64_data()))
                .to_bytes()
                .unwrap(),
            bytes
        );

        let edited = session.edited_image().unwrap();
        assert!(edited.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(session.text_response(), Some("looks great"));
        assert!(session.error().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn edit_without_photo_never_goes_busy() {
        let mut session = Session::new();
        let editor = FakeEditor::new(png_result);

        let err = session.request_edit(&editor).await.unwrap_err();
        assert!(matches!(err, VintageError::NoImageSelected));
        assert_eq!(session.error(), Some("Please upload an image first."));
        assert!(!session.is_busy());
        assert!(editor.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_fault_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_photo(&dir).await;
        let editor = FakeEditor::new(|| Err(VintageError::provider("timeout")));

        session.request_edit(&editor).await.unwrap();

        assert!(session.error().unwrap().contains("timeout"));
        assert!(session.edited_image().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn malformed_response_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_photo(&dir).await;
        let editor = FakeEditor::new(|| {
            Err(VintageError::MalformedResponse(
                "Invalid response structure from API.".into(),
            ))
        });

        session.request_edit(&editor).await.unwrap();

        assert_eq!(
            session.error(),
            Some("AI processing failed: Invalid response structure from API.")
        );
        assert!(session.edited_image().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn declined_result_surfaces_message() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_photo(&dir).await;
        let editor = FakeEditor::new(|| Ok(EditResult::from_parts(None, None)));

        session.request_edit(&editor).await.unwrap();

        assert_eq!(session.error(), Some(NO_IMAGE_MESSAGE));
        assert!(session.edited_image().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn new_edit_clears_previous_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_photo(&dir).await;

        session.request_edit(&FakeEditor::new(png_result)).await.unwrap();
        assert!(session.edited_image().is_some());

        session
            .request_edit(&FakeEditor::new(|| Err(VintageError::provider("boom"))))
            .await
            .unwrap();
        assert!(session.edited_image().is_none());
        assert!(session.text_response().is_none());
        assert!(session.error().is_some());
    }

    #[tokio::test]
    async fn unreadable_file_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();

        session
            .select_file(&dir.path().join("missing.png"))
            .await
            .unwrap();

        assert_eq!(session.error(), Some("Failed to read file."));
        assert!(session.original_image().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn new_upload_clears_edit_and_replaces_original() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_photo(&dir).await;
        session.request_edit(&FakeEditor::new(png_result)).await.unwrap();

        let other = dir.path().join("second.png");
        std::fs::write(&other, b"\x89PNG\r\n\x1a\nrest").unwrap();
        session.select_file(&other).await.unwrap();

        assert!(session.edited_image().is_none());
        assert_eq!(session.file_name(), Some("second.png"));
        assert_eq!(session.original_image().unwrap().decode().mime_type, "image/png");
    }

    #[tokio::test]
    async fn busy_session_rejects_new_operations() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_photo(&dir).await;

        let request = session.begin_edit().unwrap();
        assert!(session.is_busy());
        assert_eq!(request.prompt(), VINTAGE_PROMPT);

        assert!(matches!(session.begin_edit(), Err(VintageError::Busy)));
        assert!(matches!(
            session.begin_select(Path::new("other.png")),
            Err(VintageError::Busy)
        ));
        assert_eq!(session.file_name(), Some("holiday.jpg"));
        assert!(session.error().is_none());

        session.finish_edit(png_result());
        assert!(!session.is_busy());
        assert!(session.edited_image().is_some());
    }

    #[test]
    fn download_name_prefixes_file_name() {
        let mut session = Session::new();
        assert_eq!(session.download_name(), "vintage-image.png");

        session.begin_select(Path::new("/photos/cat.jpeg")).unwrap();
        assert_eq!(session.download_name(), "vintage-cat.jpeg");
    }
}
