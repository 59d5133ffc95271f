mod common;

use common::{closed_base_url, MockGemini, MockResponse};
use nanoedit::{EditError, EncodedImage, GeminiEditor, GeminiModel, ImageEditor, RemoteError};

fn editor(base_url: &str) -> GeminiEditor {
    GeminiEditor::builder()
        .api_key("test-key")
        .base_url(base_url)
        .build()
        .unwrap()
}

fn image() -> EncodedImage {
    EncodedImage::parse_data_uri("data:image/jpeg;base64,/9j/4AAQSkZJRg==").unwrap()
}

#[tokio::test]
async fn returns_first_inline_image_as_data_uri() {
    let mock = MockGemini::start(MockResponse::image("image/png", "abc123")).await;

    let result = editor(&mock.base_url)
        .edit(&image(), "Add a cute cat wearing a hat")
        .await
        .unwrap();

    assert_eq!(result.to_data_uri(), "data:image/png;base64,abc123");
}

#[tokio::test]
async fn sends_image_and_prompt_with_image_modality() {
    let mock = MockGemini::start(MockResponse::image("image/png", "abc123")).await;

    editor(&mock.base_url)
        .edit(&image(), "Make the sky a sunset")
        .await
        .unwrap();

    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);

    let req = &requests[0];
    assert_eq!(req.method, "POST");
    assert_eq!(
        req.path,
        "/v1beta/models/gemini-2.5-flash-image:generateContent"
    );
    assert_eq!(req.api_key.as_deref(), Some("test-key"));

    let parts = &req.body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], "/9j/4AAQSkZJRg==");
    assert_eq!(parts[1]["text"], "Make the sky a sunset");
    assert_eq!(
        req.body["generationConfig"]["responseModalities"],
        serde_json::json!(["IMAGE"])
    );
}

#[tokio::test]
async fn uses_configured_model() {
    let mock = MockGemini::start(MockResponse::image("image/png", "abc123")).await;
    let editor = GeminiEditor::builder()
        .api_key("test-key")
        .model(GeminiModel::NanoBananaPro)
        .base_url(&mock.base_url)
        .build()
        .unwrap();

    editor.edit(&image(), "sharpen").await.unwrap();

    let requests = mock.requests().await;
    assert_eq!(
        requests[0].path,
        "/v1beta/models/nano-banana-pro-preview:generateContent"
    );
}

#[tokio::test]
async fn response_without_image_is_an_error() {
    let mock = MockGemini::start(MockResponse::json(
        r#"{"candidates": [{"content": {"parts": [{"text": "I cannot do that."}]}}]}"#,
    ))
    .await;

    let err = editor(&mock.base_url)
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Remote(RemoteError::NoImage)));
    assert_eq!(
        err.to_string(),
        "Failed to edit image: No image found in the Gemini API response."
    );
}

#[tokio::test]
async fn safety_finish_without_image_is_no_image() {
    let mock = MockGemini::start(MockResponse::json(
        r#"{"candidates":[{"content":{"parts":[{"text":"I can't edit that."}]},"finishReason":"IMAGE_SAFETY"}]}"#,
    ))
    .await;

    let err = editor(&mock.base_url)
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Remote(RemoteError::NoImage)));
    assert_eq!(
        err.to_string(),
        "Failed to edit image: No image found in the Gemini API response."
    );
}

#[tokio::test]
async fn blocked_prompt_is_no_image() {
    let mock = MockGemini::start(MockResponse::json(
        r#"{"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}}"#,
    ))
    .await;

    let err = editor(&mock.base_url)
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Remote(RemoteError::NoImage)));
}

#[tokio::test]
async fn service_error_is_wrapped() {
    let mock = MockGemini::start(MockResponse::error(400, "Image too large")).await;

    let err = editor(&mock.base_url)
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to edit image: API error: 400 - Image too large"
    );
}

#[tokio::test]
async fn rejected_key_is_an_auth_error() {
    let mock = MockGemini::start(MockResponse::error(403, "API key not valid")).await;

    let err = editor(&mock.base_url)
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Remote(RemoteError::Auth(_))));
    assert!(err.to_string().starts_with("Failed to edit image: "));
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let mock = MockGemini::start(MockResponse::json("this is not json")).await;

    let err = editor(&mock.base_url)
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Remote(RemoteError::Json(_))));
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let mock = MockGemini::start(MockResponse::image("image/png", "abc123")).await;
    let editor = GeminiEditor::builder().base_url(&mock.base_url).build().unwrap();

    let err = editor.edit(&image(), "Add a hat").await.unwrap_err();

    assert!(matches!(err, EditError::MissingApiKey));
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn connection_failure_surfaces_directly() {
    let err = editor(&closed_base_url())
        .edit(&image(), "Add a hat")
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Remote(RemoteError::Network(_))));
    assert!(err.to_string().starts_with("Failed to edit image: "));
}

#[tokio::test]
async fn health_check_reports_status() {
    let ok = MockGemini::start(MockResponse::json(r#"{"name": "models/gemini-2.5-flash-image"}"#)).await;
    assert!(editor(&ok.base_url).health_check().await.is_ok());
    let requests = ok.requests().await;
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/v1beta/models/gemini-2.5-flash-image");

    let denied = MockGemini::start(MockResponse::error(401, "unauthorized")).await;
    let err = editor(&denied.base_url).health_check().await.unwrap_err();
    assert!(matches!(err, EditError::Remote(RemoteError::Auth(_))));
}
