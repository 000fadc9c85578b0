use super::*;

#[test]
fn status_error_uses_server_message_when_present() {
    let err = ClientError::from_status(404, r#"{"success":false,"msg":"Profile not found"}"#);
    assert_eq!(
        err,
        ClientError::Application {
            status: Some(404),
            message: "Profile not found".to_string(),
        }
    );
    assert_eq!(err.display_message("fallback"), "Profile not found");
    assert_eq!(err.status(), Some(404));
}

#[test]
fn status_error_without_body_uses_generic_text() {
    let err = ClientError::from_status(502, "<html>bad gateway</html>");
    assert_eq!(err.to_string(), "request failed with status 502");
    assert_eq!(err.kind(), "application");
}

#[test]
fn non_application_errors_display_the_fallback() {
    let fallback = "Failed to load profiles. Please try again.";
    assert_eq!(
        ClientError::Network("connection refused".into()).display_message(fallback),
        fallback
    );
    assert_eq!(
        ClientError::invalid_shape("expected object").display_message(fallback),
        fallback
    );
    assert_eq!(
        ClientError::application("   ").display_message(fallback),
        fallback
    );
    assert_eq!(ClientError::NotAuthenticated.kind(), "not_authenticated");
}
