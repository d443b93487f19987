use axum::http::StatusCode;
use marka_core::error_builder::{
    bad_request, conflict, internal_server_error, method_not_allowed, not_found, unauthorized,
    unprocessable_entity, ErrorBuilder,
};
use marka_core::ServiceError;

#[test]
fn test_error_builder_basic() {
    let error = ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .type_("https://example.com/probs/validation-error")
        .title("Validation Error")
        .detail("The request contains invalid data")
        .instance("/clients/123")
        .build();

    assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(
        error.body.get("type").unwrap().as_str().unwrap(),
        "https://example.com/probs/validation-error"
    );
    assert_eq!(
        error.body.get("title").unwrap().as_str().unwrap(),
        "Validation Error"
    );
    assert_eq!(
        error.body.get("detail").unwrap().as_str().unwrap(),
        "The request contains invalid data"
    );
    assert_eq!(
        error.body.get("instance").unwrap().as_str().unwrap(),
        "/clients/123"
    );
}

#[test]
fn test_error_builder_with_values() {
    let error = ErrorBuilder::new(StatusCode::UNPROCESSABLE_ENTITY)
        .title("Validation Failed")
        .value("field", "url")
        .value("reason", "invalid format")
        .value("code", 422)
        .build();

    assert_eq!(error.status_code, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error.body.contains_key("field"));
    assert!(error.body.contains_key("reason"));
    assert!(error.body.contains_key("code"));
    assert!(error.body.contains_key("timestamp"));
}

#[test]
fn test_internal_server_error_builder() {
    let error = internal_server_error().build();

    assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        error.body.get("type").unwrap().as_str().unwrap(),
        "https://marka.sh/probs/internal-server-error"
    );
    assert_eq!(
        error.body.get("error_code").unwrap().as_str().unwrap(),
        "INTERNAL_SERVER_ERROR"
    );
}

#[test]
fn test_not_found_builder() {
    let error = not_found()
        .detail("Client with ID 123 was not found")
        .build();

    assert_eq!(error.status_code, StatusCode::NOT_FOUND);
    assert_eq!(
        error.body.get("type").unwrap().as_str().unwrap(),
        "https://marka.sh/probs/not-found"
    );
    assert_eq!(
        error.body.get("detail").unwrap().as_str().unwrap(),
        "Client with ID 123 was not found"
    );
    assert_eq!(
        error.body.get("error_code").unwrap().as_str().unwrap(),
        "NOT_FOUND"
    );
}

#[test]
fn test_unauthorized_builder() {
    let error = unauthorized().build();

    assert_eq!(error.status_code, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error.body.get("detail").unwrap().as_str().unwrap(),
        "Authentication is required to access this resource"
    );
    assert_eq!(
        error.body.get("error_code").unwrap().as_str().unwrap(),
        "UNAUTHORIZED"
    );
}

#[test]
fn test_bad_request_builder() {
    let error = bad_request().detail("Missing required field: url").build();

    assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(
        error.body.get("detail").unwrap().as_str().unwrap(),
        "Missing required field: url"
    );
}

#[test]
fn test_method_not_allowed_builder() {
    let error = method_not_allowed()
        .detail("You do not have permission to access this client")
        .build();

    assert_eq!(error.status_code, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        error.body.get("type").unwrap().as_str().unwrap(),
        "https://marka.sh/probs/insufficient-permissions"
    );
    assert_eq!(
        error.body.get("error_code").unwrap().as_str().unwrap(),
        "INSUFFICIENT_PERMISSIONS"
    );
}

#[test]
fn test_conflict_builder() {
    let error = conflict()
        .detail("Client with this title already exists")
        .build();

    assert_eq!(error.status_code, StatusCode::CONFLICT);
    assert_eq!(
        error.body.get("error_code").unwrap().as_str().unwrap(),
        "CONFLICT"
    );
}

#[test]
fn test_unprocessable_entity_builder() {
    let error = unprocessable_entity()
        .detail("url is not a valid URL")
        .build();

    assert_eq!(error.status_code, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error.body.get("type").unwrap().as_str().unwrap(),
        "https://marka.sh/probs/validation"
    );
}

#[test]
fn test_service_error_conversion() {
    let problem: marka_core::problemdetails::Problem =
        ServiceError::not_found("Website").into();
    assert_eq!(problem.status_code, StatusCode::NOT_FOUND);

    let problem: marka_core::problemdetails::Problem =
        ServiceError::already_exists("Tracking link").into();
    assert_eq!(problem.status_code, StatusCode::CONFLICT);

    let problem: marka_core::problemdetails::Problem =
        ServiceError::validation("title must be at least 5 characters").into();
    assert_eq!(problem.status_code, StatusCode::UNPROCESSABLE_ENTITY);

    let problem: marka_core::problemdetails::Problem = ServiceError::PermissionDenied {
        action: "read client".to_string(),
    }
    .into();
    assert_eq!(problem.status_code, StatusCode::METHOD_NOT_ALLOWED);
}
