// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::IntoResponse;
use offline_cache::error::CacheError;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        CacheError::Install {
            asset: "./index.html".to_string(),
            reason: "connection refused".to_string(),
        },
        CacheError::BadStatus {
            asset: "./".to_string(),
            status: 503,
        },
        CacheError::Network("dns".to_string()),
        CacheError::Offline("http://app.test/style.css".to_string()),
        CacheError::Storage("disk full".to_string()),
        CacheError::Corrupt("index.json".to_string()),
        CacheError::InvalidUrl("::".to_string()),
        CacheError::Config("bad".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_install_error_names_asset() {
    let error = CacheError::Install {
        asset: "./manifest.webmanifest".to_string(),
        reason: "timed out".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("./manifest.webmanifest"));
    assert!(message.contains("timed out"));
}

#[test]
fn test_bad_status_error() {
    let error = CacheError::BadStatus {
        asset: "./".to_string(),
        status: 404,
    };
    assert!(format!("{}", error).contains("404"));
}

#[test]
fn test_offline_maps_to_bad_gateway() {
    let response = CacheError::Offline("http://app.test/".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_storage_maps_to_internal_error() {
    let response = CacheError::Storage("rename failed".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_invalid_request_maps_to_bad_request() {
    let response = CacheError::InvalidRequest("body too large".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: CacheError = io.into();
    assert!(matches!(error, CacheError::Io(_)));
    assert!(!error.is_network());
}
