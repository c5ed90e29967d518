mod helpers;

use assetkit_core::find_field;
use assetkit_services::StorageResolver;
use helpers::MockGateway;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_unset_values_resolve_to_none() {
    let resolver = StorageResolver::new(Arc::new(MockGateway::offline()), "/media/");

    assert_eq!(resolver.resolve_url(None, "leadership", "/media/").await, None);
    assert_eq!(resolver.resolve_url(Some(""), "leadership", "/media/").await, None);
    assert_eq!(resolver.resolve_url(Some("  "), "leadership", "/media/").await, None);
}

#[tokio::test]
async fn test_absolute_url_passes_through() {
    let resolver = StorageResolver::new(Arc::new(MockGateway::offline()), "/media/");

    assert_eq!(
        resolver
            .resolve_url(Some("HTTPS://cdn.example.com/a.jpg"), "leadership", "/media/")
            .await
            .as_deref(),
        Some("HTTPS://cdn.example.com/a.jpg")
    );
}

#[tokio::test]
async fn test_versioned_id_uses_template_without_network() {
    let resolver = StorageResolver::new(Arc::new(MockGateway::offline()), "/media/");

    let url = resolver
        .resolve_url(Some("v1700000000/leadership/johnabc123"), "leadership", "/media/")
        .await;

    assert_eq!(
        url.as_deref(),
        Some("https://res.cloudinary.com/demo/image/upload/v1700000000/leadership/johnabc123")
    );
}

#[tokio::test]
async fn test_versioned_video_uses_field_resource_type() {
    let resolver = StorageResolver::new(Arc::new(MockGateway::offline()), "/media/");
    let field = find_field("gallery.video").unwrap();

    let url = resolver
        .resolve_for_field(Some("v5/gallery/videos/clip"), field)
        .await;

    assert_eq!(
        url.as_deref(),
        Some("https://res.cloudinary.com/demo/video/upload/v5/gallery/videos/clip")
    );
}

#[tokio::test]
async fn test_legacy_path_found_remotely() {
    let gateway = Arc::new(MockGateway::new());
    gateway.add_remote_asset(
        "leadership/john.jpg",
        "https://res.cloudinary.com/demo/image/upload/v1/leadership/john.jpg",
    );
    let resolver = StorageResolver::new(gateway.clone(), "/media/");

    let url = resolver
        .resolve_url(Some("leadership/john.jpg"), "leadership", "/media/")
        .await;

    assert_eq!(
        url.as_deref(),
        Some("https://res.cloudinary.com/demo/image/upload/v1/leadership/john.jpg")
    );
    assert_eq!(gateway.lookups(), vec!["leadership/john.jpg".to_string()]);
}

#[tokio::test]
async fn test_legacy_path_falls_back_to_media_url() {
    let gateway = Arc::new(MockGateway::new());
    let resolver = StorageResolver::new(gateway.clone(), "/media/");

    let url = resolver
        .resolve_url(Some("leadership/john.jpg"), "leadership", "/media/")
        .await;

    assert_eq!(url.as_deref(), Some("/media/leadership/john.jpg"));
}

#[tokio::test]
async fn test_legacy_path_outside_folder_is_looked_up_under_hint() {
    let gateway = Arc::new(MockGateway::new());
    let resolver = StorageResolver::new(gateway.clone(), "/media/");

    let url = resolver
        .resolve_url(Some("uploads/2019/john.jpg"), "leadership", "/media")
        .await;

    assert_eq!(url.as_deref(), Some("/media/uploads/2019/john.jpg"));
    assert_eq!(gateway.lookups(), vec!["leadership/john.jpg".to_string()]);
}

#[tokio::test]
async fn test_slow_lookup_falls_back() {
    let gateway = Arc::new(MockGateway::with_lookup_delay(Duration::from_secs(5)));
    let resolver = StorageResolver::new(gateway, "/media/")
        .with_lookup_timeout(Duration::from_millis(20));

    let url = resolver
        .resolve_url(Some("leadership/john.jpg"), "leadership", "/media/")
        .await;

    assert_eq!(url.as_deref(), Some("/media/leadership/john.jpg"));
}

#[tokio::test]
async fn test_odd_inputs_never_panic() {
    let resolver = StorageResolver::new(Arc::new(MockGateway::new()), "/media/");

    for raw in ["/", "//", "v", "v1/", "v/x", "..", "http:", "\u{0}", "é/ü.jpg", "videos/clip.mp4"] {
        let url = resolver.resolve_url(Some(raw), "", "").await;
        assert!(url.is_some(), "{:?}", raw);
    }
}
