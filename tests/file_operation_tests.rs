use bytes::Bytes;
use storage_kit::{
    BucketName, BucketSettings, ErrorKind, FilePayload, ListOptions, SortBy, UploadOptions,
    UploadPlacement, create_in_memory_storage,
};

fn name(s: &str) -> BucketName {
    BucketName::new(s).unwrap()
}

async fn storage_with_bucket(bucket: &str) -> storage_kit::StorageServices {
    let services = create_in_memory_storage();
    services
        .buckets
        .create_bucket(&name(bucket), BucketSettings::default())
        .await
        .unwrap();
    services
}

fn png(name: &str, size: usize) -> FilePayload {
    FilePayload::new(name, "image/png", Bytes::from(vec![0u8; size]))
}

#[tokio::test]
async fn test_upload_returns_path_id_and_public_url() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    let result = services
        .files
        .upload_file(
            &bucket,
            "events/opening.png",
            png("opening.png", 64).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.path, "events/opening.png");
    assert!(result.id.is_some());
    assert!(result.public_url.ends_with("/object/public/gallery/events/opening.png"));
}

#[tokio::test]
async fn test_upload_to_existing_path_fails_unless_upsert() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    services
        .files
        .upload_file(&bucket, "a.png", png("a.png", 8).into(), UploadOptions::default())
        .await
        .unwrap();

    // Overwrite is opt-in; the default fails.
    let err = services
        .files
        .upload_file(&bucket, "a.png", png("a.png", 8).into(), UploadOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BucketAlreadyExists);

    services
        .files
        .upload_file(
            &bucket,
            "a.png",
            png("a.png", 16).into(),
            UploadOptions {
                upsert: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let downloaded = services
        .files
        .download_file(&bucket, "a.png", Default::default())
        .await
        .unwrap();
    assert_eq!(downloaded.size, 16);
}

#[tokio::test]
async fn test_typed_upload_is_validated_before_any_remote_write() {
    let services = create_in_memory_storage();
    let bucket = name("avatars");
    services
        .buckets
        .create_bucket(
            &bucket,
            BucketSettings {
                public: Some(true),
                allowed_mime_types: Some(vec!["image/png".into()]),
                file_size_limit: Some(100),
            },
        )
        .await
        .unwrap();

    // Size violation short-circuits locally: the message is the validator's,
    // not the remote service's fixed mapping.
    let err = services
        .files
        .upload_file(
            &bucket,
            "big.png",
            png("big.png", 101).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    assert_eq!(err.status_code(), Some(413));
    assert!(err.message().contains("File size"));

    // MIME violation.
    let err = services
        .files
        .upload_file(
            &bucket,
            "notes.txt",
            FilePayload::new("notes.txt", "text/plain", Bytes::from_static(b"hi")).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidMimeType);
    assert_eq!(err.status_code(), Some(415));

    // Nothing reached the store.
    let files = services
        .files
        .list_files(&bucket, "", Default::default())
        .await
        .unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_upload_with_validation_places_and_renames() {
    let services = storage_with_bucket("speakers").await;
    let bucket = name("speakers");
    let policy = services.buckets.get_bucket(&bucket).await.unwrap().policy();

    let result = services
        .files
        .upload_file_with_validation(
            &bucket,
            png("portrait.png", 32),
            &policy,
            UploadPlacement {
                folder: Some("2026".into()),
                unique_name: true,
                upload: UploadOptions::default(),
            },
        )
        .await
        .unwrap();

    assert!(result.path.starts_with("2026/portrait-"));
    assert!(result.path.ends_with(".png"));

    // Without a unique name the original filename is kept.
    let result = services
        .files
        .upload_file_with_validation(
            &bucket,
            png("portrait.png", 32),
            &policy,
            UploadPlacement {
                folder: Some("2026".into()),
                unique_name: false,
                upload: UploadOptions::default(),
            },
        )
        .await
        .unwrap();
    assert_eq!(result.path, "2026/portrait.png");
}

#[tokio::test]
async fn test_download_reports_basename_and_content_type() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    services
        .files
        .upload_file(
            &bucket,
            "events/day1/keynote.png",
            png("keynote.png", 24).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    let result = services
        .files
        .download_file(&bucket, "events/day1/keynote.png", Default::default())
        .await
        .unwrap();

    assert_eq!(result.filename, "keynote.png");
    assert_eq!(result.content_type.as_deref(), Some("image/png"));
    assert_eq!(result.size, 24);
    assert_eq!(result.data.len(), 24);

    let err = services
        .files
        .download_file(&bucket, "missing.png", Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[tokio::test]
async fn test_move_and_copy() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    services
        .files
        .upload_file(&bucket, "tmp/a.png", png("a.png", 8).into(), UploadOptions::default())
        .await
        .unwrap();

    let copied = services
        .files
        .copy_file(&bucket, "tmp/a.png", "final/a.png")
        .await
        .unwrap();
    assert_eq!(copied, "final/a.png");

    let message = services
        .files
        .move_file(&bucket, "tmp/a.png", "archive/a.png")
        .await
        .unwrap();
    assert!(!message.is_empty());

    // Source is gone after the move, both destinations resolve.
    assert!(services
        .files
        .download_file(&bucket, "tmp/a.png", Default::default())
        .await
        .is_err());
    assert!(services
        .files
        .download_file(&bucket, "final/a.png", Default::default())
        .await
        .is_ok());
    assert!(services
        .files
        .download_file(&bucket, "archive/a.png", Default::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_delete_single_equals_batch_of_one() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    services
        .files
        .upload_file(&bucket, "x.png", png("x.png", 8).into(), UploadOptions::default())
        .await
        .unwrap();

    let removed = services.files.delete_file(&bucket, "x.png").await.unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].name, "x.png");

    // Deleting a missing path is not an error for the batch call; the remote
    // service simply reports nothing removed.
    let removed = services.files.delete_file(&bucket, "x.png").await.unwrap();
    assert!(removed.is_empty());
}

#[tokio::test]
async fn test_list_with_prefix_search_sort_and_pagination() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    for (path, size) in [
        ("2026/alpha.png", 10),
        ("2026/beta.png", 30),
        ("2026/gamma.jpg", 20),
        ("2025/old.png", 5),
    ] {
        services
            .files
            .upload_file(&bucket, path, png(path, size).into(), UploadOptions::default())
            .await
            .unwrap();
    }

    let in_2026 = services
        .files
        .list_files(&bucket, "2026", Default::default())
        .await
        .unwrap();
    assert_eq!(in_2026.len(), 3);
    assert!(in_2026.iter().all(|f| !f.name.contains('/')));

    let found = services
        .files
        .list_files(
            &bucket,
            "2026",
            ListOptions {
                search: Some("png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    let by_size_desc = services
        .files
        .list_files(
            &bucket,
            "2026",
            ListOptions {
                sort_by: Some(SortBy {
                    column: "size".into(),
                    ascending: false,
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_size_desc[0].name, "beta.png");

    let page = services
        .files
        .list_files(
            &bucket,
            "2026",
            ListOptions {
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
}
