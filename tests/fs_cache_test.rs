use std::fs;

use ipso::cache::{Cache, CacheStorage, FileStorage};
use ipso::error::SWError;
use ipso::http::{Headers, RequestKey};
use ipso::io::Response;
use tempfile::TempDir;

fn response(body: &str) -> Response {
    let mut headers = Headers::new();
    headers.set("content-type", "text/html; charset=utf-8");
    Response::builder()
        .status(200)
        .status_text("OK")
        .headers(headers)
        .body(body.as_bytes().to_vec())
        .build()
        .unwrap()
}

#[test]
fn test_entries_survive_a_new_storage_instance() {
    let dir = TempDir::new().unwrap();
    let key = RequestKey::get("http://localhost:3000/offline.html");
    FileStorage::new(dir.path())
        .open("ipstream-cache-v1")
        .unwrap()
        .put(&key, &response("<h1>Sin conexión</h1>"))
        .unwrap();

    let storage = FileStorage::new(dir.path());
    assert!(storage.has("ipstream-cache-v1").unwrap());
    let cached = storage.open("ipstream-cache-v1").unwrap().get(&key).unwrap().unwrap();
    assert_eq!(response("<h1>Sin conexión</h1>"), cached);
}

#[test]
fn test_entries_are_stored_compressed_under_hashed_names() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path());
    let cache = storage.open("ipstream-cache-v1").unwrap();
    let key = RequestKey::get("http://localhost:3000/manifest.json");
    cache.put(&key, &response("{\"name\": \"IPStream\"}")).unwrap();

    let path = cache.get_cache_file(&key);
    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(64, file_name.len());
    assert!(file_name.chars().all(|c| c.is_ascii_hexdigit()));
    let raw = fs::read(&path).unwrap();
    // gzip magic number
    assert_eq!(&[0x1f, 0x8b], &raw[..2]);
    let entries = fs::read_dir(dir.path().join("ipstream-cache-v1")).unwrap().count();
    assert_eq!(1, entries);
}

#[test]
fn test_validate_cache_location_on_a_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "").unwrap();
    let err = FileStorage::new(&file).validate_cache_location().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SWError>(),
        Some(SWError::CacheLocationIsNotADirectory(_))
    ));
    let err = FileStorage::new(dir.path().join("missing"))
        .validate_cache_location()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SWError>(),
        Some(SWError::CacheLocationDoesNotExist(_))
    ));
}

#[test]
fn test_delete_generation_removes_its_directory() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path());
    storage.open("ipstream-cache-v1").unwrap();
    storage.open("ipstream-cache-v2").unwrap();
    assert!(storage.delete("ipstream-cache-v1").unwrap());
    assert!(!storage.delete("ipstream-cache-v1").unwrap());
    assert!(!dir.path().join("ipstream-cache-v1").exists());
    assert_eq!(vec!["ipstream-cache-v2".to_string()], storage.keys().unwrap());
}
