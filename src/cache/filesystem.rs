use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use crate::cache::{Cache, CacheStorage};
use crate::error::{self, SWError};
use crate::http::{Headers, RequestKey};
use crate::io::Response;
use crate::Result;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A cache name must be a single, non-hidden path component.
pub fn is_valid_cache_name(name: &str) -> bool {
    !(name.is_empty() || name.starts_with('.') || name.contains(&['/', '\\'][..]))
}

/// Cache storage rooted at a directory. Each named cache is a sub-directory
/// and each entry a gzip file named after the SHA-256 of its key.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FileStorage { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validate_cache_location(&self) -> Result<()> {
        let path = self.root.as_path();
        let location = path.to_string_lossy();

        if !path.exists() {
            return Err(SWError::CacheLocationDoesNotExist(format!(
                "Cache directory does not exist: {location}"
            ))
            .into());
        }

        if !path.is_dir() {
            return Err(SWError::CacheLocationIsNotADirectory(format!(
                "Cache location is not a directory: {location}"
            ))
            .into());
        }

        // Check if we can write to the directory
        let test_file_path = path.join(".write_test_cache_file");
        match File::create(&test_file_path) {
            Ok(_) => {
                if let Err(e) = fs::remove_file(&test_file_path) {
                    return Err(SWError::CacheLocationIsNotWriteable(format!(
                        "Failed to remove cache test file {}: {}",
                        test_file_path.to_string_lossy(),
                        e
                    ))
                    .into());
                }
            }
            Err(e) => {
                return Err(SWError::CacheLocationIsNotWriteable(format!(
                    "No write permission for cache directory {location}: {e}"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn cache_dir(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_cache_name(name) {
            return Err(SWError::CacheStorageError(format!("Invalid cache name: {name:?}")).into());
        }
        Ok(self.root.join(name))
    }
}

impl CacheStorage for FileStorage {
    type Store = FileCache;

    fn open(&self, name: &str) -> Result<FileCache> {
        let dir = self.cache_dir(name)?;
        fs::create_dir_all(&dir)?;
        Ok(FileCache { dir })
    }

    fn has(&self, name: &str) -> Result<bool> {
        Ok(self.cache_dir(name)?.is_dir())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.cache_dir(name)?;
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(dir)?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn get_cache_file(&self, key: &RequestKey) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.to_string());
        let hash = hasher.finalize();
        self.dir.join(format!("{hash:x}"))
    }

    fn get_cache_data(&self, reader: impl BufRead) -> Result<(RequestKey, Response)> {
        let decompressed_data = GzDecoder::new(reader);
        let mut reader = BufReader::new(decompressed_data);
        let mut key = String::new();
        reader.read_line(&mut key)?;
        let mut headers = String::new();
        reader.read_line(&mut headers)?;
        let mut status_code = String::new();
        reader.read_line(&mut status_code)?;
        let status_code = status_code.trim();
        let status_code = match status_code.parse::<u16>() {
            Ok(value) => value,
            Err(err) => {
                // parse error in here could be hard to find/debug. Send a clear
                // error trace over to the client.
                let trace = format!("Could not parse the response status code from cache {err}");
                return Err(error::gen(trace));
            }
        };
        let mut status_text = String::new();
        reader.read_line(&mut status_text)?;
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        let key = serde_json::from_str::<RequestKey>(&key)?;
        let headers = serde_json::from_str::<Headers>(&headers)?;
        let response = Response::builder()
            .status(status_code)
            .status_text(status_text.trim_end_matches('\n'))
            .headers(headers)
            .body(body)
            .build()?;
        Ok((key, response))
    }

    fn persist_cache_data(
        &self,
        key: &RequestKey,
        value: &Response,
        f: BufWriter<File>,
    ) -> Result<()> {
        let key = serde_json::to_string(key)?;
        let headers = serde_json::to_string(&value.headers)?;
        // status text is free form; keep it on one line.
        let status_text = value.status_text.replace('\n', " ");
        let preamble = format!("{}\n{}\n{}\n{}\n", key, headers, value.status, status_text);
        let mut encoder = GzEncoder::new(f, Compression::default());
        encoder.write_all(preamble.as_bytes())?;
        encoder.write_all(&value.body)?;
        let mut f = encoder.finish()?;
        f.flush()?;
        Ok(())
    }

    fn read_entry(&self, path: &Path) -> Result<(RequestKey, Response)> {
        let f = File::open(path)?;
        self.get_cache_data(BufReader::new(f))
    }
}

impl Cache for FileCache {
    fn get(&self, key: &RequestKey) -> Result<Option<Response>> {
        let path = self.get_cache_file(key);
        if !path.is_file() {
            return Ok(None);
        }
        let (stored_key, response) = self.read_entry(&path)?;
        if stored_key != *key {
            // Hash collision or foreign file: never serve another key's body.
            return Ok(None);
        }
        Ok(Some(response))
    }

    fn put(&self, key: &RequestKey, value: &Response) -> Result<()> {
        let path = self.get_cache_file(key);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        // Readers only ever see a complete entry: write aside, then rename.
        // One temp file per put, even for the same key.
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .dir
            .join(format!(".{file_name}.{}.{seq}.tmp", process::id()));
        let f = BufWriter::new(File::create(&tmp_path)?);
        let written = self
            .persist_cache_data(key, value, f)
            .and_then(|_| fs::rename(&tmp_path, &path).map_err(Into::into));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written
    }

    fn delete(&self, key: &RequestKey) -> Result<bool> {
        let path = self.get_cache_file(key);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<RequestKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let (key, _) = self.read_entry(&entry.path())?;
            keys.push(key);
        }
        keys.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(keys)
    }
}
