#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use map_sync_core::{Error, MapDescriptor, MapRepository};

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Single `.map` archive whose content is derived from the fingerprint.
pub fn map_archive(fingerprint: &str) -> Vec<u8> {
    zip_bytes(&[(
        "map.map",
        format!("[Basic]\nName={}\n", fingerprint).as_bytes(),
    )])
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// In-memory repository recording when each archive fetch started and ended.
pub struct FakeRepository {
    pub catalog: Vec<MapDescriptor>,
    pub catalog_down: bool,
    pub failing: HashSet<String>,
    pub archives: HashMap<String, Vec<u8>>,
    pub fetches: Mutex<Vec<(String, Instant, Instant)>>,
}

impl FakeRepository {
    pub fn new(maps: &[(&str, &str)]) -> Self {
        let catalog: Vec<MapDescriptor> = maps
            .iter()
            .map(|(name, fp)| MapDescriptor::new(*name, *fp))
            .collect();
        let archives = catalog
            .iter()
            .map(|m| (m.fingerprint.clone(), map_archive(&m.fingerprint)))
            .collect();
        Self {
            catalog,
            catalog_down: false,
            failing: HashSet::new(),
            archives,
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, fingerprint: &str) -> Self {
        self.failing.insert(fingerprint.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl MapRepository for FakeRepository {
    fn fetch_catalog(&self, _: &str, _: Option<u32>) -> Result<Vec<MapDescriptor>, Error> {
        if self.catalog_down {
            return Err(Error::CatalogUnavailable("connection refused".to_string()));
        }
        Ok(self.catalog.clone())
    }

    fn fetch_archive(&self, _: &str, fingerprint: &str) -> Result<Vec<u8>, Error> {
        let started = Instant::now();
        let result = if self.failing.contains(fingerprint) {
            Err(Error::ArchiveFetchFailed {
                fingerprint: fingerprint.to_string(),
                reason: "connection reset".to_string(),
            })
        } else {
            self.archives
                .get(fingerprint)
                .cloned()
                .ok_or_else(|| Error::ArchiveFetchFailed {
                    fingerprint: fingerprint.to_string(),
                    reason: "HTTP 404 Not Found".to_string(),
                })
        };
        self.fetches
            .lock()
            .unwrap()
            .push((fingerprint.to_string(), started, Instant::now()));
        result
    }
}

/// Minimal HTTP/1.1 server answering GETs from a fixed route table.
pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn start(routes: HashMap<String, (u16, Vec<u8>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Some(path) = read_request_path(&stream) else {
                    continue;
                };
                log.lock().unwrap().push(path.clone());
                let (status, body) = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, b"not found".to_vec()));
                let head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    reason(status),
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request_path(stream: &std::net::TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    loop {
        let mut header = String::new();
        let read = reader.read_line(&mut header).ok()?;
        if read == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }
    request_line.split_whitespace().nth(1).map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
