use crate::store::{Class, Exam, ExamResult, Store, Student, Teacher};
use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_FORMAT_V1: &str = "schooldesk-data-v1";

const DATA_ENTRIES: [&str; 5] = [
    "data/teachers.json",
    "data/students.json",
    "data/classes.json",
    "data/exams.json",
    "data/results.json",
];

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Default)]
pub struct BundleData {
    pub teachers: Vec<Teacher>,
    pub students: Vec<Student>,
    pub classes: Vec<Class>,
    pub exams: Vec<Exam>,
    pub results: Vec<ExamResult>,
}

fn entry_payload<T: Serialize>(items: &[T]) -> anyhow::Result<String> {
    serde_json::to_string_pretty(items).context("failed to serialize collection")
}

fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

pub fn export_data_bundle(store: &Store, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let payloads = [
        entry_payload(store.teachers())?,
        entry_payload(store.students())?,
        entry_payload(store.classes())?,
        entry_payload(store.exams())?,
        entry_payload(store.results())?,
    ];

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let mut checksums = serde_json::Map::new();
    for (entry, payload) in DATA_ENTRIES.iter().zip(payloads.iter()) {
        checksums.insert(entry.to_string(), json!(sha256_hex(payload)));
    }
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "checksums": checksums,
    });

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (entry, payload) in DATA_ENTRIES.iter().zip(payloads.iter()) {
        zip.start_file(*entry, opts)
            .with_context(|| format!("failed to start entry {}", entry))?;
        zip.write_all(payload.as_bytes())
            .with_context(|| format!("failed to write entry {}", entry))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 1 + DATA_ENTRIES.len(),
    })
}

fn read_entry<T: DeserializeOwned>(
    archive: &mut ZipArchive<File>,
    entry: &str,
    checksums: &serde_json::Value,
) -> anyhow::Result<Vec<T>> {
    let mut text = String::new();
    archive
        .by_name(entry)
        .with_context(|| format!("bundle missing {}", entry))?
        .read_to_string(&mut text)
        .with_context(|| format!("failed to read {}", entry))?;

    let expected = checksums
        .get(entry)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("manifest has no checksum for {}", entry))?;
    let actual = sha256_hex(&text);
    if actual != expected {
        return Err(anyhow!(
            "checksum mismatch for {}: expected {}, got {}",
            entry,
            expected,
            actual
        ));
    }

    serde_json::from_str(&text).with_context(|| format!("{} is invalid JSON", entry))
}

pub fn import_data_bundle(in_path: &Path) -> anyhow::Result<BundleData> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let checksums = manifest
        .get("checksums")
        .cloned()
        .unwrap_or_else(|| json!({}));

    Ok(BundleData {
        teachers: read_entry(&mut archive, "data/teachers.json", &checksums)?,
        students: read_entry(&mut archive, "data/students.json", &checksums)?,
        classes: read_entry(&mut archive, "data/classes.json", &checksums)?,
        exams: read_entry(&mut archive, "data/exams.json", &checksums)?,
        results: read_entry(&mut archive, "data/results.json", &checksums)?,
    })
}
