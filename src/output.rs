use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use quicklook_correlate::EmittedRecord;
use quicklook_metadata::format_utc;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const MIME_CLASS: &str = "picture";
pub const MIME_TYPE: &str = "image/png";

/// Trace document for a record: flat, dotted keys.
pub fn trace(record: &EmittedRecord) -> Result<Map<String, Value>> {
    let link = &record.link;
    let modified_on = format_utc(link.target_modified_on).or_raise(|| ErrorKind::Serialize)?;
    let mut trace = Map::new();
    trace.insert("link.target".into(), link.target.clone().into());
    trace.insert("link.targetFileLength".into(), link.target_file_length.into());
    trace.insert("link.misc.targetModifiedOn".into(), modified_on.into());
    trace.insert("link.misc.plistVersion".into(), link.plist_version.clone().into());
    trace.insert("link.misc.generator".into(), link.generator.clone().into());
    trace.insert("link.misc.fsId".into(), link.fs_id.clone().into());
    for (key, value) in record.properties.iter().flatten() {
        trace.insert(format!("picture.misc.{key}"), value.clone().into());
    }
    if let Some(thumbnail) = &record.thumbnail {
        trace.insert("data.raw.mimeClass".into(), MIME_CLASS.into());
        trace.insert("data.raw.mimeType".into(), MIME_TYPE.into());
        trace.insert("data.raw.size".into(), thumbnail.png.len().into());
        trace.insert("data.raw.blake3".into(), thumbnail.blake3.clone().into());
    }
    Ok(trace)
}

/// Where emitted records end up.
pub trait Sink {
    /// Persist `record`, which belongs to the cache at `cache` (the bitmap
    /// store's directory, relative to the artifact root).
    fn write(&mut self, cache: &Path, record: &EmittedRecord) -> Result<()>;
}

/// Writes `<root>/<cache>/thumb-N.json` and, optionally, `thumb-N.png`.
pub struct DirectorySink {
    root: PathBuf,
    write_images: bool,
}
impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, write_images: bool) -> Self {
        Self {
            root: root.into(),
            write_images,
        }
    }
}
impl Sink for DirectorySink {
    fn write(&mut self, cache: &Path, record: &EmittedRecord) -> Result<()> {
        let directory = self.root.join(cache);
        fs::create_dir_all(&directory).or_raise(|| ErrorKind::Output(directory.clone()))?;
        let name = record.name();

        let path = directory.join(format!("{name}.json"));
        let document = serde_json::to_vec_pretty(&trace(record)?).or_raise(|| ErrorKind::Serialize)?;
        fs::write(&path, document).or_raise(|| ErrorKind::Output(path.clone()))?;

        if let Some(thumbnail) = record.thumbnail.as_ref().filter(|_| self.write_images) {
            let path = directory.join(format!("{name}.png"));
            fs::write(&path, &thumbnail.png).or_raise(|| ErrorKind::Output(path.clone()))?;
        }
        tracing::debug!(record = %name, directory = %directory.display(), "record written");
        Ok(())
    }
}

/// Writes one JSON document per line, tagged with the cache and record name.
pub struct LinesSink<W> {
    writer: W,
}
impl<W: Write> LinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
impl<W: Write> Sink for LinesSink<W> {
    fn write(&mut self, cache: &Path, record: &EmittedRecord) -> Result<()> {
        let mut document = trace(record)?;
        document.insert("cache".into(), cache.to_string_lossy().into_owned().into());
        document.insert("name".into(), record.name().into());
        let stdout = || ErrorKind::Output(PathBuf::from("-"));
        serde_json::to_writer(&mut self.writer, &document).or_raise(|| ErrorKind::Serialize)?;
        self.writer.write_all(b"\n").or_raise(stdout)?;
        self.writer.flush().or_raise(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicklook_bitmap::Thumbnail;
    use quicklook_correlate::Link;
    use quicklook_table::RowId;
    use time::UtcDateTime;

    fn record(thumbnail: Option<Thumbnail>) -> EmittedRecord {
        EmittedRecord {
            ordinal: 3,
            file_id: RowId::new(2).unwrap(),
            link: Link {
                target: "/Users/a/Desktop/cat.jpg".to_string(),
                target_file_length: 48213,
                target_modified_on: UtcDateTime::from_unix_timestamp(1_577_836_800).unwrap(),
                plist_version: "<binary 0A>".to_string(),
                generator: "com.apple.QuickLook.ImageGenerator".to_string(),
                fs_id: "16777220".to_string(),
            },
            thumbnail,
            properties: Some(vec![
                ("hit_count".to_string(), "4".to_string()),
                ("last_hit_date".to_string(), "2020-01-01T00:00:00.000 UTC".to_string()),
            ]),
        }
    }

    fn thumbnail() -> Thumbnail {
        Thumbnail {
            png: vec![0x89, b'P', b'N', b'G'],
            width: 1,
            height: 1,
            blake3: "af13".to_string(),
        }
    }

    #[test]
    fn test_trace_with_image() {
        let trace = trace(&record(Some(thumbnail()))).unwrap();
        let expected = serde_json::json!({
            "link.target": "/Users/a/Desktop/cat.jpg",
            "link.targetFileLength": 48213,
            "link.misc.targetModifiedOn": "2020-01-01T00:00:00.000 UTC",
            "link.misc.plistVersion": "<binary 0A>",
            "link.misc.generator": "com.apple.QuickLook.ImageGenerator",
            "link.misc.fsId": "16777220",
            "picture.misc.hit_count": "4",
            "picture.misc.last_hit_date": "2020-01-01T00:00:00.000 UTC",
            "data.raw.mimeClass": "picture",
            "data.raw.mimeType": "image/png",
            "data.raw.size": 4,
            "data.raw.blake3": "af13",
        });
        assert_eq!(Value::Object(trace), expected);
    }

    #[test]
    fn test_trace_without_image() {
        let mut record = record(None);
        record.properties = None;
        let trace = trace(&record).unwrap();
        assert_eq!(trace.len(), 6);
        assert!(trace.keys().all(|key| key.starts_with("link.")));
    }

    #[test]
    fn test_directory_sink() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Path::new("private/var/folders/C/com.apple.QuickLook.thumbnailcache");
        let mut sink = DirectorySink::new(dir.path(), true);
        sink.write(cache, &record(Some(thumbnail()))).unwrap();

        let json = fs::read(dir.path().join(cache).join("thumb-3.json")).unwrap();
        let document: Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(document["data.raw.blake3"], "af13");
        assert_eq!(fs::read(dir.path().join(cache).join("thumb-3.png")).unwrap(), thumbnail().png);
    }

    #[test]
    fn test_directory_sink_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path(), false);
        sink.write(Path::new("c"), &record(Some(thumbnail()))).unwrap();
        assert!(dir.path().join("c/thumb-3.json").is_file());
        assert!(!dir.path().join("c/thumb-3.png").exists());
    }

    #[test]
    fn test_lines_sink() {
        let mut sink = LinesSink::new(Vec::new());
        sink.write(Path::new("a"), &record(None)).unwrap();
        sink.write(Path::new("b"), &record(Some(thumbnail()))).unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = output.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!((&lines[0]["cache"], &lines[0]["name"]), (&Value::from("a"), &Value::from("thumb-3")));
        assert!(lines[0].get("data.raw.size").is_none());
        assert_eq!(lines[1]["data.raw.size"], 4);
    }
}
