//! EPUB loading utilities.
//!
//! Opens the archive once, captures the spine and the flattened table of
//! contents, and hands back a `ReaderSession`. Chapter bodies are not read
//! here; the session's cache pulls them through `EpubSource` on demand.

use crate::chapter_cache::{ChapterError, ChapterSource};
use crate::decode::decode_chapter;
use crate::session::ReaderSession;
use crate::toc::{TocNode, flatten, resolve_positions};
use epub::doc::EpubDoc;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to open EPUB at {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("EPUB at {} has an empty spine", .0.display())]
    EmptySpine(PathBuf),
}

type Doc = EpubDoc<BufReader<File>>;

/// Chapter reader backed by an open EPUB archive.
pub struct EpubSource {
    doc: Mutex<Doc>,
    chapters: usize,
}

impl ChapterSource for EpubSource {
    fn len(&self) -> usize {
        self.chapters
    }

    fn read_chapter(&self, position: usize) -> Result<String, ChapterError> {
        let mut doc = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        if !doc.set_current_chapter(position) {
            return Err(ChapterError::Read {
                position,
                reason: "spine entry could not be selected".to_string(),
            });
        }
        let (bytes, mime) = doc.get_current().ok_or_else(|| ChapterError::Read {
            position,
            reason: "spine resource is missing from the archive".to_string(),
        })?;
        debug!(position, %mime, bytes = bytes.len(), "Read chapter resource");
        Ok(decode_chapter(&bytes).into_owned())
    }
}

/// Open an EPUB and build the session for the reader screen.
pub fn open_session(path: &Path) -> Result<ReaderSession, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    info!(path = %path.display(), "Opening EPUB");
    let mut doc = EpubDoc::new(path).map_err(|err| LoadError::Open {
        path: path.to_path_buf(),
        reason: format!("{err:?}"),
    })?;

    let chapters = doc.get_num_chapters();
    if chapters == 0 {
        return Err(LoadError::EmptySpine(path.to_path_buf()));
    }

    let spine_paths = spine_paths(&mut doc, chapters);
    let nodes = TocNode::from_nav_points(&doc.toc);
    let mut toc = flatten(Some(nodes.as_slice()));
    resolve_positions(&mut toc, &spine_paths);
    doc.set_current_chapter(0);

    let title = doc
        .get_title()
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Untitled".to_string());

    info!(
        chapters,
        toc_entries = toc.len(),
        linked = toc.iter().filter(|e| e.spine_position.is_some()).count(),
        "Finished loading EPUB structure"
    );

    let source = EpubSource {
        doc: Mutex::new(doc),
        chapters,
    };
    Ok(ReaderSession::new(
        path.to_path_buf(),
        title,
        toc,
        Box::new(source),
    ))
}

fn spine_paths(doc: &mut Doc, chapters: usize) -> Vec<PathBuf> {
    (0..chapters)
        .map(|idx| {
            if !doc.set_current_chapter(idx) {
                warn!(chapter = idx, "Spine entry could not be selected");
                return PathBuf::new();
            }
            doc.get_current_path().unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>Fixture</dc:title>
        <dc:language>en</dc:language>
        <dc:identifier id="BookId">fixture-1</dc:identifier>
    </metadata>
    <manifest>
        <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
        <item id="a" href="text/a.xhtml" media-type="application/xhtml+xml"/>
        <item id="b" href="text/b.xhtml" media-type="application/xhtml+xml"/>
        <item id="c" href="text/c.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine toc="ncx">
        <itemref idref="a"/>
        <itemref idref="b"/>
        <itemref idref="c"/>
    </spine>
</package>"#;

    const NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
    <head><meta name="dtb:uid" content="fixture-1"/></head>
    <docTitle><text>Fixture</text></docTitle>
    <navMap>
        <navPoint id="p1" playOrder="1">
            <navLabel><text>Part A</text></navLabel>
            <content src="text/a.xhtml"/>
            <navPoint id="p2" playOrder="2">
                <navLabel><text>Section B</text></navLabel>
                <content src="text/b.xhtml#start"/>
            </navPoint>
        </navPoint>
        <navPoint id="p3" playOrder="3">
            <navLabel><text>Part C</text></navLabel>
            <content src="text/c.xhtml"/>
        </navPoint>
    </navMap>
</ncx>"#;

    fn write_fixture(dir: &TempDir) -> PathBuf {
        write_book(dir, "fixture.epub", OPF)
    }

    fn write_book(dir: &TempDir, name: &str, opf: &str) -> PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        let entries = [
            ("mimetype", "application/epub+zip"),
            ("META-INF/container.xml", CONTAINER),
            ("OEBPS/content.opf", opf),
            ("OEBPS/toc.ncx", NCX),
            ("OEBPS/text/a.xhtml", "<p>A</p>"),
            ("OEBPS/text/b.xhtml", "<p>B</p>"),
            ("OEBPS/text/c.xhtml", "<p>C</p>"),
        ];
        for (name, body) in entries {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn opens_spine_and_flattens_toc() {
        let dir = TempDir::new().unwrap();
        let session = open_session(&write_fixture(&dir)).unwrap();

        assert_eq!(session.chapter_count(), 3);
        assert_eq!(session.title(), "Fixture");

        let toc = session.toc();
        let titles: Vec<_> = toc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Part A", "Section B", "Part C"]);
        let depths: Vec<_> = toc.iter().map(|e| e.depth).collect();
        assert_eq!(depths, [0, 1, 0]);
        let positions: Vec<_> = toc.iter().map(|e| e.spine_position).collect();
        assert_eq!(positions, [Some(0), Some(1), Some(2)]);
        assert_eq!(toc[1].fragment.as_deref(), Some("start"));
    }

    #[test]
    fn untitled_book_falls_back_to_file_stem() {
        let dir = TempDir::new().unwrap();
        let opf = OPF.replace("<dc:title>Fixture</dc:title>", "");
        let session = open_session(&write_book(&dir, "night-train.epub", &opf)).unwrap();
        assert_eq!(session.title(), "night-train");
    }

    #[test]
    fn reads_chapters_lazily() {
        let dir = TempDir::new().unwrap();
        let session = open_session(&write_fixture(&dir)).unwrap();

        assert!(session.cached_chapter(1).is_none());
        assert_eq!(&*session.chapter(1).unwrap(), "<p>B</p>");
        assert_eq!(&*session.chapter(1).unwrap(), "<p>B</p>");
        assert!(session.cached_chapter(0).is_none());
        assert!(matches!(
            session.chapter(3),
            Err(ChapterError::OutOfRange { position: 3, len: 3 })
        ));
    }

    #[test]
    fn reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.epub");
        assert_eq!(open_session(&path).unwrap_err(), LoadError::NotFound(path));
    }

    #[test]
    fn reports_unparseable_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.epub");
        std::fs::write(&path, b"not a zip archive").unwrap();
        assert!(matches!(
            open_session(&path),
            Err(LoadError::Open { .. })
        ));
    }
}
