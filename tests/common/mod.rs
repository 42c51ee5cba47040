//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{ID}/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const CONTENT_OPF: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Emma</dc:title>
    <meta name="cover" content="item-cover"/>
  </metadata>
  <manifest>
    <item id="item-cover" href="cover.jpg" media-type="image/jpeg"/>
    <item id="item-1" href="chapter.html" media-type="application/xhtml+xml"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
  </manifest>
  <spine toc="ncx"><itemref idref="item-1"/></spine>
  <guide>
    <reference type="cover" title="Cover" href="cover.jpg"/>
  </guide>
</package>"#;

pub const TOC_NCX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <navMap>
    <navPoint id="np-1" playOrder="1">
      <navLabel><text>Volume I</text></navLabel>
      <content src="chapter.html#v1"/>
    </navPoint>
    <navPoint id="np-2" playOrder="2">
      <navLabel><text>*** START: FULL LICENSE ***</text></navLabel>
      <content src="chapter.html#license"/>
    </navPoint>
    <navPoint id="np-3" playOrder="3">
      <navLabel><text>Section 1.</text></navLabel>
      <content src="chapter.html#s1"/>
    </navPoint>
  </navMap>
</ncx>"#;

pub const CHAPTER_HTML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Emma</title></head>
<body>
<p>The Project Gutenberg EBook of Emma</p>
<p>*** START OF THIS PROJECT GUTENBERG EBOOK EMMA ***</p>
<h1 id="v1">VOLUME I</h1>
<p>Emma Woodhouse, handsome, clever, and rich<br/>had lived nearly twenty-one years.</p>
<p>*** END OF THIS PROJECT GUTENBERG EBOOK EMMA ***</p>
<p id="license">*** START: FULL LICENSE ***</p>
</body></html>"#;

/// Bytes used as the placeholder cover in fixtures.
pub const PLACEHOLDER_COVER: &[u8] = b"\xff\xd8\xff\xe0 generic placeholder cover";

/// Write an EPUB shaped like a catalog download: everything under `{id}/`.
pub fn write_catalog_epub(path: &Path, book_id: u32, cover: &[u8]) {
    let dir = format!("{book_id}");
    let entries: Vec<(String, Vec<u8>)> = vec![
        ("mimetype".into(), b"application/epub+zip".to_vec()),
        (
            "META-INF/container.xml".into(),
            CONTAINER_XML.replace("{ID}", &dir).into_bytes(),
        ),
        (format!("{dir}/content.opf"), CONTENT_OPF.as_bytes().to_vec()),
        (format!("{dir}/toc.ncx"), TOC_NCX.as_bytes().to_vec()),
        (format!("{dir}/chapter.html"), CHAPTER_HTML.as_bytes().to_vec()),
        (format!("{dir}/cover.jpg"), cover.to_vec()),
    ];
    write_zip(path, &entries);
}

/// Write a zip with the given entries, in order, all deflated.
pub fn write_zip(path: &Path, entries: &[(String, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Entry names and compression methods of an archive, in order.
pub fn zip_entries(path: &Path) -> Vec<(String, CompressionMethod)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let file = archive.by_index(i).unwrap();
            (file.name().to_string(), file.compression())
        })
        .collect()
}

pub fn read_zip_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

pub fn sha1_hex(data: &[u8]) -> String {
    sha1_smol::Sha1::from(data).digest().to_string()
}
