//! Binary format detection from leading bytes.
//!
//! Only formats with a fixed signature are recognized. Text payloads and
//! anything without a known signature yield `None`; callers must treat that
//! as a failure rather than pick a fallback type.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FileFormat {
    pub mime: &'static str,
    pub extension: &'static str,
}

const fn fmt(mime: &'static str, extension: &'static str) -> FileFormat {
    FileFormat { mime, extension }
}

pub const PNG: FileFormat = fmt("image/png", "png");
pub const JPEG: FileFormat = fmt("image/jpeg", "jpg");
pub const GIF: FileFormat = fmt("image/gif", "gif");
pub const BMP: FileFormat = fmt("image/bmp", "bmp");
pub const TIFF: FileFormat = fmt("image/tiff", "tif");
pub const WEBP: FileFormat = fmt("image/webp", "webp");
pub const PDF: FileFormat = fmt("application/pdf", "pdf");
pub const ZIP: FileFormat = fmt("application/zip", "zip");
pub const GZIP: FileFormat = fmt("application/gzip", "gz");
pub const SEVEN_Z: FileFormat = fmt("application/x-7z-compressed", "7z");
pub const RAR: FileFormat = fmt("application/x-rar-compressed", "rar");
pub const BZIP2: FileFormat = fmt("application/x-bzip2", "bz2");
pub const XZ: FileFormat = fmt("application/x-xz", "xz");
pub const MP3: FileFormat = fmt("audio/mpeg", "mp3");
pub const FLAC: FileFormat = fmt("audio/x-flac", "flac");
pub const OGG: FileFormat = fmt("audio/ogg", "ogg");
pub const WAV: FileFormat = fmt("audio/vnd.wave", "wav");
pub const AVI: FileFormat = fmt("video/vnd.avi", "avi");
pub const MP4: FileFormat = fmt("video/mp4", "mp4");
pub const M4A: FileFormat = fmt("audio/mp4", "m4a");
pub const MOV: FileFormat = fmt("video/quicktime", "mov");
pub const HEIC: FileFormat = fmt("image/heic", "heic");
pub const AVIF: FileFormat = fmt("image/avif", "avif");
pub const WEBM: FileFormat = fmt("video/webm", "webm");
pub const MKV: FileFormat = fmt("video/x-matroska", "mkv");
pub const SQLITE: FileFormat = fmt("application/x-sqlite3", "sqlite");
pub const DICOM: FileFormat = fmt("application/dicom", "dcm");

/// Fixed signatures at offset 0, most specific first.
const PREFIXES: &[(&[u8], FileFormat)] = &[
    (b"\x89PNG\r\n\x1a\n", PNG),
    (b"\xff\xd8\xff", JPEG),
    (b"GIF87a", GIF),
    (b"GIF89a", GIF),
    (b"II*\x00", TIFF),
    (b"MM\x00*", TIFF),
    (b"%PDF-", PDF),
    (b"PK\x03\x04", ZIP),
    (b"\x1f\x8b\x08", GZIP),
    (b"7z\xbc\xaf\x27\x1c", SEVEN_Z),
    (b"Rar!\x1a\x07", RAR),
    (b"\xfd7zXZ\x00", XZ),
    (b"BZh", BZIP2),
    (b"ID3", MP3),
    (b"fLaC", FLAC),
    (b"OggS", OGG),
    (b"SQLite format 3\x00", SQLITE),
    (b"BM", BMP),
];

const DICOM_OFFSET: usize = 128;
const EBML_MAGIC: &[u8] = b"\x1a\x45\xdf\xa3";
// Matroska doctype normally sits well inside the EBML header.
const EBML_SCAN: usize = 64;

pub fn sniff(bytes: &[u8]) -> Option<FileFormat> {
    riff(bytes)
        .or_else(|| iso_bmff(bytes))
        .or_else(|| matroska(bytes))
        .or_else(|| {
            PREFIXES
                .iter()
                .find(|(magic, _)| bytes.starts_with(magic))
                .map(|(_, f)| *f)
        })
        .or_else(|| dicom(bytes))
}

fn riff(b: &[u8]) -> Option<FileFormat> {
    if !b.starts_with(b"RIFF") || b.len() < 12 {
        return None;
    }
    match &b[8..12] {
        b"WEBP" => Some(WEBP),
        b"WAVE" => Some(WAV),
        b"AVI " => Some(AVI),
        _ => None,
    }
}

fn iso_bmff(b: &[u8]) -> Option<FileFormat> {
    if b.len() < 12 || &b[4..8] != b"ftyp" {
        return None;
    }
    // Major brand only; an unlisted brand is not guessed at.
    match &b[8..12] {
        b"isom" | b"iso2" | b"mp41" | b"mp42" | b"avc1" | b"dash" | b"M4V " => Some(MP4),
        b"M4A " | b"M4B " => Some(M4A),
        b"qt  " => Some(MOV),
        b"heic" | b"heix" | b"mif1" => Some(HEIC),
        b"avif" => Some(AVIF),
        _ => None,
    }
}

fn matroska(b: &[u8]) -> Option<FileFormat> {
    if !b.starts_with(EBML_MAGIC) {
        return None;
    }
    let head = &b[..b.len().min(EBML_SCAN)];
    if head.windows(4).any(|w| w == b"webm") {
        Some(WEBM)
    } else {
        Some(MKV)
    }
}

fn dicom(b: &[u8]) -> Option<FileFormat> {
    b.get(DICOM_OFFSET..DICOM_OFFSET + 4)
        .filter(|m| *m == b"DICM")
        .map(|_| DICOM)
}
