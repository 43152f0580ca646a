// Where the two sources live and how they are encoded.
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const DEFAULT_WASTE_PATH: &str = "BD_residuos_sólidos.csv";
pub const DEFAULT_LOCATION_PATH: &str = "BD_ubicacion_distritos.csv";

// Waste source columns.
pub const COL_DEPARTMENT: &str = "DEPARTAMENTO";
pub const COL_PROVINCE: &str = "PROVINCIA";
pub const COL_DISTRICT: &str = "DISTRITO";
pub const COL_PERIOD: &str = "PERIODO";

// Location source columns.
pub const COL_LATITUDE: &str = "LATITUD";
pub const COL_LONGITUDE: &str = "LONGITUD";
pub const COL_URBAN_POP: &str = "POB_URBANA";
pub const COL_RURAL_POP: &str = "POB_RURAL";

/// Text encoding of a source file.
///
/// WHATWG labels (what `encoding_rs` implements) map `latin1` and
/// `iso-8859-1` to windows-1252, which reads bytes 0x80–0x9F as `€`, `‚` and
/// so on. True ISO-8859-1 is kept as its own variant so those bytes decode
/// to the matching code points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    Latin1,
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    pub fn for_label(label: &str) -> Option<TextEncoding> {
        let label = label.trim();
        let latin1 = ["latin1", "latin-1", "l1", "iso-8859-1", "iso8859-1", "iso_8859-1"];
        if latin1.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            return Some(TextEncoding::Latin1);
        }
        Encoding::for_label(label.as_bytes()).map(TextEncoding::Whatwg)
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Whatwg(enc) => enc.name(),
        }
    }

    /// Decode a whole file. `None` when the bytes are not valid in this
    /// encoding. A byte-order mark is honoured and dropped for WHATWG
    /// encodings; Latin-1 has none and cannot fail.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            TextEncoding::Latin1 => {
                Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
            }
            TextEncoding::Whatwg(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                (!had_errors).then_some(text)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub encoding: TextEncoding,
    pub delimiter: u8,
}

impl SourceConfig {
    /// Waste generation table: `;` separated, ISO-8859-1.
    pub fn waste(path: impl AsRef<Path>) -> Self {
        SourceConfig {
            path: path.as_ref().to_path_buf(),
            encoding: TextEncoding::Latin1,
            delimiter: b';',
        }
    }

    /// District location table: `;` separated, UTF-8 with byte-order mark.
    pub fn location(path: impl AsRef<Path>) -> Self {
        SourceConfig {
            path: path.as_ref().to_path_buf(),
            encoding: TextEncoding::Whatwg(UTF_8),
            delimiter: b';',
        }
    }

    pub fn with_encoding_label(mut self, label: &str) -> Option<Self> {
        self.encoding = TextEncoding::for_label(label)?;
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn defaults_match_the_source_formats() {
        let w = SourceConfig::waste(DEFAULT_WASTE_PATH);
        assert_eq!(w.encoding, TextEncoding::Latin1);
        assert_eq!(w.delimiter, b';');
        let l = SourceConfig::location(DEFAULT_LOCATION_PATH);
        assert_eq!(l.encoding, TextEncoding::Whatwg(UTF_8));
    }

    #[test]
    fn latin1_labels_stay_iso_8859_1() {
        let w = SourceConfig::location("x.csv")
            .with_encoding_label("latin1")
            .unwrap();
        assert_eq!(w.encoding, TextEncoding::Latin1);
        assert_eq!(
            TextEncoding::for_label("ISO-8859-1"),
            Some(TextEncoding::Latin1)
        );
        assert_eq!(
            TextEncoding::for_label("windows-1252"),
            Some(TextEncoding::Whatwg(WINDOWS_1252))
        );
        assert!(SourceConfig::waste("x.csv")
            .with_encoding_label("no-such-encoding")
            .is_none());
    }

    #[test]
    fn latin1_control_range_maps_to_matching_code_points() {
        let text = TextEncoding::Latin1.decode(b"A\x80B\xd1").unwrap();
        assert_eq!(text, "A\u{80}BÑ");
        let cp1252 = TextEncoding::Whatwg(WINDOWS_1252).decode(b"A\x80B").unwrap();
        assert_eq!(cp1252, "A€B");
    }

    #[test]
    fn utf8_decode_drops_bom_and_rejects_bad_bytes() {
        let utf8 = TextEncoding::Whatwg(UTF_8);
        assert_eq!(utf8.decode("\u{feff}DISTRITO".as_bytes()).unwrap(), "DISTRITO");
        assert!(utf8.decode(b"BRE\xd1A").is_none());
    }
}
