use exif::{Exif, In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 撮影情報（EXIF）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifInfo {
    pub date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn read_exif(path: &Path) -> Result<ExifInfo, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader)?;

    Ok(ExifInfo {
        date: extract_date(&exif),
        latitude: gps_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
        longitude: gps_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
    })
}

fn extract_date(exif: &Exif) -> Option<String> {
    // DateTimeOriginal を優先し、無ければ DateTime
    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .find_map(|tag| exif.get_field(tag, In::PRIMARY))
        .map(|field| field.display_value().to_string())
}

/// 度分秒の有理数3つを10進の度に変換（南緯・西経は負）
fn gps_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let Value::Rational(ref parts) = field.value else {
        return None;
    };
    if parts.len() < 3 {
        return None;
    }

    let degrees = dms_to_degrees(parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64());
    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match f.value {
            Value::Ascii(ref v) => v.first().and_then(|s| s.first()).copied(),
            _ => None,
        })
        .is_some_and(|c| c == b'S' || c == b'W');

    Some(if negative { -degrees } else { degrees })
}

fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}
