//! SPICE 2D detector frame parsing.
//!
//! HB3A stores each detector exposure as an XML file with the pixel
//! dimensions in the header, the raw counts as a whitespace-separated blob,
//! and the motor positions of the scan point.

use crate::error::{Error, Result};
use flipratio_core::{DetectorImage, HklIndex, ScanMetadata};
use ndarray::Array2;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Text content of the fields a detector frame must provide.
#[derive(Default)]
struct RawFields {
    x_pixels: Option<String>,
    y_pixels: Option<String>,
    detector: Option<String>,
    h: Option<String>,
    k: Option<String>,
    l: Option<String>,
}

/// Loads a detector frame and its scan metadata from a SPICE XML file.
///
/// The detector blob is stored column-major relative to the image: it is
/// reshaped to the declared `(x_pixels, y_pixels)` and transposed into
/// (row, col) orientation. Motor positions h, k, l are rounded to the
/// nearest integer reflection.
///
/// # Errors
/// Returns [`Error::Parse`] when a required field is missing or malformed,
/// or when the blob length disagrees with the declared dimensions.
pub fn load_scan_image(path: impl AsRef<Path>) -> Result<(DetectorImage, ScanMetadata)> {
    let path = path.as_ref();
    let fields = read_fields(path)?;

    let x_pixels: usize = parse_field(path, "Number_of_X_Pixels", fields.x_pixels.as_deref())?;
    let y_pixels: usize = parse_field(path, "Number_of_Y_Pixels", fields.y_pixels.as_deref())?;

    let blob = fields
        .detector
        .as_deref()
        .ok_or_else(|| Error::parse(path, "missing field Data/Detector"))?;
    let values = blob
        .split_whitespace()
        .map(|tok| {
            tok.parse::<u32>()
                .map_err(|_| Error::parse(path, format!("invalid detector count '{tok}'")))
        })
        .collect::<Result<Vec<u32>>>()?;
    if values.len() != x_pixels * y_pixels {
        return Err(Error::parse(
            path,
            format!(
                "detector blob holds {} values, expected {} x {}",
                values.len(),
                x_pixels,
                y_pixels
            ),
        ));
    }

    let counts = Array2::from_shape_vec((x_pixels, y_pixels), values)
        .map_err(|e| Error::parse(path, e.to_string()))?
        .reversed_axes();

    let h: f64 = parse_field(path, "_h", fields.h.as_deref())?;
    let k: f64 = parse_field(path, "_k", fields.k.as_deref())?;
    let l: f64 = parse_field(path, "_l", fields.l.as_deref())?;
    let metadata = ScanMetadata::new(HklIndex::from_motor_positions(h, k, l));

    Ok((DetectorImage::new(counts), metadata))
}

/// Walks the XML once and captures the text of the fields of interest.
fn read_fields(path: &Path) -> Result<RawFields> {
    let mut reader =
        Reader::from_file(path).map_err(|e| Error::parse(path, e.to_string()))?;
    reader.config_mut().trim_text(true);

    let mut fields = RawFields::default();
    let mut stack: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::parse(path, e.to_string()))?;
        match event {
            Event::Start(e) => {
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(t) => {
                if let [.., parent, leaf] = stack.as_slice() {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    let slot = match (parent.as_str(), leaf.as_str()) {
                        ("Header", "Number_of_X_Pixels") => Some(&mut fields.x_pixels),
                        ("Header", "Number_of_Y_Pixels") => Some(&mut fields.y_pixels),
                        ("Data", "Detector") => Some(&mut fields.detector),
                        ("Motor_Positions", "_h") => Some(&mut fields.h),
                        ("Motor_Positions", "_k") => Some(&mut fields.k),
                        ("Motor_Positions", "_l") => Some(&mut fields.l),
                        _ => None,
                    };
                    if let Some(slot) = slot {
                        append(slot, &text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fields)
}

/// Accumulates possibly split text nodes of one element.
fn append(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_owned()),
    }
}

/// Parses a required scalar field.
fn parse_field<T>(path: &Path, name: &str, text: Option<&str>) -> Result<T>
where
    T: std::str::FromStr,
{
    let text = text.ok_or_else(|| Error::parse(path, format!("missing field {name}")))?;
    text.trim()
        .parse()
        .map_err(|_| Error::parse(path, format!("invalid value '{text}' for field {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_frame(dir: &Path, name: &str, xml: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, xml).unwrap();
        path
    }

    fn frame_xml(x_pixels: usize, y_pixels: usize, blob: &str, h: f64, k: f64, l: f64) -> String {
        format!(
            "<SPICErack>\n\
             <Header>\n\
             <Number_of_X_Pixels>{x_pixels}</Number_of_X_Pixels>\n\
             <Number_of_Y_Pixels>{y_pixels}</Number_of_Y_Pixels>\n\
             </Header>\n\
             <Motor_Positions>\n\
             <_h>{h}</_h>\n\
             <_k>{k}</_k>\n\
             <_l>{l}</_l>\n\
             </Motor_Positions>\n\
             <Data>\n\
             <Detector>{blob}</Detector>\n\
             </Data>\n\
             </SPICErack>\n"
        )
    }

    #[test]
    fn test_roundtrip_with_transpose() {
        let dir = tempfile::tempdir().unwrap();
        let blob = "1\t2\t3\n4\t5\t6\n7\t8\t9\n10\t11\t12";
        let path = write_frame(dir.path(), "frame.xml", &frame_xml(4, 3, blob, 1.02, -0.98, 2.49));

        let (image, metadata) = load_scan_image(&path).unwrap();
        // blob rows become image columns
        assert_eq!(image.dim(), (3, 4));
        assert_eq!(image.counts()[[0, 0]], 1);
        assert_eq!(image.counts()[[0, 1]], 4);
        assert_eq!(image.counts()[[1, 0]], 2);
        assert_eq!(image.counts()[[2, 3]], 12);

        assert_eq!(metadata.hkl, HklIndex::new(1, -1, 2));
        assert!(metadata.rejection.is_none());
    }

    #[test]
    fn test_missing_dimension_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let xml = "<SPICErack><Header></Header>\
                   <Data><Detector>1 2</Detector></Data></SPICErack>";
        let path = write_frame(dir.path(), "bad.xml", xml);
        let err = load_scan_image(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("Number_of_X_Pixels"));
    }

    #[test]
    fn test_blob_length_mismatch_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_frame(
            dir.path(),
            "short.xml",
            &frame_xml(2, 2, "1\t2\t3", 0.0, 0.0, 1.0),
        );
        let err = load_scan_image(&path).unwrap_err();
        assert!(err.to_string().contains("expected 2 x 2"));
    }

    #[test]
    fn test_non_numeric_count_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_frame(
            dir.path(),
            "junk.xml",
            &frame_xml(2, 1, "1\tx", 0.0, 0.0, 1.0),
        );
        let err = load_scan_image(&path).unwrap_err();
        assert!(err.to_string().contains("invalid detector count"));
    }
}
