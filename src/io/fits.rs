//! Minimal FITS primary-HDU reader/writer.
//!
//! Only what a single-dish spectrum needs:
//!
//! - 2880-byte blocks of 80-character header cards, terminated by `END`
//! - numeric image data, big-endian, `BITPIX` 8/16/32/64/-32/-64
//! - `BSCALE` / `BZERO` applied on read
//!
//! Extensions after the primary HDU are ignored. The writer emits `BITPIX = -64`.

use std::fs;
use std::path::Path;

use crate::domain::{HeaderValue, SpectralHeader};
use crate::error::{Result, SpectrumError};

const BLOCK: usize = 2880;
const CARD: usize = 80;
const MAX_AXES: usize = 999;

/// Primary HDU contents.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsImage {
    pub header: SpectralHeader,
    /// Data flattened with `NAXIS1` varying fastest.
    pub data: Vec<f64>,
    /// `[NAXIS1, NAXIS2, ...]`
    pub shape: Vec<usize>,
}

pub fn read_fits(path: &Path) -> Result<FitsImage> {
    let bytes = fs::read(path).map_err(|e| SpectrumError::io(path, e))?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    read_fits_bytes(&bytes)
}

pub fn read_fits_bytes(bytes: &[u8]) -> Result<FitsImage> {
    let (header, data_offset) = parse_header(bytes)?;

    let bitpix = header.number("BITPIX")? as i64;
    let naxis = header.count("NAXIS")?;
    if naxis > MAX_AXES {
        return Err(SpectrumError::Fits(format!("NAXIS {naxis} exceeds {MAX_AXES}")));
    }
    let shape = (1..=naxis)
        .map(|i| header.count(&format!("NAXIS{i}")))
        .collect::<Result<Vec<_>>>()?;

    let width = match bitpix {
        8 => 1,
        16 => 2,
        32 | -32 => 4,
        64 | -64 => 8,
        other => return Err(SpectrumError::Fits(format!("unsupported BITPIX {other}"))),
    };
    let count = if naxis == 0 { Some(0) } else { element_count(&shape) };
    let Some(end) = count
        .and_then(|n| n.checked_mul(width))
        .and_then(|len| len.checked_add(data_offset))
    else {
        return Err(SpectrumError::Fits(format!("data size of shape {shape:?} overflows")));
    };
    if bytes.len() < end {
        return Err(SpectrumError::Fits(format!(
            "data section truncated: need {} bytes, file has {}",
            end,
            bytes.len()
        )));
    }

    let bscale = header.get("BSCALE").and_then(HeaderValue::as_f64).unwrap_or(1.0);
    let bzero = header.get("BZERO").and_then(HeaderValue::as_f64).unwrap_or(0.0);

    let raw = &bytes[data_offset..end];
    let data = raw
        .chunks_exact(width)
        .map(|c| decode(bitpix, c) * bscale + bzero)
        .collect();

    Ok(FitsImage {
        header,
        data,
        shape,
    })
}

/// Serialize a primary HDU with `f64` data.
///
/// `NAXIS`/`NAXISn` are taken from `shape`; other header entries are copied.
pub fn write_fits_bytes(header: &SpectralHeader, data: &[f64], shape: &[usize]) -> Result<Vec<u8>> {
    let expected = element_count(shape)
        .ok_or_else(|| SpectrumError::Fits(format!("data size of shape {shape:?} overflows")))?;
    if expected != data.len() {
        return Err(SpectrumError::ShapeMismatch {
            what: "FITS data",
            expected,
            actual: data.len(),
        });
    }

    let mut out = Vec::with_capacity(BLOCK * 2 + data.len() * 8);
    push_card(&mut out, "SIMPLE", &HeaderValue::Logical(true));
    push_card(&mut out, "BITPIX", &HeaderValue::Number(-64.0));
    push_card(&mut out, "NAXIS", &HeaderValue::Number(shape.len() as f64));
    for (i, n) in shape.iter().enumerate() {
        push_card(&mut out, &format!("NAXIS{}", i + 1), &HeaderValue::Number(*n as f64));
    }
    for (key, value) in header.iter() {
        if is_structural(key) {
            continue;
        }
        push_card(&mut out, key, value);
    }
    out.extend(format!("{:<80}", "END").bytes());
    pad(&mut out, b' ');

    for v in data {
        out.extend(v.to_be_bytes());
    }
    pad(&mut out, 0);
    Ok(out)
}

pub fn write_fits(path: &Path, header: &SpectralHeader, data: &[f64], shape: &[usize]) -> Result<()> {
    let bytes = write_fits_bytes(header, data, shape)?;
    fs::write(path, bytes).map_err(|e| SpectrumError::io(path, e))
}

fn parse_header(bytes: &[u8]) -> Result<(SpectralHeader, usize)> {
    let mut entries: Vec<(String, HeaderValue)> = Vec::new();
    let mut offset = 0;

    loop {
        let Some(card) = bytes.get(offset..offset + CARD) else {
            return Err(SpectrumError::Fits("header has no END card".to_string()));
        };
        offset += CARD;
        let card = String::from_utf8_lossy(card);

        if offset == CARD && !card.starts_with("SIMPLE") {
            return Err(SpectrumError::Fits("not a FITS file (missing SIMPLE card)".to_string()));
        }

        let keyword = card.get(..8).unwrap_or_default().trim_end();
        if keyword == "END" {
            break;
        }
        if keyword.is_empty() || card.get(8..10) != Some("= ") {
            // COMMENT, HISTORY, blank and CONTINUE cards carry no value.
            continue;
        }
        if let Some(value) = card.get(10..).and_then(parse_value) {
            entries.push((keyword.to_string(), value));
        }
    }

    let data_offset = offset.div_ceil(BLOCK) * BLOCK;
    Ok((entries.into_iter().collect(), data_offset))
}

fn parse_value(field: &str) -> Option<HeaderValue> {
    let field = field.trim_start();

    if let Some(rest) = field.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote.
        let mut value = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    value.push('\'');
                } else {
                    return Some(HeaderValue::Text(value.trim_end().to_string()));
                }
            } else {
                value.push(c);
            }
        }
        return Some(HeaderValue::Text(value.trim_end().to_string()));
    }

    let token = field.split('/').next().unwrap_or("").trim();
    match token {
        "" => None,
        "T" => Some(HeaderValue::Logical(true)),
        "F" => Some(HeaderValue::Logical(false)),
        _ => token
            .replace(['D', 'd'], "E")
            .parse::<f64>()
            .ok()
            .map(HeaderValue::Number)
            .or_else(|| Some(HeaderValue::Text(token.to_string()))),
    }
}

fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

fn decode(bitpix: i64, c: &[u8]) -> f64 {
    match bitpix {
        8 => c[0] as f64,
        16 => i16::from_be_bytes([c[0], c[1]]) as f64,
        32 => i32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64,
        64 => i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f64,
        -32 => f32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64,
        _ => f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]),
    }
}

fn is_structural(key: &str) -> bool {
    matches!(key, "SIMPLE" | "BITPIX" | "NAXIS" | "END" | "BSCALE" | "BZERO" | "EXTEND")
        || key
            .strip_prefix("NAXIS")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

fn push_card(out: &mut Vec<u8>, key: &str, value: &HeaderValue) {
    let rendered = match value {
        HeaderValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        HeaderValue::Number(v) => format!("{:>20}", format_number(*v)),
        HeaderValue::Text(s) => format!("'{:<8}'", s.replace('\'', "''")),
    };
    let mut card = format!("{:<8}= {}", key, rendered);
    card.truncate(CARD);
    out.extend(format!("{card:<80}").bytes());
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:E}")
    }
}

fn pad(out: &mut Vec<u8>, byte: u8) {
    let rem = out.len() % BLOCK;
    if rem != 0 {
        out.resize(out.len() + BLOCK - rem, byte);
    }
}
