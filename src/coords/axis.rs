//! Linear pixel → physical mapping for one header axis.
//!
//! Convention: pixels are zero-based, `CRPIX` is one-based (FITS), so
//!
//! ```text
//! value(k) = CRVAL + (k - (CRPIX - 1)) * CDELT
//! ```
//!
//! The same convention is used by the array and scalar conversions.

use serde::Serialize;

use crate::domain::SpectralHeader;
use crate::error::{Result, SpectrumError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisModel {
    pub index: usize,
    pub length: usize,
    pub crval: f64,
    pub crpix: f64,
    pub cdelt: f64,
    pub ctype: Option<String>,
}

impl AxisModel {
    /// Read `NAXISi`, `CRVALi`, `CRPIXi`, `CDELTi` (and `CTYPEi` if present).
    ///
    /// `index` must lie in `1..=NAXIS`.
    pub fn from_header(header: &SpectralHeader, index: usize) -> Result<Self> {
        let naxis = header.count("NAXIS")?;
        if index == 0 || index > naxis {
            return Err(SpectrumError::IndexOutOfRange { index, max: naxis });
        }

        let cdelt = header.number(&format!("CDELT{index}"))?;
        if cdelt == 0.0 {
            return Err(SpectrumError::InvalidKeyword {
                key: format!("CDELT{index}"),
                reason: "increment must be non-zero".to_string(),
            });
        }

        Ok(Self {
            index,
            length: header.count(&format!("NAXIS{index}"))?,
            crval: header.number(&format!("CRVAL{index}"))?,
            crpix: header.number(&format!("CRPIX{index}"))?,
            cdelt,
            ctype: header.text(&format!("CTYPE{index}")).map(str::to_string),
        })
    }

    /// Physical value at a (possibly fractional) zero-based pixel.
    pub fn value_at(&self, pixel: f64) -> f64 {
        self.crval + (pixel - (self.crpix - 1.0)) * self.cdelt
    }

    /// Zero-based pixel of a physical value; inverse of [`AxisModel::value_at`].
    pub fn pixel_of(&self, value: f64) -> f64 {
        (value - self.crval) / self.cdelt + (self.crpix - 1.0)
    }

    /// Physical value of every pixel along the axis.
    pub fn coordinates(&self) -> Vec<f64> {
        (0..self.length).map(|k| self.value_at(k as f64)).collect()
    }
}

/// Physical coordinates of axis `index` (1-based).
pub fn coordinates(header: &SpectralHeader, index: usize) -> Result<Vec<f64>> {
    Ok(AxisModel::from_header(header, index)?.coordinates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::hi_header;

    #[test]
    fn follows_one_based_crpix() {
        let header = hi_header();
        let coords = coordinates(&header, 1).unwrap();
        assert_eq!(coords.len(), 100);
        assert_eq!(coords[0], 1_419_951_000.0);
        assert_eq!(coords[49], 1.42e9);
        for (k, v) in coords.iter().enumerate() {
            let expected = 1.42e9 + (k as f64 - 49.0) * 1000.0;
            assert!((v - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn pixel_of_inverts_value_at() {
        let axis = AxisModel::from_header(&hi_header(), 1).unwrap();
        for k in [0.0, 12.5, 49.0, 99.0] {
            assert!((axis.pixel_of(axis.value_at(k)) - k).abs() < 1e-9);
        }
    }

    fn cube_header() -> SpectralHeader {
        [
            ("NAXIS", 3.0),
            ("NAXIS1", 4.0),
            ("CRVAL1", 1.42e9),
            ("CRPIX1", 1.0),
            ("CDELT1", 1000.0),
            ("NAXIS2", 5.0),
            ("CRVAL2", 10.0),
            ("CRPIX2", 3.0),
            ("CDELT2", -0.5),
            ("NAXIS3", 2.0),
            ("CRVAL3", 0.0),
            ("CRPIX3", 1.0),
            ("CDELT3", 2.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn reads_each_axis_of_a_cube() {
        let header = cube_header();

        let second = coordinates(&header, 2).unwrap();
        assert_eq!(second, vec![11.0, 10.5, 10.0, 9.5, 9.0]);
        let third = coordinates(&header, 3).unwrap();
        assert_eq!(third, vec![0.0, 2.0]);
        assert_eq!(coordinates(&header, 1).unwrap()[3], 1.420_003e9);

        let axis = AxisModel::from_header(&header, 2).unwrap();
        assert_eq!(axis.index, 2);
        assert_eq!(axis.ctype, None);
        assert_eq!(axis.pixel_of(10.0), 2.0);

        assert!(matches!(
            coordinates(&header, 4),
            Err(SpectrumError::IndexOutOfRange { index: 4, max: 3 })
        ));
    }

    #[test]
    fn rejects_index_beyond_dimension() {
        let header = hi_header();
        match coordinates(&header, 2) {
            Err(SpectrumError::IndexOutOfRange { index, max }) => {
                assert_eq!(index, 2);
                assert_eq!(max, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            coordinates(&header, 0),
            Err(SpectrumError::IndexOutOfRange { index: 0, .. })
        ));
    }
}
