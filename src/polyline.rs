//! Decoder for Google's encoded polyline format.
//!
//! Directions responses carry route geometry as compact ASCII strings: pairs
//! of variable-length signed integers (delta latitude, delta longitude) at
//! 1e-5 degree precision. Decoding happens here at the boundary; the rest of
//! the crate works with decoded coordinate sequences only. Encoding is never
//! needed and is not provided.
//!
//! Malformed input is an error, not a partial result: a truncated varint, a
//! byte outside the encoding alphabet, or an overflowing varint all return
//! `Err` so callers never see silently shortened routes.

use thiserror::Error;

use crate::geo::GeoPoint;

/// Coordinates are encoded as `round(degrees * 1e5)` integers.
const PRECISION: f64 = 1e5;

/// Decode failure. Byte offsets refer to the input string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("polyline truncated mid-varint at byte {0}")]
    Truncated(usize),

    #[error("byte {value:#04x} at offset {offset} is outside the polyline alphabet")]
    InvalidByte { value: u8, offset: usize },

    #[error("varint too long at byte {0}")]
    Overflow(usize),
}

/// Decode an encoded polyline into an ordered sequence of points.
///
/// An empty string decodes to an empty sequence.
pub fn decode(encoded: &str) -> Result<Vec<GeoPoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while offset < bytes.len() {
        let (delta_lat, next) = read_varint(bytes, offset)?;
        lat += delta_lat;

        let (delta_lng, next) = read_varint(bytes, next)?;
        lng += delta_lng;

        offset = next;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Read one signed varint: 5-bit groups, least significant first, bit 0x20
/// (after subtracting 63) signals continuation.
fn read_varint(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), PolylineError> {
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let Some(&raw) = bytes.get(offset) else {
            return Err(PolylineError::Truncated(offset));
        };
        if raw < 63 {
            return Err(PolylineError::InvalidByte {
                value: raw,
                offset,
            });
        }
        // Well-formed coordinates fit in 7 groups; anything longer is garbage.
        if shift >= 35 {
            return Err(PolylineError::Overflow(offset));
        }

        let group = u64::from(raw - 63);
        result |= (group & 0x1f) << shift;
        shift += 5;
        offset += 1;

        if group < 0x20 {
            break;
        }
    }

    // Lowest bit carries the sign: set means one's-complement of the rest.
    let delta = if result & 1 != 0 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };

    Ok((delta, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(point: GeoPoint, lat: f64, lng: f64) {
        assert!(
            (point.latitude - lat).abs() < 1e-5,
            "latitude {} != {}",
            point.latitude,
            lat
        );
        assert!(
            (point.longitude - lng).abs() < 1e-5,
            "longitude {} != {}",
            point.longitude,
            lng
        );
    }

    #[test]
    fn test_single_point_reference_vector() {
        let points = decode("_p~iF~ps|U").expect("valid polyline");
        assert_eq!(points.len(), 1);
        assert_close(points[0], 38.5, -120.2);
    }

    #[test]
    fn test_multi_point_reference_vector() {
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").expect("valid polyline");
        assert_eq!(points.len(), 3);
        assert_close(points[0], 38.5, -120.2);
        assert_close(points[1], 40.7, -120.95);
        assert_close(points[2], 43.252, -126.453);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode(""), Ok(Vec::new()));
    }

    #[test]
    fn test_truncated_mid_varint() {
        // Drop the last byte so the final longitude varint never terminates.
        let err = decode("_p~iF~ps|").unwrap_err();
        assert_eq!(err, PolylineError::Truncated(9));
    }

    #[test]
    fn test_missing_longitude() {
        // A lone latitude varint with no paired longitude.
        let err = decode("_p~iF").unwrap_err();
        assert_eq!(err, PolylineError::Truncated(5));
    }

    #[test]
    fn test_byte_below_alphabet() {
        let err = decode("_p~iF ~ps|U").unwrap_err();
        assert!(matches!(err, PolylineError::InvalidByte { value: b' ', .. }));
    }

    #[test]
    fn test_runaway_varint_overflows() {
        // Every byte has the continuation bit set.
        let err = decode("~~~~~~~~~~").unwrap_err();
        assert!(matches!(err, PolylineError::Overflow(_)));
    }

    #[test]
    fn test_negative_deltas_accumulate() {
        // Second point is south-west of the first; deltas are negative.
        let points = decode("_p~iF~ps|U~ps|F~ps|F").expect("valid polyline");
        assert_eq!(points.len(), 2);
        assert!(points[1].latitude < points[0].latitude);
        assert!(points[1].longitude < points[0].longitude);
    }
}
