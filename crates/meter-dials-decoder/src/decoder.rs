use meter_dials_core::{sort_left_to_right, DialRecord, FrameView, GrayImageView, DIAL_COUNT};

use crate::backend::VisionBackend;
use crate::calibration::Calibration;
use crate::digit::{angle_to_digit, rotation_for_index, DigitResult};
use crate::locate::locate_dials;
use crate::params::DecoderParams;
use crate::pointer::estimate_pointer;
use crate::reading::assemble_reading;
use crate::region::extract_dial_region;
use crate::result::{DialReading, DialSource, ReadingResult};
use crate::DecodeError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Five-dial register decoder.
///
/// Holds a vision backend and the decode parameters; the optional
/// calibration is passed per call and never modified.
pub struct DialDecoder<B> {
    backend: B,
    params: DecoderParams,
}

impl<B: VisionBackend> DialDecoder<B> {
    pub fn new(backend: B, params: DecoderParams) -> Self {
        Self { backend, params }
    }

    #[inline]
    pub fn params(&self) -> &DecoderParams {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut DecoderParams {
        &mut self.params
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Convert a raw frame to grayscale and decode it.
    pub fn decode_frame(
        &self,
        frame: &FrameView<'_>,
        calibration: Option<&Calibration>,
    ) -> Result<ReadingResult, DecodeError> {
        let gray = frame.to_gray()?;
        self.decode(&gray.view(), calibration)
    }

    /// Decode a grayscale frame into a five-digit reading.
    ///
    /// With a calibration the circle detector is skipped entirely. Partial
    /// results are never returned: any failing dial fails the whole frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, gray, calibration),
            fields(width = gray.width, height = gray.height, calibrated = calibration.is_some())
        )
    )]
    pub fn decode(
        &self,
        gray: &GrayImageView<'_>,
        calibration: Option<&Calibration>,
    ) -> Result<ReadingResult, DecodeError> {
        let res = self.decode_inner(gray, calibration);
        match &res {
            Ok(r) => log::debug!("decoded reading {} ({:?})", r.display(), r.source),
            Err(DecodeError::Primitive(e)) => log::warn!("vision primitive failed: {e}"),
            Err(e) => log::debug!("decode failed: {e}"),
        }
        res
    }

    fn decode_inner(
        &self,
        gray: &GrayImageView<'_>,
        calibration: Option<&Calibration>,
    ) -> Result<ReadingResult, DecodeError> {
        let enhanced = if self.params.enhance.is_noop() {
            None
        } else {
            Some(self.backend.enhance(gray, &self.params.enhance)?)
        };
        let work = enhanced.as_ref().map_or(*gray, |img| img.view());

        let (mut dials, source) = match calibration {
            Some(cal) => (*cal.dials(), DialSource::Calibration),
            None => (
                locate_dials(&self.backend, &work, &self.params.circles)?,
                DialSource::Detected,
            ),
        };
        sort_left_to_right(&mut dials);
        ensure_strictly_left_to_right(&dials)?;

        let mut raw = [DigitResult {
            digit: 0,
            frac: 0.0,
        }; DIAL_COUNT];
        let mut readings = Vec::with_capacity(DIAL_COUNT);
        for (i, dial) in dials.iter().enumerate() {
            let region = extract_dial_region(&work, dial)
                .ok_or(DecodeError::DialOutsideFrame { dial: i })?;
            let estimate = estimate_pointer(&self.backend, &region, &self.params.pointer)?
                .ok_or(DecodeError::PointerNotFound { dial: i })?;

            let clockwise = rotation_for_index(self.params.pattern, i);
            raw[i] = angle_to_digit(estimate.angle_deg, clockwise, self.params.zero_offset_deg);
            log::trace!(
                "dial {}: angle {:.1} deg, digit {} + {:.3}",
                i + 1,
                estimate.angle_deg,
                raw[i].digit,
                raw[i].frac
            );
            readings.push(DialReading {
                dial: *dial,
                clockwise,
                angle_deg: estimate.angle_deg,
                line: region.to_frame_line(&estimate.line),
                raw: raw[i],
                digit: raw[i].digit,
            });
        }

        let (reading, digits) = assemble_reading(&raw);
        for (r, &d) in readings.iter_mut().zip(digits.iter()) {
            r.digit = d;
        }

        Ok(ReadingResult {
            reading,
            digits,
            source,
            dials: readings,
        })
    }
}

fn ensure_strictly_left_to_right(sorted: &[DialRecord; DIAL_COUNT]) -> Result<(), DecodeError> {
    let distinct = 1 + sorted.windows(2).filter(|w| w[0].x < w[1].x).count();
    if distinct == DIAL_COUNT {
        Ok(())
    } else {
        Err(DecodeError::DialsNotFound { found: distinct })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PrimitiveError;
    use crate::params::DialPattern;
    use crate::test_utils::{angle_for, line_for_angle, ScriptedBackend};
    use meter_dials_core::{GrayImage, PixelFormat, PolarLine};

    // Puts the digits 1..=5 (clockwise) and 4..=8 (counter-clockwise) at
    // pointer angles a Hough line normal in [0, pi) can express.
    const OFFSET: f32 = 234.0;

    fn frame() -> GrayImage {
        GrayImage::from_raw(640, 200, vec![128; 640 * 200]).expect("image")
    }

    fn row_dials() -> [DialRecord; 5] {
        std::array::from_fn(|i| DialRecord::new(70.0 + 120.0 * i as f32, 100.0, 45.0))
    }

    fn params(pattern: DialPattern) -> DecoderParams {
        DecoderParams {
            pattern,
            zero_offset_deg: OFFSET,
            ..DecoderParams::default()
        }
    }

    fn lines_for(digits: [u8; 5], fracs: [f32; 5], pattern: DialPattern) -> Vec<Vec<PolarLine>> {
        (0..5)
            .map(|i| {
                let a = angle_for(digits[i], fracs[i], pattern.is_clockwise(i), OFFSET);
                vec![line_for_angle(a)]
            })
            .collect()
    }

    #[test]
    fn calibrated_frame_reads_all_digits() {
        let backend = ScriptedBackend::with_lines(lines_for(
            [1, 2, 3, 4, 5],
            [0.5; 5],
            DialPattern::AllClockwise,
        ));
        let decoder = DialDecoder::new(backend, params(DialPattern::AllClockwise));
        let cal = Calibration::new(row_dials()).expect("calibration");
        let img = frame();

        let res = decoder.decode(&img.view(), Some(&cal)).expect("reading");
        assert_eq!(res.reading, 12345);
        assert_eq!(res.digits, [1, 2, 3, 4, 5]);
        assert_eq!(res.source, DialSource::Calibration);
        assert_eq!(res.dials.len(), 5);
        assert!(res.dials.iter().all(|d| (d.raw.frac - 0.5).abs() < 1e-3));
    }

    #[test]
    fn calibration_order_does_not_matter() {
        let backend = ScriptedBackend::with_lines(lines_for(
            [1, 2, 3, 4, 5],
            [0.5; 5],
            DialPattern::AllClockwise,
        ));
        let decoder = DialDecoder::new(backend, params(DialPattern::AllClockwise));
        let mut dials = row_dials();
        dials.reverse();
        let cal = Calibration::new(dials).expect("calibration");
        let res = decoder.decode(&frame().view(), Some(&cal)).expect("reading");
        assert_eq!(res.dials[0].dial.x, 70.0);
        assert_eq!(res.reading, 12345);
    }

    #[test]
    fn detected_dials_with_alternating_pattern() {
        let mut circles = row_dials().to_vec();
        circles.swap(0, 3);
        circles.push(DialRecord::new(320.0, 15.0, 44.0));
        let mut backend = ScriptedBackend::with_circles(circles);
        backend.lines = lines_for([2, 7, 5, 4, 1], [0.5; 5], DialPattern::AlternatingClockwise);

        let decoder = DialDecoder::new(backend, params(DialPattern::AlternatingClockwise));
        let res = decoder.decode(&frame().view(), None).expect("reading");
        assert_eq!(res.reading, 27541);
        assert_eq!(res.source, DialSource::Detected);
        let cw: Vec<bool> = res.dials.iter().map(|d| d.clockwise).collect();
        assert_eq!(cw, vec![true, false, true, false, true]);
    }

    #[test]
    fn borrow_correction_is_applied() {
        let backend = ScriptedBackend::with_lines(lines_for(
            [1, 2, 3, 4, 5],
            [0.5, 0.5, 0.995, 0.1, 0.5],
            DialPattern::AllClockwise,
        ));
        let decoder = DialDecoder::new(backend, params(DialPattern::AllClockwise));
        let cal = Calibration::new(row_dials()).expect("calibration");
        let res = decoder.decode(&frame().view(), Some(&cal)).expect("reading");
        assert_eq!(res.reading, 12245);
        assert_eq!(res.dials[2].raw.digit, 3);
        assert_eq!(res.dials[2].digit, 2);
    }

    #[test]
    fn missing_pointer_names_the_dial() {
        let mut lines = lines_for([1, 2, 3, 4, 5], [0.5; 5], DialPattern::AllClockwise);
        lines[2].clear();
        let backend = ScriptedBackend::with_lines(lines);
        let decoder = DialDecoder::new(backend, params(DialPattern::AllClockwise));
        let cal = Calibration::new(row_dials()).expect("calibration");

        let err = decoder.decode(&frame().view(), Some(&cal)).unwrap_err();
        assert_eq!(err, DecodeError::PointerNotFound { dial: 2 });
        assert_eq!(err.to_string(), "pointer not found on dial 3");
        // dials after the failing one are not processed
        assert_eq!(decoder.backend().line_calls(), 3);
    }

    #[test]
    fn primitive_failure_surfaces_as_decode_error() {
        let backend = ScriptedBackend {
            circle_error: Some(PrimitiveError::InvalidParameter {
                name: "dp",
                value: 0.0,
            }),
            ..ScriptedBackend::default()
        };
        let decoder = DialDecoder::new(backend, DecoderParams::default());
        let err = decoder.decode(&frame().view(), None).unwrap_err();
        assert!(matches!(err, DecodeError::Primitive(_)));
    }

    #[test]
    fn too_few_circles_suggests_calibration() {
        let backend = ScriptedBackend::with_circles(row_dials()[..3].to_vec());
        let decoder = DialDecoder::new(backend, DecoderParams::default());
        let err = decoder.decode(&frame().view(), None).unwrap_err();
        assert_eq!(err, DecodeError::DialsNotFound { found: 3 });
        assert!(err.to_string().contains("manual calibration"));
    }

    #[test]
    fn calibration_outside_frame_is_reported() {
        let mut dials = row_dials();
        dials[4].x = 5000.0;
        let backend =
            ScriptedBackend::with_lines(lines_for([1; 5], [0.5; 5], DialPattern::AllClockwise));
        let decoder = DialDecoder::new(backend, params(DialPattern::AllClockwise));
        let cal = Calibration::new(dials).expect("calibration");
        let err = decoder.decode(&frame().view(), Some(&cal)).unwrap_err();
        assert_eq!(err, DecodeError::DialOutsideFrame { dial: 4 });
    }

    #[test]
    fn duplicate_dial_columns_are_rejected() {
        let mut dials = row_dials();
        dials[1].x = dials[0].x;
        let backend = ScriptedBackend::default();
        let decoder = DialDecoder::new(backend, DecoderParams::default());
        let cal = Calibration::new(dials).expect("calibration");
        let err = decoder.decode(&frame().view(), Some(&cal)).unwrap_err();
        assert_eq!(err, DecodeError::DialsNotFound { found: 4 });
    }

    #[test]
    fn decoding_twice_gives_identical_results() {
        let backend = ScriptedBackend::with_lines(lines_for(
            [5, 1, 3, 2, 4],
            [0.3; 5],
            DialPattern::AllClockwise,
        ));
        let decoder = DialDecoder::new(backend, params(DialPattern::AllClockwise));
        let cal = Calibration::new(row_dials()).expect("calibration");
        let img = frame();
        let a = decoder.decode(&img.view(), Some(&cal)).expect("first");
        let b = decoder.decode(&img.view(), Some(&cal)).expect("second");
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_frames_are_rejected_before_decoding() {
        let decoder = DialDecoder::new(ScriptedBackend::default(), DecoderParams::default());
        let data = [0u8; 10];
        let frame = FrameView {
            width: 4,
            height: 4,
            format: PixelFormat::Rgb,
            data: &data,
        };
        let err = decoder.decode_frame(&frame, None).unwrap_err();
        assert!(matches!(err, DecodeError::Frame(_)));
    }
}
