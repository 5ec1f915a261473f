//! Live reading over a stream of frames.
//!
//! [`LiveReader`] is a lazy iterator: every `next()` pulls one frame from the
//! source and decodes it. Stopping takes effect before the next frame is
//! pulled; a decode in progress always runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use meter_dials_core::OwnedFrame;

use crate::backend::VisionBackend;
use crate::calibration::Calibration;
use crate::decoder::DialDecoder;
use crate::result::ReadingResult;
use crate::DecodeError;

/// Cloneable handle that stops a [`LiveReader`] from another thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct LiveReader<'d, B, I> {
    decoder: &'d DialDecoder<B>,
    calibration: Option<&'d Calibration>,
    frames: I,
    stop: StopHandle,
}

impl<'d, B, I> LiveReader<'d, B, I>
where
    B: VisionBackend,
    I: Iterator<Item = OwnedFrame>,
{
    pub fn new(
        decoder: &'d DialDecoder<B>,
        calibration: Option<&'d Calibration>,
        frames: impl IntoIterator<Item = OwnedFrame, IntoIter = I>,
    ) -> Self {
        Self {
            decoder,
            calibration,
            frames: frames.into_iter(),
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Clear a previous stop so iteration continues with the next frame.
    pub fn resume(&mut self) {
        self.stop.reset();
    }
}

impl<B, I> Iterator for LiveReader<'_, B, I>
where
    B: VisionBackend,
    I: Iterator<Item = OwnedFrame>,
{
    type Item = Result<ReadingResult, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_stopped() {
            return None;
        }
        let frame = self.frames.next()?;
        Some(self.decoder.decode_frame(&frame.view(), self.calibration))
    }
}
