//! Parallel encoding of independent buffers on the rayon pool.
//!
//! Each buffer is encoded to completion by one worker. Buffers own disjoint
//! memory, so no locking is involved, and a failed image does not stop the
//! others.

use crate::buffer::{EncodeOptions, ImageBuffer};
use crate::error::Result;
use crate::protocol::{Engine, NativeEngine};
use rayon::prelude::*;

/// Encode every buffer with the built-in engine.
///
/// Results are in input order.
pub fn encode_all(buffers: &mut [ImageBuffer], options: EncodeOptions) -> Vec<Result<usize>> {
    encode_all_with(&NativeEngine::builtin(), buffers, options)
}

/// Encode every buffer with `engine`.
pub fn encode_all_with<E: Engine + ?Sized>(
    engine: &E,
    buffers: &mut [ImageBuffer],
    options: EncodeOptions,
) -> Vec<Result<usize>> {
    log::debug!("encoding {} buffers in parallel", buffers.len());
    buffers
        .par_iter_mut()
        .map(|buffer| buffer.encode_with(engine, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorFormat;
    use crate::error::Error;

    fn gradient(width: u32, height: u32, shift: u8) -> ImageBuffer {
        let mut buffer = ImageBuffer::new(width, height, ColorFormat::Rgb8).unwrap();
        let row = width as usize * 3;
        for (i, b) in buffer.raw_mut().iter_mut().enumerate() {
            *b = ((i % row) as u8).wrapping_add(shift);
        }
        buffer
    }

    #[test]
    fn test_batch_matches_sequential() {
        let mut batch: Vec<_> = (0..6).map(|i| gradient(64, 32, i * 40)).collect();
        let mut sequential = batch.clone();

        let results = encode_all(&mut batch, EncodeOptions::png());
        for ((result, parallel), single) in results.iter().zip(&batch).zip(&mut sequential) {
            let len = *result.as_ref().unwrap();
            let expected = single.encode(EncodeOptions::png()).unwrap();
            assert_eq!(len, expected);
            assert_eq!(
                parallel.extract_encoded(len).unwrap(),
                single.extract_encoded(expected).unwrap()
            );
        }
    }

    #[test]
    fn test_failures_are_per_buffer() {
        let mut batch = vec![
            gradient(32, 32, 0),
            ImageBuffer::from_raw(vec![0u8; 10], 32, 32, ColorFormat::Rgb8).unwrap(),
            gradient(32, 32, 7),
        ];
        let results = encode_all(&mut batch, EncodeOptions::jpeg(80));
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::EncodingFailed(_))));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_empty_batch() {
        assert!(encode_all(&mut [], EncodeOptions::default()).is_empty());
    }
}
