//! Chunked gzip transforms.
//!
//! Input is fed through the codec in fixed-size chunks and the output chunks
//! are concatenated into one buffer, so large sources never need a second
//! full-size copy inside the codec.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Size of the chunks fed into and read out of the codec.
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Gzip-compress `input`.
pub fn compress(input: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for chunk in input.chunks(CHUNK_SIZE) {
        encoder.write_all(chunk)?;
    }
    encoder.finish()
}

/// Inflate a gzip stream.
pub fn decompress(input: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(input);
    let mut output = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let read = decoder.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        output.extend_from_slice(&chunk[..read]);
    }
    Ok(output)
}
