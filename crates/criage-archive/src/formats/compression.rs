//! Compression codecs behind the tar-based formats.
//!
//! Gzip, XZ and LZ4 streams are cheap to set up and are built per operation.
//! Zstandard contexts are expensive, so [`CodecPool`] owns one compression
//! context and one decompression context for its whole lifetime and lends
//! them to one streaming session at a time.
//!
//! # Level Mapping
//!
//! Callers use a 1-9 scale. Gzip, XZ and ZIP deflate take it as is; zstd
//! maps it onto its wider range; LZ4 frames have no levels.

use std::fmt;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;

use log::trace;
use zstd::zstd_safe;
use zstd::zstd_safe::CCtx;
use zstd::zstd_safe::CParameter;
use zstd::zstd_safe::DCtx;
use zstd::zstd_safe::ResetDirective;

use super::registry::Codec;
use crate::ArchiveError;
use crate::Result;

/// Converts a 1-9 level to a flate2 compression level.
#[must_use]
pub fn level_to_flate2(level: u8) -> flate2::Compression {
    flate2::Compression::new(u32::from(level.clamp(1, 9)))
}

/// Converts a 1-9 level to an XZ preset.
#[must_use]
pub fn level_to_xz(level: u8) -> u32 {
    u32::from(level.clamp(1, 9))
}

/// Converts a 1-9 level to a zstd level.
///
/// # Examples
///
/// ```
/// use criage_archive::formats::compression::level_to_zstd;
///
/// assert_eq!(level_to_zstd(1), 1);
/// assert_eq!(level_to_zstd(5), 3);
/// assert_eq!(level_to_zstd(9), 19);
/// ```
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn level_to_zstd(level: u8) -> i32 {
    match level {
        0 | 1 => 1,
        2 => 2,
        3..=5 => 3,
        6 => 6,
        7 => 10,
        8 => 15,
        _ => 19,
    }
}

/// Converts a 1-9 level to a ZIP deflate level.
#[must_use]
pub fn level_to_deflate(level: u8) -> i64 {
    i64::from(level.clamp(1, 9))
}

enum StreamEncoder<'a, W: Write> {
    Zstd(zstd::stream::write::Encoder<'a, W>),
    Lz4(lz4_flex::frame::FrameEncoder<W>),
    Xz(xz2::write::XzEncoder<W>),
    Gzip(flate2::write::GzEncoder<W>),
}

impl<W: Write> StreamEncoder<'_, W> {
    fn finish(self) -> io::Result<W> {
        match self {
            Self::Zstd(encoder) => encoder.finish(),
            Self::Lz4(encoder) => encoder.finish().map_err(io::Error::other),
            Self::Xz(encoder) => encoder.finish(),
            Self::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for StreamEncoder<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Zstd(encoder) => encoder.write(buf),
            Self::Lz4(encoder) => encoder.write(buf),
            Self::Xz(encoder) => encoder.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Zstd(encoder) => encoder.flush(),
            Self::Lz4(encoder) => encoder.flush(),
            Self::Xz(encoder) => encoder.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Owner of the long-lived zstd contexts.
///
/// Each context sits behind its own mutex. A `tar.zst` session holds the
/// relevant lock from the first byte to the frame trailer, so concurrent
/// zstd operations on one pool are serialized while the other codecs run
/// without locking.
pub struct CodecPool {
    compressor: Mutex<CCtx<'static>>,
    decompressor: Mutex<DCtx<'static>>,
}

impl fmt::Debug for CodecPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecPool").finish_non_exhaustive()
    }
}

fn zstd_error(code: zstd_safe::ErrorCode) -> io::Error {
    io::Error::other(zstd_safe::get_error_name(code))
}

fn start_session(cctx: &mut CCtx<'static>, level: i32) -> zstd_safe::SafeResult {
    cctx.reset(ResetDirective::SessionOnly)?;
    cctx.set_parameter(CParameter::CompressionLevel(level))?;
    cctx.set_parameter(CParameter::ChecksumFlag(true))
}

impl CodecPool {
    /// Allocates the zstd contexts.
    pub fn new() -> Result<Self> {
        let compressor = CCtx::try_create()
            .ok_or_else(|| io::Error::other("cannot allocate zstd compression context"))?;
        let decompressor = DCtx::try_create()
            .ok_or_else(|| io::Error::other("cannot allocate zstd decompression context"))?;
        Ok(Self {
            compressor: Mutex::new(compressor),
            decompressor: Mutex::new(decompressor),
        })
    }

    /// Streams `body`'s output through `codec` into `writer`, then writes
    /// the stream trailer and hands the writer back.
    ///
    /// `output` is only used to label write failures.
    pub fn encode<W, T, F>(
        &self,
        codec: Codec,
        level: u8,
        output: &Path,
        writer: W,
        body: F,
    ) -> Result<(T, W)>
    where
        W: Write,
        F: FnOnce(&mut dyn Write) -> Result<T>,
    {
        let write_failure = |e: io::Error| ArchiveError::write_failure(output, e);

        if codec == Codec::Zstd {
            let mut cctx = self
                .compressor
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let zstd_level = level_to_zstd(level);
            start_session(&mut cctx, zstd_level)
                .map_err(|code| write_failure(zstd_error(code)))?;
            trace!("zstd session started at level {zstd_level}");

            let mut encoder =
                StreamEncoder::Zstd(zstd::stream::write::Encoder::with_context(writer, &mut *cctx));
            let value = body(&mut encoder)?;
            let writer = encoder.finish().map_err(write_failure)?;
            return Ok((value, writer));
        }

        let mut encoder = match codec {
            Codec::Lz4 => StreamEncoder::Lz4(lz4_flex::frame::FrameEncoder::new(writer)),
            Codec::Xz => StreamEncoder::Xz(xz2::write::XzEncoder::new(writer, level_to_xz(level))),
            Codec::Gzip => StreamEncoder::Gzip(flate2::write::GzEncoder::new(
                writer,
                level_to_flate2(level),
            )),
            Codec::Zstd | Codec::Deflate => return Err(not_a_stream(codec)),
        };
        let value = body(&mut encoder)?;
        let writer = encoder.finish().map_err(write_failure)?;
        Ok((value, writer))
    }

    /// Runs `body` over the decompressed view of `reader`.
    pub fn decode<R, T, F>(&self, codec: Codec, reader: R, body: F) -> Result<T>
    where
        R: Read,
        F: FnOnce(&mut dyn Read) -> Result<T>,
    {
        match codec {
            Codec::Zstd => {
                let mut dctx = self
                    .decompressor
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                dctx.reset(ResetDirective::SessionOnly)
                    .map_err(|code| ArchiveError::Io(zstd_error(code)))?;
                let mut decoder =
                    zstd::stream::read::Decoder::with_context(BufReader::new(reader), &mut *dctx);
                body(&mut decoder)
            }
            Codec::Lz4 => body(&mut lz4_flex::frame::FrameDecoder::new(reader)),
            Codec::Xz => body(&mut xz2::read::XzDecoder::new(reader)),
            Codec::Gzip => body(&mut flate2::read::GzDecoder::new(reader)),
            Codec::Deflate => Err(not_a_stream(codec)),
        }
    }
}

fn not_a_stream(codec: Codec) -> ArchiveError {
    ArchiveError::UnsupportedFormat {
        format: format!("{codec:?} is not a tar stream codec"),
    }
}
