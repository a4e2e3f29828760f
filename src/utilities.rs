//! Internal utility functions.
//!
//! Pixel-buffer copying and frame file naming shared by the stages.

use ffmpeg_next::frame::Video as VideoFrame;

/// Suffix shared by every extracted frame file.
pub(crate) const FRAME_FILE_SUFFIX: &str = "_frame.png";

/// File name for the `index`-th written frame: `0_frame.png`, `1_frame.png`, …
pub(crate) fn frame_file_name(index: u64) -> String {
    format!("{index}{FRAME_FILE_SUFFIX}")
}

/// Copy pixel data from an FFmpeg frame into a tightly-packed buffer.
///
/// FFmpeg rows often carry padding (stride > width × bytes per pixel); the
/// padding is stripped so the result fits [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        data.chunks(stride)
            .take(height as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::frame_file_name;

    #[test]
    fn frame_names_are_zero_based() {
        assert_eq!(frame_file_name(0), "0_frame.png");
        assert_eq!(frame_file_name(29), "29_frame.png");
    }
}
