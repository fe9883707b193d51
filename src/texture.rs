use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

const BMP_HEADER_SIZE: usize = 54;

/// Decoded image ready for GPU upload: tightly packed RGBA, top-down rows
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Generated gray/white checkerboard, the fallback when no BMP is given
    pub fn checkerboard(size: u32, cell: u32) -> Self {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let value = if (x / cell + y / cell) % 2 == 0 { 200 } else { 90 };
                rgba.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }
}

/// Load and decode a 24-bit BMP file
pub fn load_bmp(path: &Path) -> Result<TextureData> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read BMP file {}", path.display()))?;
    decode_bmp(&bytes).with_context(|| format!("failed to decode BMP file {}", path.display()))
}

/// Decode an uncompressed 24-bit BMP image.
///
/// Header fields are read at their fixed offsets: pixel-data position at
/// 0x0A, image size at 0x22, width at 0x12, height at 0x16. Some BMP files
/// are misformatted and leave the size or data position zeroed, so those
/// are reconstructed from the dimensions. Rows are stored bottom-up,
/// 4-byte aligned, in BGR order; the output is top-down tightly packed
/// RGBA as the GPU expects.
pub fn decode_bmp(bytes: &[u8]) -> Result<TextureData> {
    if bytes.len() < BMP_HEADER_SIZE {
        bail!("file is shorter than the {}-byte BMP header", BMP_HEADER_SIZE);
    }
    if &bytes[0..2] != b"BM" {
        bail!("missing BM magic, not a BMP file");
    }

    let mut data_pos = read_u32(bytes, 0x0A) as usize;
    let width = read_u32(bytes, 0x12);
    let height = read_u32(bytes, 0x16);
    let mut image_size = read_u32(bytes, 0x22) as usize;

    if width == 0 || height == 0 {
        bail!("image has zero dimension {}x{}", width, height);
    }

    // Misformatted-file tolerance
    if image_size == 0 {
        image_size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .with_context(|| format!("declared dimensions {}x{} overflow", width, height))?;
    }
    if data_pos == 0 {
        data_pos = BMP_HEADER_SIZE;
    }

    // Rows are padded to a multiple of 4 bytes; the header fields are
    // untrusted, so the size arithmetic stays checked
    let row_bytes = (width as usize)
        .checked_mul(3)
        .with_context(|| format!("row size overflows for width {}", width))?;
    let row_stride = row_bytes
        .checked_add(3)
        .with_context(|| format!("row size overflows for width {}", width))?
        & !3;
    let required = row_stride
        .checked_mul(height as usize - 1)
        .and_then(|n| n.checked_add(data_pos))
        .and_then(|n| n.checked_add(row_bytes))
        .with_context(|| format!("pixel data size overflows for {}x{}", width, height))?;
    if bytes.len() < required {
        bail!(
            "pixel data truncated: need {} bytes, file has {} (declared size {})",
            required,
            bytes.len(),
            image_size
        );
    }

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    // BMP rows run bottom-up; emit them top-down
    for row in (0..height as usize).rev() {
        let start = data_pos + row * row_stride;
        for pixel in bytes[start..start + row_bytes].chunks_exact(3) {
            rgba.extend_from_slice(&[pixel[2], pixel[1], pixel[0], 255]);
        }
    }

    Ok(TextureData {
        width,
        height,
        rgba,
    })
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal 24-bit BMP in memory. `rows` are top-down RGB; the
    /// size and data-offset header fields can be zeroed to exercise the
    /// misformatted-file tolerance.
    fn make_bmp(
        width: u32,
        height: u32,
        rows: &[&[[u8; 3]]],
        declare_size: bool,
        declare_offset: bool,
    ) -> Vec<u8> {
        let row_stride = ((width as usize * 3) + 3) & !3;
        let image_size = row_stride * height as usize;

        let mut bytes = vec![0u8; BMP_HEADER_SIZE];
        bytes[0] = b'B';
        bytes[1] = b'M';
        if declare_offset {
            bytes[0x0A..0x0E].copy_from_slice(&(BMP_HEADER_SIZE as u32).to_le_bytes());
        }
        bytes[0x12..0x16].copy_from_slice(&width.to_le_bytes());
        bytes[0x16..0x1A].copy_from_slice(&height.to_le_bytes());
        if declare_size {
            bytes[0x22..0x26].copy_from_slice(&(image_size as u32).to_le_bytes());
        }

        // Write bottom-up, BGR, with row padding
        for row in rows.iter().rev() {
            let mut written = 0;
            for [r, g, b] in row.iter() {
                bytes.extend_from_slice(&[*b, *g, *r]);
                written += 3;
            }
            bytes.extend(std::iter::repeat(0u8).take(row_stride - written));
        }
        bytes
    }

    #[test]
    fn decodes_2x2_pixels_in_top_down_rgba() {
        let red = [255, 0, 0];
        let green = [0, 255, 0];
        let blue = [0, 0, 255];
        let white = [255, 255, 255];
        let bmp = make_bmp(2, 2, &[&[red, green], &[blue, white]], true, true);

        let decoded = decode_bmp(&bmp).unwrap();
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.height, 2);
        assert_eq!(
            decoded.rgba,
            vec![
                255, 0, 0, 255, // red
                0, 255, 0, 255, // green
                0, 0, 255, 255, // blue
                255, 255, 255, 255, // white
            ]
        );
    }

    #[test]
    fn tolerates_zero_image_size_field() {
        let bmp = make_bmp(1, 1, &[&[[10, 20, 30]]], false, true);
        let decoded = decode_bmp(&bmp).unwrap();
        assert_eq!(decoded.rgba, vec![10, 20, 30, 255]);
    }

    #[test]
    fn tolerates_zero_data_offset_field() {
        let bmp = make_bmp(1, 1, &[&[[40, 50, 60]]], true, false);
        let decoded = decode_bmp(&bmp).unwrap();
        assert_eq!(decoded.rgba, vec![40, 50, 60, 255]);
    }

    #[test]
    fn rejects_header_with_overflowing_dimensions() {
        // Dimensions whose product does not fit the size arithmetic must
        // come back as an error, not abort before the fallback can engage
        let mut bytes = vec![0u8; BMP_HEADER_SIZE];
        bytes[0] = b'B';
        bytes[1] = b'M';
        bytes[0x0A..0x0E].copy_from_slice(&(BMP_HEADER_SIZE as u32).to_le_bytes());
        bytes[0x12..0x16].copy_from_slice(&0x4000_0000_u32.to_le_bytes());
        bytes[0x16..0x1A].copy_from_slice(&4_u32.to_le_bytes());

        assert!(decode_bmp(&bytes).is_err());

        bytes[0x12..0x16].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[0x16..0x1A].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode_bmp(&bytes).is_err());
    }

    #[test]
    fn handles_row_padding_for_odd_widths() {
        let px = [1, 2, 3];
        let bmp = make_bmp(3, 1, &[&[px, px, px]], true, true);
        let decoded = decode_bmp(&bmp).unwrap();
        assert_eq!(decoded.rgba.len(), 3 * 4);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bmp = make_bmp(1, 1, &[&[[0, 0, 0]]], true, true);
        bmp[0] = b'X';
        assert!(decode_bmp(&bmp).is_err());
    }

    #[test]
    fn rejects_short_file() {
        assert!(decode_bmp(b"BM").is_err());
    }

    #[test]
    fn rejects_truncated_pixel_data() {
        let row = [[0u8, 0, 0], [0, 0, 0]];
        let mut bmp = make_bmp(2, 2, &[&row, &row], true, true);
        bmp.truncate(BMP_HEADER_SIZE + 4);
        assert!(decode_bmp(&bmp).is_err());
    }

    #[test]
    fn checkerboard_is_opaque_rgba() {
        let tex = TextureData::checkerboard(8, 2);
        assert_eq!(tex.rgba.len(), 8 * 8 * 4);
        assert!(tex.rgba.chunks_exact(4).all(|p| p[3] == 255));
    }
}
