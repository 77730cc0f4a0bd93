//! Best-effort image dimension probing.
//!
//! Reads just enough of the PNG, JPEG, or GIF header to recover pixel
//! dimensions. This is the caller-side "resolve dimensions" step the file
//! validator expects: unknown or truncated payloads yield `None`, and the
//! validator then skips dimension checks until dimensions arrive.

/// Probe `data` for pixel dimensions. Never errors.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    png_dimensions(data)
        .or_else(|| jpeg_dimensions(data))
        .or_else(|| gif_dimensions(data))
}

fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    // 8-byte signature, then the IHDR chunk: width and height at 16..24
    if data.len() < 24 || &data[..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 2 || data[0] != 0xFF || !matches!(data[1], 0xD8 | 0xD9) {
        return None;
    }
    // scan markers for SOF0/SOF2, which carry the frame dimensions
    let mut i = 2usize;
    while i + 9 < data.len() {
        if data[i] == 0xFF && matches!(data[i + 1], 0xC0 | 0xC2) {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height));
        }
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let block_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + block_len;
    }
    None
}

fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 10 || (&data[..6] != b"GIF87a" && &data[..6] != b"GIF89a") {
        return None;
    }
    let width = u16::from_le_bytes([data[6], data[7]]) as u32;
    let height = u16::from_le_bytes([data[8], data[9]]) as u32;
    Some((width, height))
}
