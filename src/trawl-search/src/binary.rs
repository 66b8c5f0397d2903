//! Binary file detection.

use std::io::{self, Read};

/// Number of leading bytes inspected.
pub const BINARY_SAMPLE_SIZE: usize = 8192;

/// Percentage of control bytes above which a sample counts as binary.
const MAX_CONTROL_PERCENT: usize = 30;

/// Returns true if `sample` looks like binary data.
///
/// A NUL byte anywhere in the sample is decisive. Otherwise the sample is
/// binary when too many bytes are control characters other than common
/// whitespace and escape sequences.
pub fn is_binary(sample: &[u8]) -> bool {
    let sample = &sample[..sample.len().min(BINARY_SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    let control = sample.iter().filter(|&&b| is_control(b)).count();
    control * 100 > sample.len() * MAX_CONTROL_PERCENT
}

/// Reads up to [`BINARY_SAMPLE_SIZE`] leading bytes from `reader`.
pub fn read_sample<R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut sample = Vec::with_capacity(BINARY_SAMPLE_SIZE);
    reader
        .take(BINARY_SAMPLE_SIZE as u64)
        .read_to_end(&mut sample)?;
    Ok(sample)
}

fn is_control(byte: u8) -> bool {
    match byte {
        b'\t' | b'\n' | b'\r' | 0x0c | 0x1b => false,
        0x00..=0x1f | 0x7f => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert!(!is_binary(b"fn main() {\n    println!(\"hi\");\n}\n"));
    }

    #[test]
    fn test_empty_is_text() {
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_nul_byte() {
        assert!(is_binary(b"hello\x00world"));
    }

    #[test]
    fn test_control_heavy() {
        let data: Vec<u8> = (1u8..=8).cycle().take(64).collect();
        assert!(is_binary(&data));
    }

    #[test]
    fn test_utf8_text() {
        assert!(!is_binary("héllo wörld, 你好\n".as_bytes()));
    }

    #[test]
    fn test_ansi_escapes_are_text() {
        assert!(!is_binary(b"\x1b[31mred\x1b[0m\n"));
    }

    #[test]
    fn test_nul_beyond_sample_is_ignored() {
        let mut data = vec![b'a'; BINARY_SAMPLE_SIZE];
        data.push(0);
        assert!(!is_binary(&data));
    }

    #[test]
    fn test_read_sample_limits_length() {
        let data = vec![b'x'; BINARY_SAMPLE_SIZE * 2];
        let sample = read_sample(&data[..]).unwrap();
        assert_eq!(sample.len(), BINARY_SAMPLE_SIZE);
    }
}
