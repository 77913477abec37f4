//! Shift_JIS decoding for the ERP export.

use encoding_rs::{DecoderResult, SHIFT_JIS};

use crate::error::ConvertError;

/// Decodes a whole table file from Shift_JIS to UTF-8.
///
/// Decoding stops at the first malformed sequence; nothing is replaced with
/// U+FFFD.
///
/// # Errors
///
/// Returns [`ConvertError::Decode`] with the 1-based line and byte offset of
/// the first invalid sequence.
pub fn decode_shift_jis(table: &str, bytes: &[u8]) -> Result<String, ConvertError> {
    let mut decoder = SHIFT_JIS.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len().saturating_mul(3));
    let mut decoded = String::with_capacity(capacity);

    let (result, read) = decoder.decode_to_string_without_replacement(bytes, &mut decoded, true);
    match result {
        DecoderResult::InputEmpty => Ok(decoded),
        DecoderResult::Malformed(bad, consumed_after) => {
            let byte_offset = read
                .saturating_sub(usize::from(bad))
                .saturating_sub(usize::from(consumed_after));
            Err(decode_error(table, bytes, byte_offset))
        }
        // Unreachable with the worst-case capacity above; reported at the
        // point decoding stopped rather than panicking.
        DecoderResult::OutputFull => Err(decode_error(table, bytes, read)),
    }
}

fn decode_error(table: &str, bytes: &[u8], byte_offset: usize) -> ConvertError {
    let line = bytes[..byte_offset.min(bytes.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1;
    ConvertError::Decode {
        table: table.to_string(),
        line,
        byte_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_japanese_text() {
        let (encoded, _, had_errors) = SHIFT_JIS.encode("商品名,価格\n美容液,3000\n");
        assert!(!had_errors);
        let decoded = decode_shift_jis("Product", &encoded).unwrap();
        assert_eq!(decoded, "商品名,価格\n美容液,3000\n");
    }

    #[test]
    fn empty_input_decodes_to_empty_string() {
        assert_eq!(decode_shift_jis("Product", b"").unwrap(), "");
    }

    #[test]
    fn invalid_sequence_reports_line_and_offset() {
        // 0x82 is a lead byte; 0x20 is not a valid trail byte for it.
        let bytes = b"product_id,name\nA001,\x82\x20broken\n";
        let err = decode_shift_jis("Product", bytes).unwrap_err();
        match err {
            ConvertError::Decode {
                table,
                line,
                byte_offset,
            } => {
                assert_eq!(table, "Product");
                assert_eq!(line, 2);
                assert_eq!(byte_offset, 21);
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }
}
