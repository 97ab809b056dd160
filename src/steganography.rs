use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::io::{self, ErrorKind};

/// 将文本编码为比特序列。
///
/// UTF-8 字节被视为一个大端整数并以二进制写出，不含前导零，
/// 因此 `"watermark text"` 编码后恰好是 111 比特。
pub fn text_to_bits(text: &str) -> Vec<bool> {
    text.as_bytes()
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .skip_while(|&bit| !bit)
        .collect()
}

/// [`text_to_bits`] 的逆操作。非法的 UTF-8 序列以替换字符表示。
pub fn bits_to_text(bits: &[bool]) -> String {
    let start = bits.iter().position(|&bit| bit).unwrap_or(bits.len());
    let bits = &bits[start..];
    let padding = (8 - bits.len() % 8) % 8;

    let bytes: Vec<u8> = std::iter::repeat_n(false, padding)
        .chain(bits.iter().copied())
        .collect::<Vec<_>>()
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect();

    String::from_utf8_lossy(&bytes).into_owned()
}

/// 由密码决定的像素字节访问顺序。
fn keyed_order(len: usize, password: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(password));
    order
}

/// 按密码打乱的顺序将比特循环写入每个像素字节的最低有效位。
pub fn scatter(bits: &[bool], pix: &mut [u8], password: u64) -> Result<(), io::Error> {
    if bits.is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The watermark contains no bits to embed.",
        ));
    }
    if bits.len() > pix.len() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The watermark is larger than the image capacity.",
        ));
    }

    for (i, index) in keyed_order(pix.len(), password).into_iter().enumerate() {
        let bit = bits[i % bits.len()] as u8;
        pix[index] = (pix[index] & 0xFE) | bit;
    }

    Ok(())
}

/// 按相同顺序读取最低有效位，对每个比特的所有副本进行多数表决。
pub fn gather(pix: &[u8], password: u64, size: usize) -> Result<Vec<bool>, io::Error> {
    if size == 0 {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The watermark size must be positive.",
        ));
    }
    if size > pix.len() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The watermark size exceeds the image capacity.",
        ));
    }

    let mut ones = vec![0usize; size];
    let mut total = vec![0usize; size];

    for (i, index) in keyed_order(pix.len(), password).into_iter().enumerate() {
        ones[i % size] += (pix[index] & 1) as usize;
        total[i % size] += 1;
    }

    Ok(ones
        .iter()
        .zip(&total)
        .map(|(&one, &all)| one * 2 >= all)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermark_text_is_111_bits() {
        assert_eq!(text_to_bits("watermark text").len(), 111);
    }

    #[test]
    fn test_leading_zero_bits_are_dropped() {
        // 'A' = 0b0100_0001
        assert_eq!(
            text_to_bits("A"),
            vec![true, false, false, false, false, false, true]
        );
        assert!(text_to_bits("").is_empty());
    }

    #[test]
    fn test_bits_decode_back_to_text() {
        for text in ["hello", "watermark text", "水印 ✓"] {
            assert_eq!(bits_to_text(&text_to_bits(text)), text);
        }
    }

    #[test]
    fn test_scatter_then_gather_recovers_bits() {
        let bits = text_to_bits("hi");
        let mut pix: Vec<u8> = (0..300).map(|i| (i * 7 % 256) as u8).collect();

        scatter(&bits, &mut pix, 1234).unwrap();
        assert_eq!(gather(&pix, 1234, bits.len()).unwrap(), bits);
    }

    #[test]
    fn test_scatter_only_touches_lowest_bit() {
        let original: Vec<u8> = (0..64).map(|i| (i * 13 % 256) as u8).collect();
        let mut pix = original.clone();

        scatter(&text_to_bits("x"), &mut pix, 7).unwrap();
        for (before, after) in original.iter().zip(&pix) {
            assert_eq!(before & 0xFE, after & 0xFE);
        }
    }

    #[test]
    fn test_capacity_is_checked() {
        let mut pix = vec![0u8; 4];
        assert!(scatter(&text_to_bits("long text"), &mut pix, 1).is_err());
        assert!(scatter(&[], &mut pix, 1).is_err());
        assert!(gather(&pix, 1, 0).is_err());
        assert!(gather(&pix, 1, 5).is_err());
    }
}
