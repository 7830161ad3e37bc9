//! Formatting helpers for user-facing and debug output.

/// Hexadecimal representation of binary data.
pub mod hex {
    /// Encodes the given buffer as an upper-case hexadecimal string.
    pub fn encode<B: AsRef<[u8]>>(buffer: B) -> String {
        let buffer = buffer.as_ref();
        let mut s = String::with_capacity(buffer.len() * 2);
        for b in buffer {
            s.push_str(&format!("{:02X}", b));
        }
        s
    }

    /// Decodes a hexadecimal string, ignoring whitespace.
    pub fn decode<H: AsRef<str>>(hex: H) -> crate::Result<Vec<u8>> {
        let nibbles = hex.as_ref().chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_digit(16))
            .collect::<Option<Vec<u32>>>()
            .ok_or_else(|| crate::Error::InvalidArgument(
                "Invalid hexadecimal character".into()))?;

        if nibbles.len() % 2 != 0 {
            return Err(crate::Error::InvalidArgument(
                "Odd number of nibbles".into()).into());
        }

        Ok(nibbles.chunks(2).map(|c| (c[0] << 4 | c[1]) as u8).collect())
    }

    #[cfg(test)]
    mod tests {
        #[test]
        fn roundtrip() {
            let bytes = b"\x00\x01\xab\xff";
            let hex = super::encode(bytes);
            assert_eq!(hex, "0001ABFF");
            assert_eq!(super::decode(&hex).unwrap(), bytes);
            assert_eq!(super::decode("00 01\tab\nFF").unwrap(), bytes);
            assert!(super::decode("abc").is_err());
            assert!(super::decode("zz").is_err());
        }
    }
}
