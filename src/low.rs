//! The 128-bit AES word each architecture provides.
//!
//! `AesBlock` is the only type the rest of the crate computes with. Its
//! methods wrap single instructions and are safe to call once a backend
//! has been selected, which is the first thing hasher construction does.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "aarch64")] {
        mod aarch64;
        pub(crate) use aarch64::AesBlock;
    } else if #[cfg(target_arch = "x86_64")] {
        mod x86_64;
        pub(crate) use x86_64::AesBlock;
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::AesBlock;

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-aegis-aead-16.html#appendix-A.1>
    #[test]
    fn aes_round() {
        // in   : 000102030405060708090a0b0c0d0e0f
        // rk   : 101112131415161718191a1b1c1d1e1f
        // out  : 7a7b4e5638782546a8c0477a3b813f43
        let x = AesBlock::from_bytes(&hex!("000102030405060708090a0b0c0d0e0f"));
        let rk = AesBlock::from_bytes(&hex!("101112131415161718191a1b1c1d1e1f"));
        let out = hex!("7a7b4e5638782546a8c0477a3b813f43");

        assert_eq!(x.aes(rk).into_bytes(), out);
    }

    #[test]
    fn last_round_skips_mix_columns() {
        // FIPS-197 Appendix B round 10: the state entering the last round
        // transforms into the ciphertext under the last round key.
        let state = AesBlock::from_bytes(&hex!("eb40f21e592e38848ba113e71bc342d2"));
        let rk10 = AesBlock::from_bytes(&hex!("d014f9a8c9ee2589e13f0cc8b6630ca6"));
        let out = hex!("3925841d02dc09fbdc118597196a0b32");

        assert_eq!(state.aes_last(rk10).into_bytes(), out);
    }

    #[test]
    fn xor_is_bytewise() {
        let a = AesBlock::from_bytes(&[0xf0; 16]);
        let b = AesBlock::from_bytes(&[0x0f; 16]);
        assert_eq!((a ^ b).into_bytes(), [0xff; 16]);

        let mut c = a;
        c ^= a;
        assert_eq!(c.into_bytes(), [0; 16]);
        assert_eq!(AesBlock::default().into_bytes(), [0; 16]);
    }
}
