//! FIPS-197 AES-128: the key schedule and the two encryption routines the
//! construction uses.
//!
//! The schedule is computed bytewise so the same code serves AES-NI and
//! NEON hosts; it runs once per key, so nothing here is performance
//! sensitive.

use crate::low::AesBlock;

/// The 11 round keys of an AES-128 schedule.
pub(crate) type RoundKeys = [AesBlock; 11];

/// Rijndael S-box, generated the usual way: walk the GF(2^8) exponentials
/// of 3 against the logarithms, then apply the affine transform.
/// <https://en.wikipedia.org/wiki/Rijndael_S-box>
const SBOX: [u8; 256] = {
    let mut sbox = [0u8; 256];
    // 0 has no inverse and maps to the affine constant
    sbox[0] = 0x63;
    let mut p: u8 = 1;
    let mut q: u8 = 1;
    loop {
        // p multiplied by 3
        p = p ^ (p << 1) ^ (if p & 0x80 != 0 { 0x1b } else { 0 });

        // q divided by 3 (multiplication by 0xf6)
        q ^= q << 1;
        q ^= q << 2;
        q ^= q << 4;
        if q & 0x80 != 0 {
            q ^= 0x09;
        }

        let xformed =
            q ^ q.rotate_left(1) ^ q.rotate_left(2) ^ q.rotate_left(3) ^ q.rotate_left(4);
        sbox[p as usize] = xformed ^ 0x63;

        if p == 1 {
            break;
        }
    }
    sbox
};

const RCON: [u8; 11] = [
    0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36,
];

/// Expands a 128-bit key into 11 round keys, per FIPS-197 section 5.2.
pub(crate) fn key_schedule(key: &[u8; 16]) -> RoundKeys {
    let mut w = [[0u8; 4]; 44];
    for i in 0..4 {
        w[i].copy_from_slice(&key[4 * i..4 * i + 4]);
    }
    for i in 4..44 {
        let mut t = w[i - 1];
        if i % 4 == 0 {
            // RotWord, SubWord, and the round constant in one step
            t = [
                SBOX[t[1] as usize] ^ RCON[i / 4],
                SBOX[t[2] as usize],
                SBOX[t[3] as usize],
                SBOX[t[0] as usize],
            ];
        }
        for (b, prev) in t.iter_mut().zip(w[i - 4]) {
            *b ^= prev;
        }
        w[i] = t;
    }

    core::array::from_fn(|r| {
        let mut rk = [0u8; 16];
        for c in 0..4 {
            rk[4 * c..4 * c + 4].copy_from_slice(&w[4 * r + c]);
        }
        AesBlock::from_bytes(&rk)
    })
}

/// Full AES-128 encryption of one block.
pub(crate) fn encrypt(keys: &RoundKeys, mut x: AesBlock) -> AesBlock {
    x ^= keys[0];
    for k in &keys[1..10] {
        x = x.aes(*k);
    }
    x.aes_last(keys[10])
}

/// AES-128 with the last round replaced by a full round under a zero key,
/// so MixColumns runs in round 10 as well. Only the tag output uses this;
/// it reads round keys 0 through 9 and nothing else.
pub(crate) fn encrypt_modified(keys: &[AesBlock; 10], mut x: AesBlock) -> AesBlock {
    x ^= keys[0];
    for k in &keys[1..10] {
        x = x.aes(*k);
    }
    x.aes(AesBlock::default())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::{SBOX, encrypt, encrypt_modified, key_schedule};
    use crate::low::AesBlock;

    #[test]
    fn sbox_spot_values() {
        assert_eq!(SBOX[0x00], 0x63);
        assert_eq!(SBOX[0x01], 0x7c);
        assert_eq!(SBOX[0x53], 0xed);
        assert_eq!(SBOX[0xff], 0x16);
    }

    /// FIPS-197 Appendix A.1 key expansion.
    #[test]
    fn key_expansion() {
        let keys = key_schedule(&hex!("2b7e151628aed2a6abf7158809cf4f3c"));

        assert_eq!(keys[0].into_bytes(), hex!("2b7e151628aed2a6abf7158809cf4f3c"));
        assert_eq!(keys[1].into_bytes(), hex!("a0fafe1788542cb123a339392a6c7605"));
        assert_eq!(keys[4].into_bytes(), hex!("ef44a541a8525b7fb671253bdb0bad00"));
        assert_eq!(keys[10].into_bytes(), hex!("d014f9a8c9ee2589e13f0cc8b6630ca6"));
    }

    /// FIPS-197 Appendix C.1 cipher example.
    #[test]
    fn block_encryption() {
        let keys = key_schedule(&hex!("000102030405060708090a0b0c0d0e0f"));
        let pt = AesBlock::from_bytes(&hex!("00112233445566778899aabbccddeeff"));

        assert_eq!(
            encrypt(&keys, pt).into_bytes(),
            hex!("69c4e0d86a7b0430d8cdb78070b4c55a")
        );
    }

    #[test]
    fn modified_variant_differs_from_plain() {
        let keys = key_schedule(&[0; 16]);
        let ten: &[AesBlock; 10] = keys[..10].try_into().unwrap();
        let x = AesBlock::from_bytes(&hex!("000102030405060708090a0b0c0d0e0f"));

        assert_ne!(
            encrypt(&keys, x).into_bytes(),
            encrypt_modified(ten, x).into_bytes()
        );
    }
}
