//! 512-bit VAES absorption kernel.
//!
//! One absorption round chains eight 128-bit AES rounds whose inputs are
//! the previous S words. Holding `S[0..4)` and `S[4..8)` in two ZMM
//! registers turns those eight rounds into two `vaesenc` instructions;
//! the survivors are realigned one lane down with `valignq`, and the
//! S[0] feedback word is patched in from scalar registers.

use std::arch::x86_64::*;

use crate::low::AesBlock;
use crate::mid::state::State;

#[target_feature(enable = "avx512f", enable = "vaes")]
pub(super) unsafe fn absorb_blocks(state: &mut State, blocks: &[[u8; 64]]) {
    unsafe {
        // lo = [S0 S1 S2 S3], hi = [S4 S5 S6 S7]
        let mut lo = core::mem::transmute::<[AesBlock; 4], __m512i>([
            state.s[0], state.s[1], state.s[2], state.s[3],
        ]);
        let mut hi = core::mem::transmute::<[AesBlock; 4], __m512i>([
            state.s[4], state.s[5], state.s[6], state.s[7],
        ]);

        let mut s8 = state.s[8].0;
        let mut rr = state.rr.0;
        let mut r0 = state.r0.0;
        let mut r1 = state.r1.0;
        let mut r2 = state.r2.0;

        for block in blocks {
            let m = core::mem::transmute::<[u8; 64], __m512i>(*block);
            let m1 = _mm512_extracti32x4_epi32::<1>(m);
            let m2 = _mm512_extracti32x4_epi32::<2>(m);

            // round keys for the two fused rounds:
            //   [S1' S2' S3' S4'] needs [M3 M3 R1^R2 M0]
            //   [S5' S6' S7' S8'] needs [M0 M1 M1  M3]
            let r12 = _mm_xor_si128(r1, r2);
            let key_lo = _mm512_inserti32x4::<2>(_mm512_shuffle_i32x4::<0b00_10_11_11>(m, m), r12);
            let key_hi = _mm512_shuffle_i32x4::<0b11_01_01_00>(m, m);

            let a = _mm512_aesenc_epi128(lo, key_lo); // [S1' S2' S3' S4']
            let b = _mm512_aesenc_epi128(hi, key_hi); // [S5' S6' S7' S8']

            let s0 = _mm512_castsi512_si128(lo);
            let s0_next = _mm_xor_si128(_mm_xor_si128(s0, s8), m2);

            // slide the survivors down one lane and patch in S0'
            let fill = _mm512_broadcast_i32x4(s0_next);
            lo = _mm512_alignr_epi64::<6>(a, fill); // [S0' S1' S2' S3']
            hi = _mm512_alignr_epi64::<6>(b, a); //    [S4' S5' S6' S7']
            s8 = _mm512_extracti32x4_epi32::<3>(b);

            r2 = r1;
            r1 = r0;
            r0 = _mm_xor_si128(rr, m1);
            rr = m2;
        }

        let [s0, s1, s2, s3] = core::mem::transmute::<__m512i, [AesBlock; 4]>(lo);
        let [s4, s5, s6, s7] = core::mem::transmute::<__m512i, [AesBlock; 4]>(hi);
        state.s = [s0, s1, s2, s3, s4, s5, s6, s7, AesBlock(s8)];
        state.rr = AesBlock(rr);
        state.r0 = AesBlock(r0);
        state.r1 = AesBlock(r1);
        state.r2 = AesBlock(r2);
    }
}
