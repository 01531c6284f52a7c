use std::arch::aarch64::*;
use std::ops::{BitXor, BitXorAssign};

/// One 128-bit lane in a NEON register.
#[derive(Clone, Copy)]
pub(crate) struct AesBlock(uint8x16_t);

impl Default for AesBlock {
    #[inline(always)]
    fn default() -> Self {
        Self(unsafe { vmovq_n_u8(0) })
    }
}

impl AesBlock {
    #[inline(always)]
    pub fn from_bytes(b: &[u8; 16]) -> Self {
        // Safety: b has 16 bytes available. It does not need any special alignment.
        Self(unsafe { vld1q_u8(b.as_ptr()) })
    }

    #[inline(always)]
    pub fn into_bytes(self) -> [u8; 16] {
        let mut out = [0; 16];
        unsafe { vst1q_u8(out.as_mut_ptr(), self.0) }
        out
    }

    /// One AES round: SubBytes, ShiftRows, MixColumns, XOR `key`.
    ///
    /// AESE folds its key operand in before SubBytes/ShiftRows, so it is
    /// fed zero and the round key is XORed after MixColumns.
    #[inline(always)]
    pub fn aes(self, key: Self) -> Self {
        // Safety: every hasher checks for the aes feature before any round runs.
        Self(unsafe { vaesmcq_u8(vaeseq_u8(self.0, vmovq_n_u8(0))) }) ^ key
    }

    /// The final AES round, without MixColumns.
    #[inline(always)]
    pub fn aes_last(self, key: Self) -> Self {
        // Safety: every hasher checks for the aes feature before any round runs.
        Self(unsafe { vaeseq_u8(self.0, vmovq_n_u8(0)) }) ^ key
    }
}

impl BitXor for AesBlock {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(unsafe { veorq_u8(self.0, rhs.0) })
    }
}

impl BitXorAssign for AesBlock {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}
