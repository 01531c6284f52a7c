use std::arch::x86_64::*;
use std::ops::{BitXor, BitXorAssign};

/// One 128-bit lane in an XMM register.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub(crate) struct AesBlock(pub(crate) __m128i);

impl Default for AesBlock {
    #[inline(always)]
    fn default() -> Self {
        // Safety: sse2 is part of the x86-64 baseline.
        Self(unsafe { _mm_setzero_si128() })
    }
}

impl AesBlock {
    #[inline(always)]
    pub fn from_bytes(b: &[u8; 16]) -> Self {
        // Safety: both types are equivalent, and transmute does not care about alignment.
        Self(unsafe { core::mem::transmute::<[u8; 16], __m128i>(*b) })
    }

    #[inline(always)]
    pub fn into_bytes(self) -> [u8; 16] {
        // Safety: both types are equivalent, and transmute does not care about alignment.
        unsafe { core::mem::transmute::<__m128i, [u8; 16]>(self.0) }
    }

    /// One AES round: SubBytes, ShiftRows, MixColumns, XOR `key`.
    #[inline(always)]
    pub fn aes(self, key: Self) -> Self {
        // Safety: every hasher checks for the aes feature before any round runs.
        Self(unsafe { _mm_aesenc_si128(self.0, key.0) })
    }

    /// The final AES round, without MixColumns.
    #[inline(always)]
    pub fn aes_last(self, key: Self) -> Self {
        // Safety: every hasher checks for the aes feature before any round runs.
        Self(unsafe { _mm_aesenclast_si128(self.0, key.0) })
    }
}

impl BitXor for AesBlock {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        // Safety: sse2 is part of the x86-64 baseline.
        Self(unsafe { _mm_xor_si128(self.0, rhs.0) })
    }
}

impl BitXorAssign for AesBlock {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}
