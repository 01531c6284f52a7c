//! Runtime backend selection.
//!
//! Every backend runs the same absorption rounds and produces identical
//! tags; they differ only in how many 128-bit lanes one instruction
//! carries. Selection happens once per hasher, and the
//! `#[target_feature]` kernels below are only reachable after
//! [`Backend::detect`] has observed the features they need.

use crate::mid::state::State;

#[cfg(target_arch = "x86_64")]
mod vaes512;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Backend {
    /// One 128-bit AES round per instruction (AES-NI or ARMv8 AES).
    Aes128,
    /// Four fused 128-bit AES rounds per instruction in 512-bit registers.
    #[cfg(target_arch = "x86_64")]
    Vaes512,
}

impl Backend {
    /// Picks the widest backend this host supports.
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Option<Self> {
        if !is_x86_feature_detected!("aes") {
            return None;
        }
        if is_x86_feature_detected!("vaes") && is_x86_feature_detected!("avx512f") {
            return Some(Self::Vaes512);
        }
        Some(Self::Aes128)
    }

    /// Picks the widest backend this host supports.
    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Option<Self> {
        std::arch::is_aarch64_feature_detected!("aes").then_some(Self::Aes128)
    }

    pub fn name(self) -> &'static str {
        match self {
            #[cfg(target_arch = "x86_64")]
            Self::Aes128 => "aes-ni",
            #[cfg(target_arch = "x86_64")]
            Self::Vaes512 => "vaes-512",
            #[cfg(target_arch = "aarch64")]
            Self::Aes128 => "armv8-aes",
        }
    }

    /// Absorbs a run of whole blocks.
    #[inline]
    pub fn absorb_blocks(self, state: &mut State, blocks: &[[u8; 64]]) {
        match self {
            // Safety: detect() observed the aes feature on this host.
            Self::Aes128 => unsafe { absorb_blocks_aes128(state, blocks) },
            #[cfg(target_arch = "x86_64")]
            // Safety: detect() observed avx512f, vaes and aes on this host.
            Self::Vaes512 => unsafe { vaes512::absorb_blocks(state, blocks) },
        }
    }
}

/// The scalar hot loop. The state is snapshotted into locals around the
/// loop so the compiler can keep all thirteen words in registers.
#[target_feature(enable = "aes")]
unsafe fn absorb_blocks_aes128(state: &mut State, blocks: &[[u8; 64]]) {
    let mut s = *state;
    for block in blocks {
        s.absorb(block);
    }
    *state = s;
}
