//! The public hasher types.

use std::fmt;

use digest::consts::U16;
use digest::crypto_common::{Iv, IvSizeUser, Key, KeyIvInit, KeySizeUser};
use digest::{FixedOutput, FixedOutputReset, MacMarker, Output, OutputSizeUser, Reset, Update};
use subtle::ConstantTimeEq;

use crate::backend::Backend;
use crate::mid::state::{BLOCK_SIZE, Context, State};

/// The key passed at construction was not exactly 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyLength;

impl fmt::Display for InvalidKeyLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LeMac keys are exactly 16 bytes")
    }
}

impl std::error::Error for InvalidKeyLength {}

/// An incremental LeMac hasher.
///
/// The key is expanded into a fixed context at construction; [`update`]
/// absorbs input in 64-byte blocks, buffering any partial block, and
/// [`finalize`] mixes in a 16-byte nonce to produce the tag. The result
/// depends only on the concatenation of the updated bytes, never on how
/// they were chunked.
///
/// After finalizing, call [`reset`] before reusing the hasher; the
/// absorption state is left as the finalization scrambled it. The
/// key-derived context is never modified, so [`oneshot`] works on a
/// shared reference and a finalized hasher resets cleanly.
///
/// [`update`]: LeMac::update
/// [`finalize`]: LeMac::finalize
/// [`reset`]: LeMac::reset
/// [`oneshot`]: LeMac::oneshot
#[derive(Clone)]
pub struct LeMac {
    backend: Backend,
    context: Context,
    state: State,
    buf: [u8; BLOCK_SIZE],
    buf_len: usize,
}

impl LeMac {
    /// Creates a hasher from a 16-byte key.
    ///
    /// # Panics
    ///
    /// Panics if the host CPU exposes no AES round instructions.
    pub fn new(key: &[u8; 16]) -> Self {
        let backend = Backend::detect().expect("no AES backend available on this CPU");
        let context = Context::expand(key);
        let state = State::new(&context);
        Self {
            backend,
            context,
            state,
            buf: [0; BLOCK_SIZE],
            buf_len: 0,
        }
    }

    /// Creates a hasher from a runtime-length key slice.
    ///
    /// # Panics
    ///
    /// Panics if the host CPU exposes no AES round instructions.
    pub fn new_from_slice(key: &[u8]) -> Result<Self, InvalidKeyLength> {
        let key: &[u8; 16] = key.try_into().map_err(|_| InvalidKeyLength)?;
        Ok(Self::new(key))
    }

    /// Absorbs more input.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.buf_len != 0 {
            let want = BLOCK_SIZE - self.buf_len;
            if data.len() < want {
                // not enough for a whole block; keep accumulating
                self.buf[self.buf_len..self.buf_len + data.len()].copy_from_slice(data);
                self.buf_len += data.len();
                return;
            }
            let (head, rest) = data.split_at(want);
            self.buf[self.buf_len..].copy_from_slice(head);
            let pending = self.buf;
            self.backend
                .absorb_blocks(&mut self.state, core::slice::from_ref(&pending));
            self.buf_len = 0;
            data = rest;
        }

        let (blocks, tail) = data.as_chunks::<BLOCK_SIZE>();
        self.backend.absorb_blocks(&mut self.state, blocks);

        self.buf[..tail.len()].copy_from_slice(tail);
        self.buf_len = tail.len();
    }

    /// Finalizes with the given nonce and returns the 16-byte tag.
    pub fn finalize(&mut self, nonce: &[u8; 16]) -> [u8; 16] {
        let mut tag = [0; 16];
        self.finalize_to(nonce, &mut tag);
        tag
    }

    /// Finalizes with the given nonce, writing the tag into `tag`.
    pub fn finalize_to(&mut self, nonce: &[u8; 16], tag: &mut [u8; 16]) {
        // a 0x01 domain byte and zeros complete the pending block
        self.buf[self.buf_len] = 0x01;
        self.buf[self.buf_len + 1..].fill(0);
        self.state.absorb(&self.buf);

        // four message-free rounds flush the R registers into S
        for _ in 0..4 {
            self.state.absorb_zero();
        }

        *tag = self.state.tag(&self.context, nonce);
    }

    /// Computes the tag of `data` under `nonce` in one call.
    ///
    /// Runs on stack-local state and leaves the hasher untouched, so a
    /// shared hasher can serve any number of one-shot computations.
    pub fn oneshot(&self, data: &[u8], nonce: &[u8; 16]) -> [u8; 16] {
        let mut state = State::new(&self.context);

        let (blocks, tail) = data.as_chunks::<BLOCK_SIZE>();
        self.backend.absorb_blocks(&mut state, blocks);

        let mut buf = [0; BLOCK_SIZE];
        buf[..tail.len()].copy_from_slice(tail);
        buf[tail.len()] = 0x01;
        state.absorb(&buf);

        for _ in 0..4 {
            state.absorb_zero();
        }

        state.tag(&self.context, nonce)
    }

    /// Computes the tag of `data` under `nonce` and compares it against
    /// `tag` in constant time.
    pub fn oneshot_verify(&self, data: &[u8], nonce: &[u8; 16], tag: &[u8; 16]) -> bool {
        self.oneshot(data, nonce)[..].ct_eq(&tag[..]).into()
    }

    /// Restores the absorption state to what construction produced.
    pub fn reset(&mut self) {
        self.state = State::new(&self.context);
        self.buf_len = 0;
    }

    /// The name of the backend this hasher selected at construction.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

/// A zero key, matching the reference implementation's default.
impl Default for LeMac {
    fn default() -> Self {
        Self::new(&[0; 16])
    }
}

/// [`LeMac`] behind the RustCrypto MAC traits.
///
/// The nonce is supplied up front as the IV and held until finalization,
/// which is where the construction actually consumes it.
#[derive(Clone)]
pub struct LeMacMac {
    inner: LeMac,
    nonce: [u8; 16],
}

impl KeySizeUser for LeMacMac {
    type KeySize = U16;
}

impl IvSizeUser for LeMacMac {
    type IvSize = U16;
}

impl KeyIvInit for LeMacMac {
    fn new(key: &Key<Self>, iv: &Iv<Self>) -> Self {
        let key: [u8; 16] = key.as_slice().try_into().expect("key size is 16 bytes");
        let nonce: [u8; 16] = iv.as_slice().try_into().expect("iv size is 16 bytes");
        Self {
            inner: LeMac::new(&key),
            nonce,
        }
    }
}

impl MacMarker for LeMacMac {}

impl Update for LeMacMac {
    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }
}

impl OutputSizeUser for LeMacMac {
    type OutputSize = U16;
}

impl FixedOutput for LeMacMac {
    fn finalize_into(mut self, out: &mut Output<Self>) {
        let tag = self.inner.finalize(&self.nonce);
        out.copy_from_slice(&tag);
    }
}

impl Reset for LeMacMac {
    fn reset(&mut self) {
        self.inner.reset();
    }
}

impl FixedOutputReset for LeMacMac {
    fn finalize_into_reset(&mut self, out: &mut Output<Self>) {
        let tag = self.inner.finalize(&self.nonce);
        out.copy_from_slice(&tag);
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use digest::Mac;
    use digest::crypto_common::KeyIvInit;
    use hex_literal::hex;

    use super::{InvalidKeyLength, LeMac, LeMacMac};

    fn ramp<const N: usize>() -> [u8; N] {
        core::array::from_fn(|i| i as u8)
    }

    /// Published vectors, from the designers' test_vectors.py:
    /// <https://github.com/AugustinBariant/Implementations_LeMac_PetitMac>
    #[test]
    fn empty_message_zero_key() {
        let expected = hex!("52282e853c9cfeb5537d33fb916a341f");

        let mut mac = LeMac::default();
        mac.update(&[]);
        assert_eq!(mac.finalize(&[0; 16]), expected);

        assert_eq!(LeMac::default().oneshot(&[], &[0; 16]), expected);
    }

    #[test]
    fn sixteen_zero_bytes_zero_key() {
        let expected = hex!("26fa471b77facc73ec2f9b50bb1af864");

        let mut mac = LeMac::default();
        mac.update(&[0; 16]);
        assert_eq!(mac.finalize(&[0; 16]), expected);

        assert_eq!(LeMac::default().oneshot(&[0; 16], &[0; 16]), expected);
    }

    const RAMP_TAG: [u8; 16] = hex!("d58dfdbe8b0224e1d5106ac4d775beef");

    #[test]
    fn ramp_vector_oneshot() {
        let msg: [u8; 65] = ramp();
        let mac = LeMac::new(&ramp());
        assert_eq!(mac.oneshot(&msg, &ramp()), RAMP_TAG);
    }

    #[test]
    fn ramp_vector_single_update() {
        let msg: [u8; 65] = ramp();
        let mut mac = LeMac::new(&ramp());
        mac.update(&msg);
        assert_eq!(mac.finalize(&ramp()), RAMP_TAG);

        let mut tag = [0; 16];
        let mut mac = LeMac::new(&ramp());
        mac.update(&msg);
        mac.finalize_to(&ramp(), &mut tag);
        assert_eq!(tag, RAMP_TAG);
    }

    #[test]
    fn ramp_vector_chunked_updates() {
        let msg: [u8; 65] = ramp();
        for chunk_size in [1, 2, 64, 65, 128] {
            let mut mac = LeMac::new(&ramp());
            for chunk in msg.chunks(chunk_size) {
                mac.update(chunk);
            }
            assert_eq!(mac.finalize(&ramp()), RAMP_TAG, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn ramp_vector_misaligned_input() {
        let msg: [u8; 65] = ramp();
        let mac = LeMac::new(&ramp());
        for offset in [0, 1, 2, 15] {
            let mut shifted = vec![0xaa; offset + msg.len()];
            shifted[offset..].copy_from_slice(&msg);
            assert_eq!(mac.oneshot(&shifted[offset..], &ramp()), RAMP_TAG, "offset {offset}");
        }
    }

    #[test]
    fn chunking_is_invariant_at_every_split() {
        let msg: [u8; 130] = ramp();
        let nonce = [0x3c; 16];

        let mac = LeMac::new(&[0x90; 16]);
        let expected = mac.oneshot(&msg, &nonce);

        for split in 0..=msg.len() {
            let mut mac = LeMac::new(&[0x90; 16]);
            mac.update(&msg[..split]);
            mac.update(&msg[split..]);
            assert_eq!(mac.finalize(&nonce), expected, "split {split}");
        }
    }

    #[test]
    fn empty_updates_are_noops() {
        let mut a = LeMac::new(&[3; 16]);
        a.update(&[]);
        a.update(b"abc");
        a.update(&[]);
        a.update(b"def");

        let mut b = LeMac::new(&[3; 16]);
        b.update(b"abcdef");

        assert_eq!(a.finalize(&[9; 16]), b.finalize(&[9; 16]));
    }

    #[test]
    fn reset_matches_fresh_hasher() {
        let data = [0x20, 0x42];

        let mut mac = LeMac::new(&[5; 16]);
        mac.update(b"something unrelated first");
        let _ = mac.finalize(&[1; 16]);

        mac.reset();
        mac.update(&data);
        let after_reset = mac.finalize(&[1; 16]);

        let mut fresh = LeMac::new(&[5; 16]);
        fresh.update(&data);
        assert_eq!(after_reset, fresh.finalize(&[1; 16]));
    }

    #[test]
    fn clones_diverge_independently() {
        let nonce = [0x77; 16];
        let key = [0x13; 16];

        // clone mid-stream, inside a partial block
        let mut a = LeMac::new(&key);
        a.update(&ramp::<40>());
        let mut b = a.clone();

        a.update(b"left fork");
        b.update(b"right fork, a little longer");

        let mut expect_a = LeMac::new(&key);
        expect_a.update(&ramp::<40>());
        expect_a.update(b"left fork");

        let mut expect_b = LeMac::new(&key);
        expect_b.update(&ramp::<40>());
        expect_b.update(b"right fork, a little longer");

        assert_eq!(a.finalize(&nonce), expect_a.finalize(&nonce));
        assert_eq!(b.finalize(&nonce), expect_b.finalize(&nonce));
    }

    #[test]
    fn identical_inputs_identical_tags() {
        let mac = LeMac::new(&[0xc4; 16]);
        let data = ramp::<200>();
        assert_eq!(mac.oneshot(&data, &[6; 16]), mac.oneshot(&data, &[6; 16]));
    }

    #[test]
    fn distinct_nonces_distinct_tags() {
        let mac = LeMac::new(&[0xc4; 16]);
        let data = ramp::<33>();
        assert_ne!(mac.oneshot(&data, &[0; 16]), mac.oneshot(&data, &[1; 16]));
    }

    #[test]
    fn wrong_key_lengths_are_rejected() {
        assert_eq!(LeMac::new_from_slice(&[0; 15]).err(), Some(InvalidKeyLength));
        assert_eq!(LeMac::new_from_slice(&[0; 17]).err(), Some(InvalidKeyLength));
        assert!(LeMac::new_from_slice(&[0; 16]).is_ok());
    }

    #[test]
    fn oneshot_verify_accepts_and_rejects() {
        let mac = LeMac::new(&[8; 16]);
        let tag = mac.oneshot(b"payload", &[2; 16]);

        assert!(mac.oneshot_verify(b"payload", &[2; 16], &tag));
        assert!(!mac.oneshot_verify(b"payload!", &[2; 16], &tag));
        assert!(!mac.oneshot_verify(b"payload", &[3; 16], &tag));
    }

    #[test]
    fn backend_reports_a_name() {
        assert!(!LeMac::default().backend_name().is_empty());
    }

    #[test]
    fn mac_trait_matches_inherent_api() {
        let key: [u8; 16] = ramp();
        let nonce: [u8; 16] = ramp();
        let msg: [u8; 65] = ramp();

        let mut mac = <LeMacMac as KeyIvInit>::new(&key.into(), &nonce.into());
        Mac::update(&mut mac, &msg);
        let tag = mac.finalize_reset().into_bytes();
        assert_eq!(tag.as_slice(), &RAMP_TAG[..]);

        // reset by finalize_reset: the same instance verifies again
        Mac::update(&mut mac, &msg);
        assert!(mac.verify_slice(&RAMP_TAG).is_ok());
    }
}
