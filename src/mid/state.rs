//! The LeMac context and absorbing state.
//!
//! The context is derived from the key once and never changes; the state
//! is what a 64-byte block of input stirs.

use crate::low::AesBlock;
use crate::mid::aes128::{self, RoundKeys};

/// Input is absorbed in 64-byte blocks, four 128-bit lanes at a time.
pub(crate) const BLOCK_SIZE: usize = 64;

/// Everything derived from the key: nine init words for the S-state, 18
/// subkeys reused as overlapping schedules by the tag output, and two
/// standalone AES-128 schedules.
#[derive(Clone)]
pub(crate) struct Context {
    s_init: [AesBlock; 9],
    subkeys: [AesBlock; 18],
    k2: RoundKeys,
    k3: RoundKeys,
}

impl Context {
    /// Expands a 128-bit key: 29 AES encryptions of counter words plus
    /// three key schedules, then frozen.
    pub fn expand(key: &[u8; 16]) -> Self {
        let kr = aes128::key_schedule(key);

        Self {
            s_init: core::array::from_fn(|i| aes128::encrypt(&kr, counter_block(i as u64))),
            subkeys: core::array::from_fn(|i| aes128::encrypt(&kr, counter_block(i as u64 + 9))),
            k2: aes128::key_schedule(&aes128::encrypt(&kr, counter_block(27)).into_bytes()),
            k3: aes128::key_schedule(&aes128::encrypt(&kr, counter_block(28)).into_bytes()),
        }
    }

    /// The `i`th overlapping window into the subkey array, `i` in `0..=8`.
    /// The modified AES in the tag output reads ten round keys, so every
    /// window stays inside the 18 words.
    fn subkey_group(&self, i: usize) -> &[AesBlock; 10] {
        self.subkeys[i..i + 10]
            .try_into()
            .expect("subkey windows are ten words")
    }
}

/// The absorbing state: nine chained S words and the four-word R shift
/// register.
#[derive(Clone, Copy)]
pub(crate) struct State {
    pub(crate) s: [AesBlock; 9],
    pub(crate) rr: AesBlock,
    pub(crate) r0: AesBlock,
    pub(crate) r1: AesBlock,
    pub(crate) r2: AesBlock,
}

impl State {
    pub fn new(ctx: &Context) -> Self {
        Self {
            s: ctx.s_init,
            rr: AesBlock::default(),
            r0: AesBlock::default(),
            r1: AesBlock::default(),
            r2: AesBlock::default(),
        }
    }

    /// Absorbs one 64-byte block.
    ///
    /// The uneven use of the four lanes (M3 three times, M0 and M1 twice,
    /// M2 once) is the construction's fixed message schedule; the
    /// assignments run in an order that reads every old word before it is
    /// overwritten.
    #[inline(always)]
    pub fn absorb(&mut self, block: &[u8; 64]) {
        let (lanes, _) = block.as_chunks::<16>();
        let m0 = AesBlock::from_bytes(&lanes[0]);
        let m1 = AesBlock::from_bytes(&lanes[1]);
        let m2 = AesBlock::from_bytes(&lanes[2]);
        let m3 = AesBlock::from_bytes(&lanes[3]);

        let s = &mut self.s;
        let t = s[8];
        s[8] = s[7].aes(m3);
        s[7] = s[6].aes(m1);
        s[6] = s[5].aes(m1);
        s[5] = s[4].aes(m0);
        s[4] = s[3].aes(m0);
        s[3] = s[2].aes(self.r1 ^ self.r2);
        s[2] = s[1].aes(m3);
        s[1] = s[0].aes(m3);
        s[0] = s[0] ^ t ^ m2;

        self.r2 = self.r1;
        self.r1 = self.r0;
        self.r0 = self.rr ^ m1;
        self.rr = m2;
    }

    /// The all-zero block the finalization absorbs four times; the
    /// message XORs drop out.
    #[inline(always)]
    pub fn absorb_zero(&mut self) {
        let z = AesBlock::default();

        let s = &mut self.s;
        let t = s[8];
        s[8] = s[7].aes(z);
        s[7] = s[6].aes(z);
        s[6] = s[5].aes(z);
        s[5] = s[4].aes(z);
        s[4] = s[3].aes(z);
        s[3] = s[2].aes(self.r1 ^ self.r2);
        s[2] = s[1].aes(z);
        s[1] = s[0].aes(z);
        s[0] = s[0] ^ t;

        self.r2 = self.r1;
        self.r1 = self.r0;
        self.r0 = self.rr;
        self.rr = z;
    }

    /// Mixes the nonce with the nine S words into the 16-byte tag.
    pub fn tag(&self, ctx: &Context, nonce: &[u8; 16]) -> [u8; 16] {
        let n = AesBlock::from_bytes(nonce);

        let mut t = n ^ aes128::encrypt(&ctx.k2, n);
        for (i, s) in self.s.iter().enumerate() {
            t ^= aes128::encrypt_modified(ctx.subkey_group(i), *s);
        }

        aes128::encrypt(&ctx.k3, t).into_bytes()
    }
}

/// The 128-bit word whose low 64 bits are `i`, used to derive the context.
fn counter_block(i: u64) -> AesBlock {
    let mut b = [0u8; 16];
    b[..8].copy_from_slice(&i.to_le_bytes());
    AesBlock::from_bytes(&b)
}
