//! LeMac, a 128-bit message authentication code built entirely from AES
//! round instructions, designed by Augustin Bariant and Gaëtan Leurent.
//!
//! A 128-bit key is expanded once into a fixed context; arbitrary-length
//! input is absorbed in 64-byte blocks; a 128-bit nonce is mixed in at
//! finalization to produce the 16-byte tag.
//!
//! ```
//! use lemac::LeMac;
//!
//! let mut mac = LeMac::new(&[0x42; 16]);
//! mac.update(b"hello ");
//! mac.update(b"world");
//! let tag = mac.finalize(&[0x07; 16]);
//!
//! // the same bytes in one call, without touching the hasher's state
//! let oneshot = LeMac::new(&[0x42; 16]).oneshot(b"hello world", &[0x07; 16]);
//! assert_eq!(tag, oneshot);
//! ```
//!
//! The hot loops run on AES-NI, on VAES with 512-bit registers, or on the
//! ARMv8 AES extension; the backend is picked once per hasher at
//! construction and every backend produces identical tags.

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))] {
        mod backend;
        mod high;
        mod low;
        mod mid;

        pub use high::{InvalidKeyLength, LeMac, LeMacMac};
    } else {
        compile_error!("lemac requires AES round instructions (x86-64 AES-NI or ARMv8 AES)");
    }
}
