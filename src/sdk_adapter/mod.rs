//! SDK adapter layer for supporting multiple Solana SDK versions
//!
//! Wallet adapters and the session manager only name Solana types through
//! this module, so switching between SDK v2 and v3 is a feature flag away.

#[cfg(feature = "sdk-v2")]
mod v2;
#[cfg(feature = "sdk-v3")]
mod v3;

#[cfg(feature = "sdk-v2")]
pub use v2::*;

#[cfg(feature = "sdk-v3")]
pub use v3::*;

#[cfg(all(feature = "sdk-v2", feature = "sdk-v3"))]
compile_error!("Cannot enable both sdk-v2 and sdk-v3 features. Choose one.");

#[cfg(not(any(feature = "sdk-v2", feature = "sdk-v3")))]
compile_error!("Must enable either sdk-v2 or sdk-v3 feature.");
