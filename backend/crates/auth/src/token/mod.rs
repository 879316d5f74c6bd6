//! Token Issuance and Verification
//!
//! Access tokens are HS256 JWTs verified statelessly; refresh tokens
//! are opaque random values redeemable exactly once against their
//! stored SHA-256 digest.

pub mod claims;
pub mod issuer;
pub mod verifier;

pub use claims::{Claims, TokenSet};
pub use issuer::{IssuedTokens, TokenIssuer};
pub use verifier::TokenVerifier;
