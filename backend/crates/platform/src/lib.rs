//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the backend:
//! - Cryptographic utilities (random tokens, SHA-256, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Client origin extraction
//! - Account lockout policy types

pub mod client;
pub mod crypto;
pub mod lockout;
pub mod password;
