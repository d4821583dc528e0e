/// Authentication module
///
/// Token issuance and parsing, refresh-secret hashing, and the
/// sign-in / refresh-rotation service.

mod claims;
mod secret_hasher;
mod service;
mod token_codec;

pub use claims::Claims;
pub use secret_hasher::hash_secret;
pub use secret_hasher::verify_secret;
pub use secret_hasher::DUMMY_SECRET_HASH;
pub use service::AuthenticationService;
pub use service::Tokens;
pub use token_codec::generate_access_token;
pub use token_codec::generate_refresh_secret;
pub use token_codec::generate_session_key;
pub use token_codec::parse_access_token;
