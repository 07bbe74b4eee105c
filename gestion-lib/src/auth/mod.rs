//! Bearer token providers

mod token;

pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::StoredTokenProvider;
pub use token::TOKEN_KEY;
pub use token::TokenProvider;
