//! Client-side account handling: bearer token storage, the account backend
//! client, and the signed-in session that routes users by role.

pub mod client;
pub mod session;
pub mod store;
pub mod token;

pub use client::{AuthApi, AuthError, AuthResponse, HttpAuthClient, LoginRequest, RegisterRequest};
pub use session::{AuthSession, AuthState, RegistrationForm};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use token::{decode_claims, DecodedToken, Destination, Role};
