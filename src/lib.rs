//! Client SDK for the Gigz services marketplace API.
//!
//! [`SessionManager`] owns the login session and transparently refreshes an expired access
//! token once per request. [`CategoryStore`], [`GigStore`] and [`OrderStore`] keep observable
//! local copies of server collections and patch them after each confirmed mutation.

mod errors;
mod structs;

pub use errors::GigzError;
pub use structs::category::CategoryStore;
pub use structs::client::{
    ApiRequest, ApiResponse, Client, ClientOptions, HttpTransport, Transport, DEFAULT_API_BASE_URL,
};
pub use structs::gig::GigStore;
pub use structs::order::OrderStore;
pub use structs::session::{SessionManager, SessionState, SessionStatus};
pub use structs::storage::{FileStorage, MemoryStorage, TokenStorage};
pub use structs::store::{Collection, Identified};
pub use structs::token::{decode_payload, subject_email};
pub use structs::user::{NewUser, ProfilePatch, User};
pub use structs::{
    Category, Credentials, Gig, GigPatch, NewGig, NewOrder, Order, OrderStatus, TokenPair,
};
