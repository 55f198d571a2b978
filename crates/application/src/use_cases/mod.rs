//! Application use cases (sign-in and registration orchestration).

mod register;
mod sign_in;

pub use register::*;
pub use sign_in::*;
