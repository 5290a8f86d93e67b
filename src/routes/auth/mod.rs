mod handler;
mod model;

pub use handler::{login, logout, refresh_token, register};
pub use model::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshTokenRequest, RefreshTokenResponse,
    RegisterRequest, RegisterResponse,
};
