//! Route paths.

pub const GET_HEALTH: &str = "/health";
pub const POST_USER_REGISTER: &str = "/api/v1/user/register";
pub const POST_USER_LOGIN: &str = "/api/v1/user/login";
pub const POST_USER_REFRESH_TOKEN: &str = "/api/v1/user/refresh-token";
pub const GET_USER_ME: &str = "/api/v1/user/me";
pub const POST_USER_LOGOUT: &str = "/api/v1/user/logout";
pub const GET_USERS: &str = "/api/v1/users";
