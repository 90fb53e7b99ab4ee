use rocket::http::{CookieJar, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::response::Redirect;
use rocket::{get, post, Request};
use shared::PollError;
use tracing::debug;

use crate::accounts::AccountStore;

/// Private cookie carrying the authenticated username.
pub const SESSION_COOKIE: &str = "username";

pub const LOGIN_PATH: &str = "/login";

/// Endpoints an anonymous caller may reach.
pub const PUBLIC_ENDPOINTS: &[&str] = &[
    "login_page",
    "login",
    "signup_page",
    "signup",
    "static_files",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Dispatch,
    RedirectToLogin,
}

impl SessionState {
    pub fn from_cookies(cookies: &CookieJar<'_>) -> Self {
        match cookies.get_private(SESSION_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => {
                SessionState::Authenticated(cookie.value().to_string())
            }
            _ => SessionState::Anonymous,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated(username) => Some(username),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.username().is_some()
    }

    /// `Anonymous -> Authenticated` on matching credentials. A failed attempt
    /// leaves the caller where it was.
    pub fn login(
        self,
        accounts: &AccountStore,
        username: &str,
        password: &str,
    ) -> Result<Self, (Self, PollError)> {
        match accounts.verify(username, password) {
            Ok(()) => Ok(SessionState::Authenticated(username.to_string())),
            Err(e) => Err((self, e)),
        }
    }

    pub fn logout(self) -> Self {
        SessionState::Anonymous
    }

    /// Decides whether a request for `endpoint` may run its handler.
    pub fn admit(&self, endpoint: Option<&str>) -> Admission {
        let public = endpoint.is_some_and(|name| PUBLIC_ENDPOINTS.contains(&name));
        if public || self.is_authenticated() {
            Admission::Dispatch
        } else {
            Admission::RedirectToLogin
        }
    }

    pub fn store(&self, cookies: &CookieJar<'_>) {
        match self {
            SessionState::Authenticated(username) => {
                cookies.add_private((SESSION_COOKIE, username.clone()));
            }
            SessionState::Anonymous => cookies.remove_private(SESSION_COOKIE),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionState {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(SessionState::from_cookies(req.cookies()))
    }
}

/// Admission ticket for the matched route. Every handler takes one, directly
/// or through [`User`], so [`SessionState::admit`] and [`PUBLIC_ENDPOINTS`]
/// decide which handlers run. A refused request is forwarded to
/// [`login_redirect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate(pub SessionState);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Gate {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session = SessionState::from_cookies(req.cookies());
        let endpoint = req.route().and_then(|route| route.name.as_deref());

        match session.admit(endpoint) {
            Admission::Dispatch => Outcome::Success(Gate(session)),
            Admission::RedirectToLogin => {
                debug!("Redirecting anonymous request for {} to login", req.uri());
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

/// Signed-in caller of an admitted route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.guard::<Gate>().await {
            Outcome::Success(Gate(SessionState::Authenticated(username))) => {
                Outcome::Success(User(username))
            }
            Outcome::Success(Gate(SessionState::Anonymous)) => Outcome::Forward(Status::Unauthorized),
            Outcome::Forward(status) => Outcome::Forward(status),
            Outcome::Error(e) => Outcome::Error(e),
        }
    }
}

fn fallback(session: SessionState) -> Result<Redirect, Status> {
    match session {
        SessionState::Anonymous => Ok(Redirect::to(LOGIN_PATH)),
        SessionState::Authenticated(_) => Err(Status::NotFound),
    }
}

/// Lowest-priority fallback: anonymous requests go to the login page,
/// authenticated ones that matched nothing get a 404.
#[get("/<_..>", rank = 20)]
pub fn login_redirect(session: SessionState) -> Result<Redirect, Status> {
    fallback(session)
}

#[post("/<_..>", rank = 20)]
pub fn login_redirect_post(session: SessionState) -> Result<Redirect, Status> {
    fallback(session)
}
