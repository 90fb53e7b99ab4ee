use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use include_dir::{include_dir, Dir};
use rocket::{
    State, get, post,
    form::Form,
    http::{ContentType, CookieJar},
    response::{Redirect, content::RawHtml},
    serde::json::Json,
};
use tracing::{error, info, instrument, warn};
use shared::{
    validation::{parse_option_selection, parse_poll_id},
    PollDisplay, PollSummary,
};
use crate::{
    accounts::AccountStore,
    config::AppConfig,
    error::ApiError,
    forms::{Credentials, NewPollForm, VoteForm},
    marker::{set_marker, voter_has_marker},
    pages,
    service::PollService,
    session::{Gate, SessionState, User, LOGIN_PATH},
};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

pub struct AppState {
    pub polls: PollService,
    pub accounts: Mutex<AccountStore>,
}

impl AppState {
    pub fn new(polls: PollService, accounts: AccountStore) -> Self {
        Self {
            polls,
            accounts: Mutex::new(accounts),
        }
    }

    pub fn load(config: &AppConfig) -> Result<Self, ApiError> {
        fs::create_dir_all(&config.data_dir)?;
        let polls = PollService::load(config.polls_path())?;
        let accounts = AccountStore::load(config.accounts_path())?;
        Ok(Self::new(polls, accounts))
    }

    pub fn accounts(&self) -> Result<MutexGuard<'_, AccountStore>, ApiError> {
        self.accounts.lock().map_err(|e| {
            error!("Failed to acquire account store lock: {}", e);
            ApiError::Storage("account store unavailable".into())
        })
    }
}

#[get("/")]
pub fn index(user: User, state: &State<AppState>) -> Result<RawHtml<String>, ApiError> {
    let polls = state.polls.list_polls()?;
    Ok(pages::index(&user.0, &polls))
}

#[get("/polls")]
pub fn new_poll_page(_user: User) -> RawHtml<String> {
    pages::new_poll()
}

#[instrument(skip_all, fields(user = %user.0))]
#[post("/polls", data = "<form>")]
pub fn create_poll(
    user: User,
    state: &State<AppState>,
    form: Form<NewPollForm>,
) -> Result<Redirect, ApiError> {
    let form = form.into_inner();
    state.polls.create_poll(&form.question, &form.options)?;
    Ok(Redirect::to("/"))
}

#[get("/polls/<id>")]
pub fn show_poll(_user: User, state: &State<AppState>, id: &str) -> Result<RawHtml<String>, ApiError> {
    let poll = state.polls.get_poll_for_display(id)?;
    Ok(pages::show_poll(&poll))
}

#[instrument(skip_all, fields(poll_id = %id))]
#[post("/vote/<id>", data = "<form>")]
pub fn vote(
    _user: User,
    state: &State<AppState>,
    id: &str,
    cookies: &CookieJar<'_>,
    form: Form<VoteForm>,
) -> Result<Redirect, ApiError> {
    let id = parse_poll_id(id)?;
    // An unreadable selection still has to lose to the marker and lookup checks.
    let option = parse_option_selection(&form.option).unwrap_or(0);

    let marker = state.polls.cast_vote(id, option, voter_has_marker(cookies, id))?;
    set_marker(cookies, &marker);
    Ok(Redirect::to("/"))
}

#[get("/signup")]
pub fn signup_page(_gate: Gate) -> RawHtml<String> {
    pages::signup()
}

#[instrument(skip_all, fields(username = %form.username))]
#[post("/signup", data = "<form>")]
pub fn signup(
    _gate: Gate,
    state: &State<AppState>,
    form: Form<Credentials>,
) -> Result<Redirect, ApiError> {
    state.accounts()?.create(&form.username, &form.password)?;
    Ok(Redirect::to(LOGIN_PATH))
}

#[get("/login")]
pub fn login_page(_gate: Gate) -> RawHtml<String> {
    pages::login()
}

#[instrument(skip_all, fields(username = %form.username))]
#[post("/login", data = "<form>")]
pub fn login(
    gate: Gate,
    state: &State<AppState>,
    cookies: &CookieJar<'_>,
    form: Form<Credentials>,
) -> Result<Redirect, ApiError> {
    let accounts = state.accounts()?;
    match gate.0.login(&accounts, &form.username, &form.password) {
        Ok(session) => {
            session.store(cookies);
            info!("Logged in");
            Ok(Redirect::to("/"))
        }
        Err((_, e)) => {
            warn!("Login rejected: {}", e);
            Err(e.into())
        }
    }
}

#[post("/logout")]
pub fn logout(user: User, cookies: &CookieJar<'_>) -> Redirect {
    SessionState::Authenticated(user.0).logout().store(cookies);
    Redirect::to(LOGIN_PATH)
}

#[get("/static/<path..>")]
pub fn static_files(_gate: Gate, path: PathBuf) -> Option<(ContentType, &'static [u8])> {
    let file = STATIC_DIR.get_file(&path)?;
    let content_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContentType::from_extension)
        .unwrap_or(ContentType::Binary);
    Some((content_type, file.contents()))
}

#[get("/api/polls")]
pub fn list_polls(_user: User, state: &State<AppState>) -> Result<Json<Vec<PollSummary>>, ApiError> {
    state.polls.list_polls().map(Json)
}

#[get("/api/polls/<id>")]
pub fn get_poll(_user: User, state: &State<AppState>, id: &str) -> Result<Json<PollDisplay>, ApiError> {
    state.polls.get_poll_for_display(id).map(Json)
}
