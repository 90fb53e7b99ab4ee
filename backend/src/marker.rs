use rocket::http::{Cookie, CookieJar};
use rocket::time::Duration;
use shared::{VoteMarker, VOTE_MARKER_TTL_HOURS};
use time::OffsetDateTime;

/// Whether the client still holds a live marker for `poll_id`.
pub fn voter_has_marker(cookies: &CookieJar<'_>, poll_id: u32) -> bool {
    cookies
        .get(&VoteMarker::name_for(poll_id))
        .is_some_and(|cookie| VoteMarker::blocks(poll_id, cookie.value(), OffsetDateTime::now_utc()))
}

pub fn marker_cookie(marker: &VoteMarker) -> Cookie<'static> {
    Cookie::build((marker.name(), marker.encode()))
        .path("/")
        .max_age(Duration::hours(VOTE_MARKER_TTL_HOURS))
        .build()
}

pub fn set_marker(cookies: &CookieJar<'_>, marker: &VoteMarker) {
    cookies.add(marker_cookie(marker));
}
