use rocket::{Request, catch, serde::json::Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorMessage {
    error: String,
    status: u16,
}

fn first_segment<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    req.uri().path().segments().next()
}

fn message(error: &str, status: u16) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: error.into(),
        status,
    })
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorMessage> {
    message("Invalid request parameters.", 400)
}

/// A form that was posted but could not be read into its fields.
#[catch(422)]
pub fn unprocessable(req: &Request) -> Json<ErrorMessage> {
    let error = match first_segment(req) {
        Some("polls") => "A new poll needs a `poll` question field.",
        Some("vote") => "Pick one of the poll's options to vote for.",
        Some("login" | "signup") => "Both username and password are required.",
        _ => "Missing or malformed form fields.",
    };
    message(error, 422)
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorMessage> {
    let error = match first_segment(req) {
        Some("static") => "No such static asset.",
        _ => "The requested page was not found.",
    };
    message(error, 404)
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorMessage> {
    message("An internal server error occurred.", 500)
}
