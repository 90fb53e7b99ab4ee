use rocket::http::RawStr;
use rocket::response::content::RawHtml;
use shared::{PollDisplay, PollSummary, MAX_OPTIONS};

fn esc(text: &str) -> String {
    RawStr::new(text).html_escape().into_owned()
}

fn layout(title: &str, body: &str) -> RawHtml<String> {
    RawHtml(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n<body>\n{}\n</body>\n</html>\n",
        esc(title),
        body
    ))
}

fn logout_button() -> &'static str {
    "<form class=\"logout\" method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>"
}

pub fn index(username: &str, polls: &[PollSummary]) -> RawHtml<String> {
    let rows: String = polls
        .iter()
        .map(|p| {
            format!(
                "<li><a href=\"/polls/{}\">{}</a> <span class=\"count\">{} votes</span></li>\n",
                p.id,
                esc(&p.question),
                p.total_votes
            )
        })
        .collect();
    let list = if rows.is_empty() {
        "<p>No polls yet.</p>".to_string()
    } else {
        format!("<ul class=\"polls\">\n{rows}</ul>")
    };

    layout(
        "Polls",
        &format!(
            "<header><p>Logged in as <strong>{}</strong></p>{}</header>\n\
             <h1>Polls</h1>\n{}\n<p><a href=\"/polls\">Create a poll</a></p>",
            esc(username),
            logout_button(),
            list
        ),
    )
}

pub fn new_poll() -> RawHtml<String> {
    let inputs: String = (1..=MAX_OPTIONS)
        .map(|i| format!("<input type=\"text\" name=\"option{i}\" placeholder=\"Option {i}\">\n"))
        .collect();
    layout(
        "New poll",
        &format!(
            "<h1>New poll</h1>\n<form method=\"post\" action=\"/polls\">\n\
             <input type=\"text\" name=\"poll\" placeholder=\"Question\" required>\n\
             {inputs}<button type=\"submit\">Create</button>\n</form>\n\
             <p><a href=\"/\">Back</a></p>"
        ),
    )
}

pub fn show_poll(poll: &PollDisplay) -> RawHtml<String> {
    let choices: String = poll
        .options
        .iter()
        .map(|o| format!("<option value=\"option{}\">{}</option>\n", o.index, esc(&o.text)))
        .collect();
    let tally: String = poll
        .options
        .iter()
        .map(|o| format!("<tr><td>{}</td><td>{}</td></tr>\n", esc(&o.text), o.votes))
        .collect();

    layout(
        &poll.question,
        &format!(
            "<h1>{}</h1>\n<form method=\"post\" action=\"/vote/{}\">\n\
             <select name=\"option\">\n{}</select>\n<button type=\"submit\">Vote</button>\n</form>\n\
             <table class=\"tally\">\n{}</table>\n<p><a href=\"/\">Back</a></p>",
            esc(&poll.question),
            poll.id,
            choices,
            tally
        ),
    )
}

fn credentials_form(title: &str, action: &str, alternative: &str) -> RawHtml<String> {
    layout(
        title,
        &format!(
            "<h1>{title}</h1>\n<form method=\"post\" action=\"{action}\">\n\
             <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
             <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
             <button type=\"submit\">{title}</button>\n</form>\n<p>{alternative}</p>"
        ),
    )
}

pub fn login() -> RawHtml<String> {
    credentials_form("Log in", "/login", "No account? <a href=\"/signup\">Sign up</a>")
}

pub fn signup() -> RawHtml<String> {
    credentials_form("Sign up", "/signup", "Have an account? <a href=\"/login\">Log in</a>")
}
