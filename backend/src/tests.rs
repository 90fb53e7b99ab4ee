#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::{Client, LocalResponse};
    use serde::Deserialize;
    use shared::{OptionIndex, PollDisplay, PollSummary};
    use tempfile::TempDir;

    use crate::session::PUBLIC_ENDPOINTS;

    #[derive(Debug, Deserialize)]
    struct CaughtError {
        error: String,
        status: u16,
    }

    fn client(dir: &TempDir) -> Client {
        let figment = rocket::Config::figment()
            .merge(("data_dir", dir.path()))
            .merge(("log_level", "off"));
        Client::tracked(crate::build(figment)).expect("valid rocket instance")
    }

    fn post_form<'c>(client: &'c Client, uri: &'c str, body: &str) -> LocalResponse<'c> {
        client
            .post(uri)
            .header(ContentType::Form)
            .body(body.to_string())
            .dispatch()
    }

    fn location(response: &LocalResponse<'_>) -> Option<String> {
        response.headers().get_one("Location").map(str::to_string)
    }

    fn signup_and_login(client: &Client, username: &str, password: &str) {
        let body = format!("username={username}&password={password}");
        let response = post_form(client, "/signup", &body);
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(location(&response).as_deref(), Some("/login"));
        login(client, username, password);
    }

    fn login(client: &Client, username: &str, password: &str) {
        let body = format!("username={username}&password={password}");
        let response = post_form(client, "/login", &body);
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(location(&response).as_deref(), Some("/"));
    }

    fn poll_json(client: &Client, id: u32) -> PollDisplay {
        let response = client.get(format!("/api/polls/{id}")).dispatch();
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<PollDisplay>().expect("poll json")
    }

    /// Fills a mounted route's dynamic segments with values that reach its handler.
    fn concrete_path(template: &str) -> String {
        template
            .split('/')
            .map(|segment| match segment {
                s if s.ends_with("..>") => "style.css",
                s if s.starts_with('<') => "1",
                s => s,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn caught(response: LocalResponse<'_>) -> CaughtError {
        response.into_json::<CaughtError>().expect("catcher json")
    }

    fn votes(poll: &PollDisplay, index: usize) -> u32 {
        let index = OptionIndex::new(index).unwrap();
        poll.option(index).map_or(0, |o| o.votes)
    }

    #[test]
    fn anonymous_requests_are_redirected() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);

        for uri in ["/", "/polls", "/polls/1", "/api/polls", "/nowhere"] {
            let response = client.get(uri).dispatch();
            assert_eq!(response.status(), Status::SeeOther, "GET {uri}");
            assert_eq!(location(&response).as_deref(), Some("/login"), "GET {uri}");
        }

        let response = post_form(&client, "/polls", "poll=Sneaky&option1=A");
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(location(&response).as_deref(), Some("/login"));

        signup_and_login(&client, "alice", "p1");
        let polls = client.get("/api/polls").dispatch().into_json::<Vec<PollSummary>>().unwrap();
        assert!(polls.is_empty(), "anonymous create must not run");
    }

    #[test]
    fn public_endpoints_are_reachable() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);

        for uri in ["/login", "/signup"] {
            let response = client.get(uri).dispatch();
            assert_eq!(response.status(), Status::Ok, "GET {uri}");
            assert_eq!(response.content_type(), Some(ContentType::HTML));
        }

        let response = client.get("/static/style.css").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::CSS));

        assert_eq!(client.get("/static/missing.css").dispatch().status(), Status::NotFound);
    }

    #[test]
    fn allow_list_decides_anonymous_access() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);

        let mounted: Vec<_> = client
            .rocket()
            .routes()
            .filter_map(|route| {
                let name = route.name.as_deref()?.to_string();
                Some((route.method, name, concrete_path(&route.uri.to_string())))
            })
            .filter(|(_, name, _)| !name.starts_with("login_redirect"))
            .collect();
        assert_eq!(mounted.len(), 13, "routes: {mounted:?}");

        for (method, name, path) in mounted {
            let response = client.req(method, path.clone()).header(ContentType::Form).dispatch();
            let redirected = response.status() == Status::SeeOther
                && location(&response).as_deref() == Some("/login");
            let public = PUBLIC_ENDPOINTS.contains(&name.as_str());
            assert_eq!(redirected, !public, "{method} {path} ({name})");
        }
    }

    #[test]
    fn account_errors_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");

        let response = post_form(&client, "/signup", "username=alice&password=p2");
        assert_eq!(response.status(), Status::Conflict);
        assert_eq!(response.into_string().unwrap(), "Username already exists");

        let response = post_form(&client, "/login", "username=alice&password=wrong");
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(response.into_string().unwrap(), "Wrong password");

        let response = post_form(&client, "/login", "username=bob&password=p1");
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_string().unwrap(), "Account not found");

        let response = post_form(&client, "/signup", "username=&password=x");
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[test]
    fn logout_returns_to_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");
        assert_eq!(client.get("/").dispatch().status(), Status::Ok);

        let response = client.post("/logout").dispatch();
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(location(&response).as_deref(), Some("/login"));

        assert_eq!(client.get("/").dispatch().status(), Status::SeeOther);
    }

    #[test]
    fn create_show_and_vote() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");

        let response = post_form(&client, "/polls", "poll=Best%20pet%3F&option1=Cat&option2=&option3=Dog");
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(location(&response).as_deref(), Some("/"));

        let poll = poll_json(&client, 1);
        assert_eq!(poll.question, "Best pet?");
        let shown: Vec<_> = poll.options.iter().map(|o| (o.index.get(), o.text.as_str())).collect();
        assert_eq!(shown, vec![(1, "Cat"), (3, "Dog")]);

        let page = client.get("/polls/1").dispatch();
        assert_eq!(page.status(), Status::Ok);
        let html = page.into_string().unwrap();
        assert!(html.contains("Best pet?"));
        assert!(html.contains("value=\"option3\""));

        let response = post_form(&client, "/vote/1", "option=option3");
        assert_eq!(response.status(), Status::SeeOther);
        let marker = response.cookies().get("voted_poll_1").expect("marker cookie");
        assert_eq!(marker.max_age(), Some(rocket::time::Duration::hours(24)));

        let poll = poll_json(&client, 1);
        assert_eq!(votes(&poll, 1), 0);
        assert_eq!(votes(&poll, 3), 1);

        let index = client.get("/").dispatch().into_string().unwrap();
        assert!(index.contains("href=\"/polls/1\""));
        assert!(index.contains("1 votes"));
    }

    #[test]
    fn second_vote_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");
        post_form(&client, "/polls", "poll=Q&option1=A&option2=B");

        assert_eq!(post_form(&client, "/vote/1", "option=option1").status(), Status::SeeOther);
        let response = post_form(&client, "/vote/1", "option=option2");
        assert_eq!(response.status(), Status::Forbidden);
        assert_eq!(response.into_string().unwrap(), "You have already voted for this poll");

        let poll = poll_json(&client, 1);
        assert_eq!(votes(&poll, 1), 1);
        assert_eq!(votes(&poll, 2), 0);
    }

    #[test]
    fn invalid_votes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");
        post_form(&client, "/polls", "poll=Q&option1=A&option3=C");

        for option in ["option2", "option43", "option03", "3", "banana", "0"] {
            let response = post_form(&client, "/vote/1", &format!("option={option}"));
            assert_eq!(response.status(), Status::BadRequest, "option {option}");
        }
        assert_eq!(post_form(&client, "/vote/9", "option=option1").status(), Status::NotFound);
        assert_eq!(post_form(&client, "/vote/abc", "option=option1").status(), Status::BadRequest);
        assert!(client.cookies().get("voted_poll_1").is_none());
    }

    #[test]
    fn poll_lookup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");

        assert_eq!(client.get("/polls/abc").dispatch().status(), Status::BadRequest);
        assert_eq!(client.get("/polls/0").dispatch().status(), Status::BadRequest);
        assert_eq!(client.get("/polls/4").dispatch().status(), Status::NotFound);
        assert_eq!(client.get("/api/polls/4").dispatch().status(), Status::NotFound);
        assert_eq!(client.get("/nowhere").dispatch().status(), Status::NotFound);
    }

    #[test]
    fn malformed_poll_forms() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        signup_and_login(&client, "alice", "p1");

        assert_eq!(post_form(&client, "/polls", "option1=A").status(), Status::UnprocessableEntity);
        assert_eq!(post_form(&client, "/polls", "poll=Q&option1=").status(), Status::BadRequest);
        assert_eq!(post_form(&client, "/polls", "poll=&option1=A").status(), Status::BadRequest);
    }

    #[test]
    fn catchers_explain_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);

        let error = caught(post_form(&client, "/login", "username=alice"));
        assert_eq!(error.status, 422);
        assert_eq!(error.error, "Both username and password are required.");

        let error = caught(client.get("/static/missing.css").dispatch());
        assert_eq!(error.status, 404);
        assert_eq!(error.error, "No such static asset.");

        signup_and_login(&client, "alice", "p1");
        post_form(&client, "/polls", "poll=Q&option1=A");

        let error = caught(post_form(&client, "/polls", "option1=A"));
        assert_eq!(error.status, 422);
        assert_eq!(error.error, "A new poll needs a `poll` question field.");

        let error = caught(post_form(&client, "/vote/1", "choice=option1"));
        assert_eq!(error.status, 422);
        assert_eq!(error.error, "Pick one of the poll's options to vote for.");

        let error = caught(client.get("/nowhere").dispatch());
        assert_eq!(error.status, 404);
        assert_eq!(error.error, "The requested page was not found.");
    }

    #[test]
    fn state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let client = client(&dir);
            signup_and_login(&client, "alice", "p1");
            post_form(&client, "/polls", "poll=First&option1=A");
            post_form(&client, "/polls", "poll=Second&option2=B");
            post_form(&client, "/vote/2", "option=option2");
        }

        let client = client(&dir);
        login(&client, "alice", "p1");
        let polls = client.get("/api/polls").dispatch().into_json::<Vec<PollSummary>>().unwrap();
        assert_eq!(polls.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(votes(&poll_json(&client, 2), 2), 1);

        post_form(&client, "/polls", "poll=Third&option1=C");
        assert_eq!(poll_json(&client, 3).question, "Third");
    }
}
