use rocket::form::{self, DataField, FromForm, Options, ValueField};
use shared::{validation::option_field_index, MAX_OPTIONS};

/// Posted poll creation form: `poll` plus any of `option1..option42`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPollForm {
    pub question: String,
    /// One entry per slot, blank where the field was absent.
    pub options: Vec<String>,
}

pub struct NewPollContext {
    question: Option<String>,
    options: Vec<String>,
}

#[rocket::async_trait]
impl<'r> FromForm<'r> for NewPollForm {
    type Context = NewPollContext;

    fn init(_opts: Options) -> Self::Context {
        NewPollContext {
            question: None,
            options: vec![String::new(); MAX_OPTIONS],
        }
    }

    fn push_value(ctxt: &mut Self::Context, field: ValueField<'r>) {
        let name = field.name.key_lossy().as_str();
        if name == "poll" {
            ctxt.question = Some(field.value.to_string());
        } else if let Some(index) = option_field_index(name) {
            ctxt.options[index.get() - 1] = field.value.to_string();
        }
    }

    async fn push_data(_ctxt: &mut Self::Context, _field: DataField<'r, '_>) {}

    fn finalize(ctxt: Self::Context) -> form::Result<'r, Self> {
        let question = ctxt
            .question
            .ok_or_else(|| form::Error::validation("missing poll question"))?;
        Ok(NewPollForm {
            question,
            options: ctxt.options,
        })
    }
}

#[derive(Debug, rocket::FromForm)]
pub struct VoteForm {
    pub option: String,
}

#[derive(Debug, rocket::FromForm)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
