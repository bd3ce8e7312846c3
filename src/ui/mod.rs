//! Server-rendered chat page.

use handlebars::Handlebars;
use serde::Serialize;
use uuid::Uuid;

use crate::config::SubmitMode;
use crate::session::{Message, Session};

const CHAT_TEMPLATE: &str = "chat";
const BUSY_TEMPLATE: &str = "busy";

/// Everything the chat page shows.
#[derive(Debug, Serialize)]
pub struct ChatPage<'a> {
    pub session_id: Uuid,
    pub messages: &'a [Message],
    pub has_credential: bool,
    pub on_change: bool,
    /// Pre-filled value of the input line
    pub input_value: &'a str,
}

impl<'a> ChatPage<'a> {
    /// Page for `session` after a submission of `last_input`.
    ///
    /// The button form keeps what the user typed; the on-change input is
    /// cleared after dispatch.
    pub fn new(session: &'a Session, mode: SubmitMode, last_input: &'a str) -> Self {
        let on_change = mode == SubmitMode::OnChange;
        Self {
            session_id: session.id(),
            messages: session.messages(),
            has_credential: session.has_credential(),
            on_change,
            input_value: if on_change { "" } else { last_input },
        }
    }
}

/// Shown while another request is running a turn on the session.
#[derive(Debug, Serialize)]
pub struct BusyPage {
    pub session_id: Uuid,
}

/// Renders pages from the embedded templates.
pub struct PageRenderer {
    hb: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        let mut hb = Handlebars::new();
        hb.set_strict_mode(true);
        hb.register_template_string(CHAT_TEMPLATE, include_str!("../../templates/chat.hbs"))?;
        hb.register_template_string(BUSY_TEMPLATE, include_str!("../../templates/busy.hbs"))?;
        Ok(Self { hb })
    }

    pub fn render_chat(&self, page: &ChatPage<'_>) -> Result<String, handlebars::RenderError> {
        self.hb.render(CHAT_TEMPLATE, page)
    }

    pub fn render_busy(&self, page: &BusyPage) -> Result<String, handlebars::RenderError> {
        self.hb.render(BUSY_TEMPLATE, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Credential;
    use crate::session::GREETING;

    #[test]
    fn test_button_mode_keeps_input_and_escapes_content() {
        let renderer = PageRenderer::new().unwrap();
        let session = Session::new();

        let html = renderer
            .render_chat(&ChatPage::new(&session, SubmitMode::Button, "<b>Paris</b>"))
            .unwrap();

        assert!(html.contains(&format!("action=\"/chat/{}\"", session.id())));
        assert!(html.contains(r#"<div class="chat-message assistant">Hey! I&#x27;m ready"#));
        assert!(!html.contains(GREETING));
        assert!(html.contains("value=\"&lt;b&gt;Paris&lt;/b&gt;\""));
        assert!(html.contains("<button type=\"submit\">Search</button>"));
        assert!(!html.contains("requestSubmit"));
        assert!(!html.contains("A key is set"));
    }

    #[test]
    fn test_on_change_mode_clears_input() {
        let renderer = PageRenderer::new().unwrap();
        let mut session = Session::new();
        session.set_credential(Credential::from_input("gsk").unwrap());

        let html = renderer
            .render_chat(&ChatPage::new(&session, SubmitMode::OnChange, "typed"))
            .unwrap();

        assert!(html.contains("onchange=\"this.form.requestSubmit()\""));
        assert!(html.contains("value=\"\""));
        assert!(!html.contains("typed"));
        assert!(!html.contains("<button type=\"submit\">Search</button>"));
        assert!(html.contains("A key is set"));
        assert!(!html.contains("gsk"));
    }

    #[test]
    fn test_busy_page_refreshes_to_the_chat() {
        let renderer = PageRenderer::new().unwrap();
        let session_id = Uuid::new_v4();

        let html = renderer.render_busy(&BusyPage { session_id }).unwrap();

        assert!(html.contains(&format!("content=\"2; url=/chat/{}\"", session_id)));
        assert!(html.contains("Searching..."));
    }
}
