use medchat_protocol::Notice;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }
.notice { padding: .5rem .75rem; border-radius: 4px; margin-bottom: .5rem; }
.notice.success { background: #e6f4ea; color: #1e4620; }
.notice.error { background: #fce8e6; color: #611a15; }
form.auth label { display: block; margin-top: .75rem; }
#log { border: 1px solid #ccc; border-radius: 4px; min-height: 12rem; padding: .5rem; margin-bottom: .5rem; }
#log p { margin: .25rem 0; }
#log .user { font-weight: 600; }
"#;

const CHAT_SCRIPT: &str = r#"
const form = document.getElementById('chat');
const log = document.getElementById('log');
function append(cls, text) {
  const p = document.createElement('p');
  p.className = cls;
  p.textContent = text;
  log.appendChild(p);
}
form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const input = form.elements['message'];
  const message = input.value;
  append('user', message);
  input.value = '';
  const resp = await fetch('/chat', { method: 'POST', body: new URLSearchParams({ message }) });
  const data = await resp.json();
  append('bot', data.response);
});
"#;

pub(crate) fn login_page(notices: &[Notice]) -> String {
    auth_page(
        "Log in",
        "/login",
        notices,
        r#"<p>No account yet? <a href="/signup">Sign up</a></p>"#,
    )
}

pub(crate) fn signup_page(notices: &[Notice]) -> String {
    auth_page(
        "Sign up",
        "/signup",
        notices,
        r#"<p>Already registered? <a href="/login">Log in</a></p>"#,
    )
}

pub(crate) fn home_page(notices: &[Notice], user: Option<&str>) -> String {
    let greeting = match user {
        Some(user) => format!("<p>Signed in as <strong>{}</strong></p>", escape_html(user)),
        None => String::new(),
    };
    let body = format!(
        r#"<h1>Medical Q&amp;A Chat</h1>
{greeting}
<div id="log"></div>
<form id="chat">
  <input name="message" autocomplete="off" placeholder="Ask a medical question" size="48">
  <button type="submit">Send</button>
</form>
<form method="post" action="/logout"><button type="submit">Log out</button></form>
<script>{script}</script>"#,
        script = CHAT_SCRIPT
    );
    layout("Chat", notices, &body)
}

fn auth_page(title: &str, action: &str, notices: &[Notice], footer: &str) -> String {
    let body = format!(
        r#"<h1>{title}</h1>
<form class="auth" method="post" action="{action}">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <p><button type="submit">{title}</button></p>
</form>
{footer}"#
    );
    layout(title, notices, &body)
}

fn layout(title: &str, notices: &[Notice], body: &str) -> String {
    let notices: String = notices
        .iter()
        .map(|notice| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                notice.level.as_str(),
                escape_html(&notice.message)
            )
        })
        .collect();
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>MedChat · {title}</title><style>{style}</style></head>
<body>
{notices}
{body}
</body>
</html>
"#,
        style = STYLE
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
