//! Static HTML export of the board, using the class names of the web page the
//! board was first built for. Every piece of user or server text goes through
//! [`escape_html`].

use std::fmt::Write as _;

use crate::{
    controller::{CardList, StatusMessage, Tone, ViewState, LOADING_TEXT, LOAD_FAILED_TEXT},
    view::{
        ActivityCard, ParticipantsSection, SelectOption, NO_PARTICIPANTS_TEXT, PARTICIPANTS_TITLE,
    },
};

const TRASH_ICON: &str = concat!(
    r#"<svg width="14" height="14" viewBox="0 0 24 24" fill="none" aria-hidden="true">"#,
    r#"<path d="M3 6h18" stroke="currentColor" stroke-width="2" stroke-linecap="round"/>"#,
    r#"<path d="M8 6v12a2 2 0 0 0 2 2h4a2 2 0 0 0 2-2V6" stroke="currentColor" stroke-width="2"/>"#,
    r#"<path d="M10 11v6M14 11v6" stroke="currentColor" stroke-width="2" stroke-linecap="round"/>"#,
    r#"</svg>"#,
);

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_board(state: &ViewState) -> String {
    let mut out = String::new();
    out.push_str("<section id=\"activities-list\">");
    out.push_str(&render_card_list(state.cards()));
    out.push_str("</section>\n");
    let _ = write!(
        out,
        "<select id=\"activity\">{}</select>\n",
        render_options(state.options(), &state.form.activity)
    );
    out.push_str(&render_message(state.message()));
    out.push('\n');
    out
}

pub fn render_card_list(cards: &CardList) -> String {
    match cards {
        CardList::Pending => format!("<p>{LOADING_TEXT}</p>"),
        CardList::LoadFailed => format!("<p class=\"no-participants\">{LOAD_FAILED_TEXT}</p>"),
        CardList::Cards(cards) => cards.iter().map(render_card).collect(),
    }
}

fn render_card(card: &ActivityCard) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"activity-card\"><h4>{}</h4><div>{}</div><div class=\"meta\">{}</div>",
        escape_html(&card.name),
        escape_html(&card.description),
        escape_html(&card.schedule_line),
    );
    if let Some(badge) = card.spots_badge() {
        let _ = write!(out, "<span class=\"badge\">{badge}</span>");
    }
    let _ = write!(
        out,
        "<div class=\"participants\"><h5>{PARTICIPANTS_TITLE}</h5>"
    );
    match &card.participants {
        ParticipantsSection::Empty => {
            let _ = write!(out, "<div class=\"no-participants\">{NO_PARTICIPANTS_TEXT}</div>");
        }
        ParticipantsSection::Rows(rows) => {
            out.push_str("<ul>");
            for row in rows {
                let _ = write!(
                    out,
                    "<li class=\"participant-item\"><span class=\"participant-email\">{}</span>\
                     <button class=\"participant-remove\" aria-label=\"{}\" title=\"{}\">{TRASH_ICON}</button></li>",
                    escape_html(&row.email),
                    escape_html(&row.remove_label),
                    escape_html(&row.remove_title),
                );
            }
            out.push_str("</ul>");
        }
    }
    out.push_str("</div></div>");
    out
}

pub fn render_options(options: &[SelectOption], selected: &str) -> String {
    options
        .iter()
        .map(|option| {
            let selected_attr = if option.value == selected {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{}\"{selected_attr}>{}</option>",
                escape_html(&option.value),
                escape_html(&option.label)
            )
        })
        .collect()
}

pub fn render_message(message: Option<&StatusMessage>) -> String {
    match message {
        None => "<div id=\"message\" class=\"hidden\"></div>".to_string(),
        Some(StatusMessage { text, tone }) => {
            let class = match tone {
                Tone::Ok => "msg-ok",
                Tone::Err => "msg-err",
            };
            format!(
                "<div id=\"message\" class=\"{class}\">{}</div>",
                escape_html(text)
            )
        }
    }
}
