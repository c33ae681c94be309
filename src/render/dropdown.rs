//! Dropdown (`<select>`) rendering and its navigation state machine.

use tracing::debug;

use super::{count_suffix, escape_html, escape_url, DEFAULT_DROPDOWN_TITLE, SHOW_SELECTION_LABEL};
use crate::domain::{BlockAttributes, Term, TermForest};

const INDENT: &str = "&#8212; ";

/// Title shown in the placeholder option and as accessible label.
pub fn dropdown_title(attrs: &BlockAttributes) -> &str {
    if attrs.dropdown_title.is_empty() {
        DEFAULT_DROPDOWN_TITLE
    } else {
        &attrs.dropdown_title
    }
}

pub fn render_dropdown(
    forest: &TermForest,
    attrs: &BlockAttributes,
    hierarchical: bool,
    link: &dyn Fn(&Term) -> String,
) -> String {
    let title = escape_html(dropdown_title(attrs));

    let placeholder = if attrs.dropdown_link.is_empty() {
        format!(r#"<option value="" aria-hidden="true">-- {title} --</option>"#)
    } else {
        format!(
            r#"<option value="{}">-- {title} --</option>"#,
            escape_url(&attrs.dropdown_link)
        )
    };

    let options: String = forest
        .iter()
        .map(|(_, node)| {
            let indent = if hierarchical {
                INDENT.repeat(node.depth)
            } else {
                String::new()
            };
            format!(
                r#"<option value="{}">{}{}{}</option>"#,
                escape_url(&link(&node.term)),
                indent,
                escape_html(&node.term.name),
                count_suffix(&node.term, attrs.show_count)
            )
        })
        .collect();

    let button = if attrs.show_dropdown_button {
        format!(r#"<button type="button" class="taxnav-select-button">{SHOW_SELECTION_LABEL}</button>"#)
    } else {
        String::new()
    };
    let auto_navigate = if attrs.show_dropdown_button { "0" } else { "1" };

    format!(
        concat!(
            r#"<div class="taxnav-dropdown"><label class="screen-reader-text">{title}</label>"#,
            r#"<select class="taxnav-select" data-auto-navigate="{auto}" aria-label="{title}">{placeholder}{options}</select>"#,
            "{button}</div>"
        ),
        title = title,
        auto = auto_navigate,
        placeholder = placeholder,
        options = options,
        button = button
    )
}

/// Where the dropdown is in its select/confirm/navigate cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownState {
    Idle,
    Selected(String),
    AwaitingConfirm(String),
    Navigated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownEvent {
    /// An option with this value was chosen
    Select(String),
    /// The confirm control was activated
    Trigger,
}

/// Viewer-side behavior of a rendered dropdown.
///
/// Without a confirm control a non-empty selection navigates at once. With one,
/// navigation happens only on trigger, to the value selected at that moment. An
/// empty value never navigates.
#[derive(Debug, Clone)]
pub struct DropdownController {
    confirm_control: bool,
    /// Value the select currently shows, initially the placeholder's
    current: String,
    state: DropdownState,
}

impl DropdownController {
    pub fn new(confirm_control: bool, placeholder_value: impl Into<String>) -> Self {
        Self {
            confirm_control,
            current: placeholder_value.into(),
            state: DropdownState::Idle,
        }
    }

    pub fn for_attrs(attrs: &BlockAttributes) -> Self {
        Self::new(attrs.show_dropdown_button, attrs.dropdown_link.clone())
    }

    pub fn state(&self) -> &DropdownState {
        &self.state
    }

    /// Apply an event; returns the navigation target when it navigates.
    pub fn handle(&mut self, event: DropdownEvent) -> Option<String> {
        if matches!(self.state, DropdownState::Navigated(_)) {
            return None;
        }
        match event {
            DropdownEvent::Select(value) => {
                self.current = value.clone();
                if self.confirm_control {
                    self.state = DropdownState::AwaitingConfirm(value);
                    None
                } else if value.is_empty() {
                    self.state = DropdownState::Selected(value);
                    None
                } else {
                    self.navigate()
                }
            }
            DropdownEvent::Trigger => {
                if !self.confirm_control || self.current.is_empty() {
                    debug!("trigger ignored");
                    return None;
                }
                self.navigate()
            }
        }
    }

    fn navigate(&mut self) -> Option<String> {
        self.state = DropdownState::Navigated(self.current.clone());
        Some(self.current.clone())
    }
}
