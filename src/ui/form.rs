use iced::widget::{text, text_input};
use iced::Length;

use crate::ui::{color, Column, Container, Element, TextInput, Theme};

/// The state of a form input: its current value, whether it satisfies its
/// rule, and the message to display under it when it does not. The warning is
/// owned by the value so availability checks can surface the message the
/// service returned.
#[derive(Debug, Clone)]
pub struct Value<T> {
    pub value: T,
    pub warning: Option<String>,
    pub valid: bool,
}

impl std::default::Default for Value<String> {
    fn default() -> Self {
        Self {
            value: "".to_string(),
            warning: None,
            valid: true,
        }
    }
}

pub struct Form<'a, Message> {
    input: TextInput<'a, Message>,
    warning: Option<&'a str>,
    valid: bool,
}

impl<'a, Message: 'a> Form<'a, Message>
where
    Message: Clone,
{
    /// Creates a new [`Form`].
    ///
    /// It expects:
    /// - a placeholder
    /// - the current value
    /// - a function that produces a message when the [`Form`] changes
    pub fn new<F>(placeholder: &str, value: &'a Value<String>, on_change: F) -> Self
    where
        F: 'static + Fn(String) -> Message,
    {
        Self {
            input: text_input(placeholder, &value.value).on_input(on_change),
            warning: value.warning.as_deref(),
            valid: value.valid,
        }
    }

    /// Creates a new [`Form`] that has a disabled input.
    pub fn new_disabled(placeholder: &str, value: &'a Value<String>) -> Self {
        Self {
            input: text_input(placeholder, &value.value),
            warning: value.warning.as_deref(),
            valid: value.valid,
        }
    }

    /// Creates a new [`Form`] that trims input values before applying the
    /// `on_change` function.
    pub fn new_trimmed<F>(placeholder: &str, value: &'a Value<String>, on_change: F) -> Self
    where
        F: 'static + Fn(String) -> Message,
    {
        Self {
            input: text_input(placeholder, &value.value)
                .on_input(move |s| on_change(s.trim().to_string())),
            warning: value.warning.as_deref(),
            valid: value.valid,
        }
    }

    /// Masks the input content, for password entry.
    pub fn secure(mut self) -> Self {
        self.input = self.input.secure(true);
        self
    }

    /// Sets the fallback warning message, used when the value carries none.
    pub fn warning(mut self, warning: &'a str) -> Self {
        if self.warning.is_none() {
            self.warning = Some(warning);
        }
        self
    }

    /// Sets the padding of the [`Form`].
    pub fn padding(mut self, units: u16) -> Self {
        self.input = self.input.padding(units);
        self
    }

    /// Sets the [`Form`] with a text size
    pub fn size(mut self, size: u16) -> Self {
        self.input = self.input.size(size);
        self
    }
}

impl<'a, Message: 'a + Clone> From<Form<'a, Message>> for Element<'a, Message> {
    fn from(form: Form<'a, Message>) -> Element<'a, Message> {
        Container::new(
            Column::new()
                .push(if !form.valid {
                    form.input.style(|theme: &Theme, status| {
                        let mut style = text_input::default(theme, status);
                        style.border.color = color::RED;
                        style
                    })
                } else {
                    form.input
                })
                .push_maybe(if !form.valid {
                    form.warning
                        .map(|message| text(message.to_string()).size(14).color(color::RED))
                } else {
                    None
                })
                .width(Length::Fill)
                .spacing(5),
        )
        .width(Length::Fill)
        .into()
    }
}
