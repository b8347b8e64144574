use iced::widget::{button, text};
use iced::{Alignment, Length, Task};
use tracing::warn;

use crate::{
    dir::AppDirectory,
    gui::Error,
    services::auth::{
        api::{Credentials, Profile},
        client::AuthClient,
        session::Session,
    },
    ui::{color, form, Column, Container, Element},
};

/// The login form. On creation it first probes the session cache: a stored,
/// unexpired token whose profile fetch succeeds skips the form entirely.
pub struct LoginPanel {
    client: AuthClient,
    directory: AppDirectory,
    checking_cache: bool,
    username: form::Value<String>,
    password: form::Value<String>,
    processing: bool,
    warning: Option<Error>,
}

#[derive(Debug, Clone)]
pub enum Message {
    CachedSession(Option<Profile>),
    UsernameEdited(String),
    PasswordEdited(String),
    Submit,
    Connected(Result<Profile, Error>),
    // Both handled by the upper level wrapping the panel.
    CreateAccountPressed,
    LoggedIn(Profile),
}

impl LoginPanel {
    pub fn new(client: AuthClient, directory: AppDirectory) -> (Self, Task<Message>) {
        (
            Self {
                client: client.clone(),
                directory: directory.clone(),
                checking_cache: true,
                username: form::Value::default(),
                password: form::Value::default(),
                processing: false,
                warning: None,
            },
            Task::perform(
                connect_with_cached_session(client, directory),
                Message::CachedSession,
            ),
        )
    }

    fn ready(&self) -> bool {
        !self.username.value.is_empty()
            && !self.password.value.is_empty()
            && !self.processing
            && !self.checking_cache
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CachedSession(profile) => {
                self.checking_cache = false;
                match profile {
                    Some(profile) => {
                        Task::perform(async move { profile }, Message::LoggedIn)
                    }
                    // No usable session, ask the user to authenticate.
                    None => Task::none(),
                }
            }
            Message::UsernameEdited(value) => {
                self.username.value = value;
                self.username.valid = !self.username.value.is_empty();
                Task::none()
            }
            Message::PasswordEdited(value) => {
                self.password.value = value;
                self.password.valid = !self.password.value.is_empty();
                Task::none()
            }
            Message::Submit => {
                if !self.ready() {
                    return Task::none();
                }
                self.processing = true;
                self.warning = None;
                let client = self.client.clone();
                let directory = self.directory.clone();
                let credentials = Credentials {
                    username: self.username.value.clone(),
                    password: self.password.value.clone(),
                };
                Task::perform(connect(client, directory, credentials), Message::Connected)
            }
            Message::Connected(res) => {
                self.processing = false;
                match res {
                    Ok(profile) => Task::perform(async move { profile }, Message::LoggedIn),
                    Err(e) => {
                        warn!("{}", e);
                        self.warning = Some(e);
                        Task::none()
                    }
                }
            }
            Message::CreateAccountPressed | Message::LoggedIn(_) => Task::none(),
        }
    }

    pub fn view(&self) -> Element<Message> {
        let username = form::Form::new_trimmed("Username", &self.username, Message::UsernameEdited)
            .size(16)
            .padding(15);

        let password = form::Form::new("Password", &self.password, Message::PasswordEdited)
            .size(16)
            .padding(15)
            .secure();

        let submit = if self.ready() {
            button(text("Login"))
                .style(button::primary)
                .width(Length::Fill)
                .padding(15)
                .on_press(Message::Submit)
        } else {
            button(text(if self.processing || self.checking_cache {
                "Processing..."
            } else {
                "Login"
            }))
            .style(button::secondary)
            .width(Length::Fill)
            .padding(15)
        };

        let content = Column::new()
            .push(text("Sign In").size(30))
            .push_maybe(
                self.warning
                    .as_ref()
                    .map(|e| text(e.to_string()).size(14).color(color::RED)),
            )
            .push(username)
            .push(password)
            .push(submit)
            .push(
                button(text("Create an account").size(14))
                    .style(button::text)
                    .on_press_maybe(if self.processing {
                        None
                    } else {
                        Some(Message::CreateAccountPressed)
                    }),
            )
            .align_x(Alignment::Center)
            .spacing(10)
            .max_width(500);

        Container::new(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}

async fn connect_with_cached_session(
    client: AuthClient,
    directory: AppDirectory,
) -> Option<Profile> {
    let session = match Session::from_cache(&directory) {
        Ok(Some(session)) => session,
        Ok(None) => return None,
        Err(e) => {
            warn!("{}", e);
            return None;
        }
    };
    if session.is_expired(chrono::Utc::now().timestamp()) {
        return None;
    }
    match client.get_profile(&session.token).await {
        // `success: false` means the token is not a login token (e.g. a
        // leftover register token), fall back to the form silently.
        Ok(response) if response.success => response.profile,
        Ok(_) => None,
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

async fn connect(
    client: AuthClient,
    directory: AppDirectory,
    credentials: Credentials,
) -> Result<Profile, Error> {
    let response = client.login(&credentials).await?;
    if !response.success {
        return Err(Error::Api(response.message.unwrap_or_else(|| {
            "Invalid username or password".to_string()
        })));
    }
    let token = response
        .token
        .ok_or_else(|| Error::Api("Missing token in response".to_string()))?;
    let session = Session::new(token);
    session.store(&directory).await?;

    let profile = client.get_profile(&session.token).await?;
    if !profile.success {
        return Err(Error::Api(profile.message.unwrap_or_else(|| {
            "Failed to fetch the profile".to_string()
        })));
    }
    profile
        .profile
        .ok_or_else(|| Error::Api("Missing profile in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> LoginPanel {
        let client = AuthClient::new("http://localhost:8080".to_string());
        let directory = AppDirectory::new(std::env::temp_dir().join("turnstile-login-tests"));
        let (panel, _) = LoginPanel::new(client, directory);
        panel
    }

    fn profile() -> Profile {
        Profile {
            username: "ada1815".to_string(),
            email: "ada@example.com".to_string(),
            organization: Some("Acme".to_string()),
            role: false,
        }
    }

    #[test]
    fn not_ready_until_cache_checked_and_filled() {
        let mut panel = panel();
        assert!(!panel.ready());

        let _ = panel.update(Message::UsernameEdited("ada1815".to_string()));
        let _ = panel.update(Message::PasswordEdited("Engine99!".to_string()));
        // The cache probe is still in flight.
        assert!(!panel.ready());

        let _ = panel.update(Message::CachedSession(None));
        assert!(panel.ready());
    }

    #[test]
    fn failed_login_shows_warning_and_reenables() {
        let mut panel = panel();
        let _ = panel.update(Message::CachedSession(None));
        let _ = panel.update(Message::UsernameEdited("ada1815".to_string()));
        let _ = panel.update(Message::PasswordEdited("Engine99!".to_string()));

        let _ = panel.update(Message::Submit);
        assert!(panel.processing);
        assert!(!panel.ready());

        let _ = panel.update(Message::Connected(Err(Error::Api(
            "Invalid username or password".to_string(),
        ))));
        assert!(!panel.processing);
        assert!(panel.warning.is_some());
        assert!(panel.ready());
    }

    #[test]
    fn successful_login_clears_warning() {
        let mut panel = panel();
        let _ = panel.update(Message::CachedSession(None));
        let _ = panel.update(Message::UsernameEdited("ada1815".to_string()));
        let _ = panel.update(Message::PasswordEdited("Engine99!".to_string()));

        let _ = panel.update(Message::Submit);
        let _ = panel.update(Message::Connected(Ok(profile())));
        assert!(!panel.processing);
        assert!(panel.warning.is_none());
    }
}
