use iced::widget::{button, text};
use iced::{Alignment, Length, Task};
use tracing::warn;

use crate::{
    dir::AppDirectory,
    services::auth::{api::Profile, session::Session},
    ui::{color, Column, Container, Element, Row},
};

/// The authenticated landing view.
pub struct HomePanel {
    profile: Profile,
    directory: AppDirectory,
}

#[derive(Debug, Clone)]
pub enum Message {
    Logout,
    // Handled by the upper level wrapping the panel.
    LoggedOut,
}

impl HomePanel {
    pub fn new(profile: Profile, directory: AppDirectory) -> Self {
        Self { profile, directory }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Logout => {
                // Clearing the cache is local only, the service keeps no
                // session state of its own.
                if let Err(e) = Session::clear(&self.directory) {
                    warn!("{}", e);
                }
                Task::perform(async {}, |_| Message::LoggedOut)
            }
            Message::LoggedOut => Task::none(),
        }
    }

    pub fn view(&self) -> Element<Message> {
        let mut identity = Row::new()
            .push(text(self.profile.username.clone()).size(20))
            .spacing(10)
            .align_y(Alignment::Center);
        if self.profile.role {
            identity = identity.push(text("Administrator").size(14).color(color::GREEN));
        }

        let mut content = Column::new()
            .push(text("Welcome back").size(30))
            .push(identity)
            .push(text(self.profile.email.clone()).size(16).color(color::GREY));

        if let Some(organization) = &self.profile.organization {
            content = content.push(
                text(format!("Organization: {}", organization))
                    .size(16)
                    .color(color::GREY),
            );
        }

        content = content
            .push(
                button(text("Logout"))
                    .style(button::secondary)
                    .padding(15)
                    .on_press(Message::Logout),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logout_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let directory = AppDirectory::new(dir.path().to_path_buf());
        std::fs::write(
            dir.path().join(crate::services::auth::session::SESSION_CACHE_FILENAME),
            br#"{ "token": "sometoken" }"#,
        )
        .unwrap();

        let profile = Profile {
            username: "ada1815".to_string(),
            email: "ada@example.com".to_string(),
            organization: Some("Acme".to_string()),
            role: true,
        };
        let mut panel = HomePanel::new(profile, directory.clone());
        let _ = panel.update(Message::Logout);

        assert!(Session::from_cache(&directory).unwrap().is_none());
    }
}
