pub mod home;
pub mod login;
pub mod register;

use iced::Task;
use tracing::{error, info};

use crate::{
    config::Config,
    dir::AppDirectory,
    services::auth::{client::AuthClient, client::AuthError, session::SessionError},
    ui::Element,
    VERSION,
};

/// Failures surfaced to the user by the panels.
#[derive(Debug, Clone)]
pub enum Error {
    /// Transport failure or non-2xx HTTP status.
    Auth(AuthError),
    /// The service resolved the call but reported a failure.
    Api(String),
    /// Session cache file error.
    Session(SessionError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "Connection error: {}", e),
            Self::Api(e) => write!(f, "{}", e),
            Self::Session(e) => write!(f, "Session file error: {}", e),
        }
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<SessionError> for Error {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

pub struct Gui {
    panel: Panel,
    client: AuthClient,
    directory: AppDirectory,
}

pub enum Panel {
    Login(login::LoginPanel),
    Register(register::RegisterPanel),
    Home(home::HomePanel),
}

#[derive(Debug)]
pub enum Message {
    CtrlC,
    Login(login::Message),
    Register(register::Message),
    Home(home::Message),
}

async fn ctrl_c() -> Result<(), ()> {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{}", e);
    };
    info!("Signal received, exiting");
    Ok(())
}

impl Gui {
    pub fn title(&self) -> String {
        format!("Turnstile v{}", VERSION)
    }

    pub fn new((config, directory): (Config, AppDirectory)) -> (Gui, Task<Message>) {
        let client = AuthClient::new(config.api_url().to_string());
        let (panel, task) = login::LoginPanel::new(client.clone(), directory.clone());
        (
            Gui {
                panel: Panel::Login(panel),
                client,
                directory,
            },
            Task::batch(vec![
                Task::perform(ctrl_c(), |_| Message::CtrlC),
                task.map(Message::Login),
            ]),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CtrlC => iced::window::get_latest().and_then(iced::window::close),
            Message::Login(login::Message::CreateAccountPressed) => {
                let (panel, task) =
                    register::RegisterPanel::new(self.client.clone(), self.directory.clone());
                self.panel = Panel::Register(panel);
                task.map(Message::Register)
            }
            Message::Login(login::Message::LoggedIn(profile)) => {
                self.panel = Panel::Home(home::HomePanel::new(profile, self.directory.clone()));
                Task::none()
            }
            Message::Login(msg) => match &mut self.panel {
                Panel::Login(panel) => panel.update(msg).map(Message::Login),
                _ => Task::none(),
            },
            Message::Register(register::Message::LeaveToLogin) => {
                let (panel, task) =
                    login::LoginPanel::new(self.client.clone(), self.directory.clone());
                self.panel = Panel::Login(panel);
                task.map(Message::Login)
            }
            Message::Register(msg) => match &mut self.panel {
                Panel::Register(panel) => panel.update(msg).map(Message::Register),
                _ => Task::none(),
            },
            Message::Home(home::Message::LoggedOut) => {
                let (panel, task) =
                    login::LoginPanel::new(self.client.clone(), self.directory.clone());
                self.panel = Panel::Login(panel);
                task.map(Message::Login)
            }
            Message::Home(msg) => match &mut self.panel {
                Panel::Home(panel) => panel.update(msg).map(Message::Home),
                _ => Task::none(),
            },
        }
    }

    pub fn view(&self) -> Element<Message> {
        match &self.panel {
            Panel::Login(panel) => panel.view().map(Message::Login),
            Panel::Register(panel) => panel.view().map(Message::Register),
            Panel::Home(panel) => panel.view().map(Message::Home),
        }
    }
}
