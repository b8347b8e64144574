use std::time::Duration;

use iced::widget::{button, pick_list, scrollable, text};
use iced::{Alignment, Length, Task};
use tracing::warn;

use crate::{
    dir::AppDirectory,
    gui::Error,
    services::auth::{
        api::{ApiResult, NewOrganization, RegisterUser},
        client::{AuthClient, AuthError},
        session::Session,
    },
    ui::{color, form, Column, Container, Element, Row},
    validation::{self, FieldKind},
};

/// Delay before leaving for the login view after a successful registration.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

const NEW_ORGANIZATION_LABEL: &str = "New organization...";

/// Entry of the organization picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationChoice {
    New,
    Existing(String),
}

impl std::fmt::Display for OrganizationChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "{}", NEW_ORGANIZATION_LABEL),
            Self::Existing(name) => write!(f, "{}", name),
        }
    }
}

/// The submission state machine. Any failure goes back to `Editing` with the
/// fields re-enabled. `CreatingOrganization` is entered only when a new
/// organization is selected, and always precedes `RegisteringUser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Editing,
    CreatingOrganization,
    RegisteringUser,
    Redirecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// The page-level message/style pair reflecting the outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
}

impl Feedback {
    fn success(text: String) -> Self {
        Self {
            kind: FeedbackKind::Success,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            kind: FeedbackKind::Error,
            text,
        }
    }
}

#[derive(Default)]
pub struct RegistrationForm {
    pub firstname: form::Value<String>,
    pub lastname: form::Value<String>,
    pub email: form::Value<String>,
    pub username: form::Value<String>,
    pub password: form::Value<String>,
    pub confirm: form::Value<String>,
}

impl RegistrationForm {
    fn value_mut(&mut self, kind: FieldKind) -> Option<&mut form::Value<String>> {
        match kind {
            FieldKind::FirstName => Some(&mut self.firstname),
            FieldKind::LastName => Some(&mut self.lastname),
            FieldKind::Email => Some(&mut self.email),
            FieldKind::Username => Some(&mut self.username),
            FieldKind::Password => Some(&mut self.password),
            FieldKind::Confirm => Some(&mut self.confirm),
            FieldKind::Organization => None,
        }
    }

    fn all_valid(&self) -> bool {
        [
            &self.firstname,
            &self.lastname,
            &self.email,
            &self.username,
            &self.password,
            &self.confirm,
        ]
        .iter()
        .all(|field| field.valid && !field.value.is_empty())
    }
}

#[derive(Default)]
pub struct NewOrganizationForm {
    pub name: form::Value<String>,
    pub location: form::Value<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    OrganizationsLoaded(Result<Vec<String>, Error>),
    FieldEdited(FieldKind, String),
    OrganizationSelected(OrganizationChoice),
    NewOrganizationNameEdited(String),
    NewOrganizationLocationEdited(String),
    UsernameChecked(String, Result<ApiResult, AuthError>),
    EmailChecked(String, Result<ApiResult, AuthError>),
    OrganizationChecked(String, Result<ApiResult, AuthError>),
    Submit,
    OrganizationCreated(Result<String, Error>),
    Registered(Result<String, Error>),
    LeaveToLogin,
}

/// The registration form controller.
pub struct RegisterPanel {
    client: AuthClient,
    fields: RegistrationForm,
    organizations: Vec<String>,
    choice: Option<OrganizationChoice>,
    new_organization: NewOrganizationForm,
    stage: Stage,
    feedback: Option<Feedback>,
    // Error while requesting the register token or the organization list.
    warning: Option<Error>,
}

impl RegisterPanel {
    pub fn new(client: AuthClient, directory: AppDirectory) -> (Self, Task<Message>) {
        (
            Self {
                client: client.clone(),
                fields: RegistrationForm::default(),
                organizations: Vec::new(),
                choice: None,
                new_organization: NewOrganizationForm::default(),
                stage: Stage::Editing,
                feedback: None,
                warning: None,
            },
            Task::perform(
                load_organizations(client, directory),
                Message::OrganizationsLoaded,
            ),
        )
    }

    /// Whether the form can be submitted: every field satisfies its rule,
    /// passwords match, an organization is selected and no submission is in
    /// flight.
    pub fn ready_to_submit(&self) -> bool {
        if self.stage != Stage::Editing {
            return false;
        }
        let organization = match &self.choice {
            Some(OrganizationChoice::New) => {
                let new = &self.new_organization;
                new.name.valid
                    && !new.name.value.is_empty()
                    && new.location.valid
                    && !new.location.value.is_empty()
            }
            Some(OrganizationChoice::Existing(_)) => true,
            None => false,
        };
        self.fields.all_valid()
            && self.fields.password.value == self.fields.confirm.value
            && organization
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OrganizationsLoaded(res) => {
                match res {
                    Ok(organizations) => {
                        self.organizations = organizations;
                        self.warning = None;
                    }
                    Err(e) => {
                        warn!("{}", e);
                        self.warning = Some(e);
                    }
                }
                Task::none()
            }
            Message::FieldEdited(kind, value) => self.on_field_edited(kind, value),
            Message::OrganizationSelected(choice) => {
                if self.stage == Stage::Editing {
                    self.choice = Some(choice);
                }
                Task::none()
            }
            Message::NewOrganizationNameEdited(value) => self.on_organization_name_edited(value),
            Message::NewOrganizationLocationEdited(value) => {
                if self.stage == Stage::Editing {
                    let location = &mut self.new_organization.location;
                    location.value = value;
                    location.valid = !location.value.is_empty();
                    location.warning = if location.valid {
                        None
                    } else {
                        Some("A location is required".to_string())
                    };
                }
                Task::none()
            }
            Message::UsernameChecked(value, res) => {
                if value == self.fields.username.value {
                    apply_availability(&mut self.fields.username, res);
                }
                Task::none()
            }
            Message::EmailChecked(value, res) => {
                if value == self.fields.email.value {
                    apply_availability(&mut self.fields.email, res);
                }
                Task::none()
            }
            Message::OrganizationChecked(value, res) => {
                if value == self.new_organization.name.value {
                    apply_availability(&mut self.new_organization.name, res);
                }
                Task::none()
            }
            Message::Submit => self.on_submit(),
            Message::OrganizationCreated(res) => self.on_organization_created(res),
            Message::Registered(res) => self.on_registered(res),
            // Handled by the upper level wrapping the panel.
            Message::LeaveToLogin => Task::none(),
        }
    }

    fn on_field_edited(&mut self, kind: FieldKind, value: String) -> Task<Message> {
        if self.stage != Stage::Editing {
            return Task::none();
        }
        let password = self.fields.password.value.clone();
        if let Some(field) = self.fields.value_mut(kind) {
            field.value = value;
            match validation::validate(kind, &field.value, &password) {
                Ok(()) => {
                    field.valid = true;
                    field.warning = None;
                }
                Err(e) => {
                    field.valid = false;
                    field.warning = Some(e.to_string());
                }
            }
        } else {
            return Task::none();
        }

        // Editing the password revalidates the confirmation.
        if kind == FieldKind::Password && !self.fields.confirm.value.is_empty() {
            let password = self.fields.password.value.clone();
            let confirm = &mut self.fields.confirm;
            match validation::validate(FieldKind::Confirm, &confirm.value, &password) {
                Ok(()) => {
                    confirm.valid = true;
                    confirm.warning = None;
                }
                Err(e) => {
                    confirm.valid = false;
                    confirm.warning = Some(e.to_string());
                }
            }
        }

        // Live availability feedback, observed independently of submission.
        match kind {
            FieldKind::Username if self.fields.username.valid => {
                let client = self.client.clone();
                let value = self.fields.username.value.clone();
                Task::perform(
                    async move {
                        let res = client.check_username(&value).await;
                        (value, res)
                    },
                    |(value, res)| Message::UsernameChecked(value, res),
                )
            }
            FieldKind::Email if self.fields.email.valid => {
                let client = self.client.clone();
                let value = self.fields.email.value.clone();
                Task::perform(
                    async move {
                        let res = client.check_email(&value).await;
                        (value, res)
                    },
                    |(value, res)| Message::EmailChecked(value, res),
                )
            }
            _ => Task::none(),
        }
    }

    fn on_organization_name_edited(&mut self, value: String) -> Task<Message> {
        if self.stage != Stage::Editing {
            return Task::none();
        }
        let name = &mut self.new_organization.name;
        name.value = value;
        name.valid = !name.value.is_empty();
        name.warning = if name.valid {
            None
        } else {
            Some("An organization name is required".to_string())
        };

        if name.valid {
            let client = self.client.clone();
            let value = name.value.clone();
            Task::perform(
                async move {
                    let res = client.check_organization(&value).await;
                    (value, res)
                },
                |(value, res)| Message::OrganizationChecked(value, res),
            )
        } else {
            Task::none()
        }
    }

    fn on_submit(&mut self) -> Task<Message> {
        if !self.ready_to_submit() {
            return Task::none();
        }
        self.feedback = None;
        let client = self.client.clone();
        match self.choice.clone() {
            Some(OrganizationChoice::New) => {
                self.stage = Stage::CreatingOrganization;
                let organization = NewOrganization {
                    organizationname: self.new_organization.name.value.clone(),
                    location: self.new_organization.location.value.clone(),
                };
                Task::perform(
                    create_organization(client, organization),
                    Message::OrganizationCreated,
                )
            }
            Some(OrganizationChoice::Existing(name)) => {
                self.stage = Stage::RegisteringUser;
                let user = self.registration_payload(name, false);
                Task::perform(register_user(client, user), Message::Registered)
            }
            None => Task::none(),
        }
    }

    fn on_organization_created(&mut self, result: Result<String, Error>) -> Task<Message> {
        if self.stage != Stage::CreatingOrganization {
            return Task::none();
        }
        match result {
            Ok(name) => {
                // The account is tied to the name the service stored, and its
                // creator becomes the organization administrator.
                self.stage = Stage::RegisteringUser;
                let user = self.registration_payload(name, true);
                let client = self.client.clone();
                Task::perform(register_user(client, user), Message::Registered)
            }
            Err(e) => {
                warn!("{}", e);
                self.stage = Stage::Editing;
                self.feedback = Some(Feedback::error(e.to_string()));
                Task::none()
            }
        }
    }

    fn on_registered(&mut self, result: Result<String, Error>) -> Task<Message> {
        if self.stage != Stage::RegisteringUser {
            return Task::none();
        }
        match result {
            Ok(message) => {
                self.stage = Stage::Redirecting;
                self.feedback = Some(Feedback::success(message));
                Task::perform(
                    async {
                        tokio::time::sleep(REDIRECT_DELAY).await;
                    },
                    |_| Message::LeaveToLogin,
                )
            }
            Err(e) => {
                warn!("{}", e);
                self.stage = Stage::Editing;
                self.feedback = Some(Feedback::error(e.to_string()));
                Task::none()
            }
        }
    }

    fn registration_payload(&self, organization: String, admin: bool) -> RegisterUser {
        RegisterUser {
            firstname: self.fields.firstname.value.clone(),
            lastname: self.fields.lastname.value.clone(),
            email: self.fields.email.value.clone(),
            username: self.fields.username.value.clone(),
            password: self.fields.password.value.clone(),
            role: admin,
            organization,
        }
    }

    pub fn view(&self) -> Element<Message> {
        let processing = self.stage != Stage::Editing;

        let name_row = Row::new()
            .push(
                Container::new(
                    form::Form::new("First Name", &self.fields.firstname, |v| {
                        Message::FieldEdited(FieldKind::FirstName, v)
                    })
                    .size(16)
                    .padding(15),
                )
                .width(Length::FillPortion(1)),
            )
            .push(
                Container::new(
                    form::Form::new("Last Name", &self.fields.lastname, |v| {
                        Message::FieldEdited(FieldKind::LastName, v)
                    })
                    .size(16)
                    .padding(15),
                )
                .width(Length::FillPortion(1)),
            )
            .spacing(12);

        let email = form::Form::new_trimmed("Email Address", &self.fields.email, |v| {
            Message::FieldEdited(FieldKind::Email, v)
        })
        .size(16)
        .padding(15);

        let username = form::Form::new_trimmed("Username", &self.fields.username, |v| {
            Message::FieldEdited(FieldKind::Username, v)
        })
        .size(16)
        .padding(15);

        let password = form::Form::new("Password", &self.fields.password, |v| {
            Message::FieldEdited(FieldKind::Password, v)
        })
        .size(16)
        .padding(15)
        .secure();

        let confirm = form::Form::new("Confirm Password", &self.fields.confirm, |v| {
            Message::FieldEdited(FieldKind::Confirm, v)
        })
        .size(16)
        .padding(15)
        .secure();

        let choices: Vec<OrganizationChoice> = std::iter::once(OrganizationChoice::New)
            .chain(
                self.organizations
                    .iter()
                    .cloned()
                    .map(OrganizationChoice::Existing),
            )
            .collect();
        let organization = pick_list(choices, self.choice.clone(), Message::OrganizationSelected)
            .placeholder("Organization")
            .padding(15)
            .width(Length::Fill);

        let submit = if self.ready_to_submit() {
            button(text("Create Account"))
                .style(button::primary)
                .width(Length::Fill)
                .padding(15)
                .on_press(Message::Submit)
        } else {
            button(text(if processing && self.stage != Stage::Redirecting {
                "Processing..."
            } else {
                "Create Account"
            }))
            .style(button::secondary)
            .width(Length::Fill)
            .padding(15)
        };

        let mut content = Column::new()
            .push(text("Create an Account").size(30))
            .push_maybe(self.warning.as_ref().map(|e| {
                text(format!("Connection failed: {}", e))
                    .size(14)
                    .color(color::RED)
            }))
            .push(name_row)
            .push(email)
            .push(username)
            .push(password)
            .push(confirm)
            .push(organization);

        if matches!(self.choice, Some(OrganizationChoice::New)) {
            content = content
                .push(
                    form::Form::new(
                        "Organization Name",
                        &self.new_organization.name,
                        Message::NewOrganizationNameEdited,
                    )
                    .size(16)
                    .padding(15),
                )
                .push(
                    form::Form::new(
                        "Location",
                        &self.new_organization.location,
                        Message::NewOrganizationLocationEdited,
                    )
                    .size(16)
                    .padding(15),
                );
        }

        content = content
            .push_maybe(self.feedback.as_ref().map(|feedback| {
                text(feedback.text.clone())
                    .size(14)
                    .color(match feedback.kind {
                        FeedbackKind::Success => color::GREEN,
                        FeedbackKind::Error => color::RED,
                    })
            }))
            .push(submit)
            .push(
                button(text("Back to Login").size(14))
                    .style(button::text)
                    .on_press_maybe(if processing {
                        None
                    } else {
                        Some(Message::LeaveToLogin)
                    }),
            )
            .align_x(Alignment::Center)
            .spacing(10)
            .max_width(500);

        Container::new(scrollable(content))
            .center_x(Length::Fill)
            .padding(50)
            .into()
    }
}

async fn load_organizations(
    client: AuthClient,
    directory: AppDirectory,
) -> Result<Vec<String>, Error> {
    let response = client.create_register_token().await?;
    if !response.success {
        return Err(Error::Api(
            "The service refused to issue a registration token".to_string(),
        ));
    }
    let token = response
        .token
        .ok_or_else(|| Error::Api("Missing token in response".to_string()))?;
    let session = Session::new(token);
    session.store(&directory).await?;

    // The organization listing is gated behind the register token.
    let organizations = client.get_organizations(&session.token).await?;
    if !organizations.success {
        return Err(Error::Api(organizations.message.unwrap_or_else(|| {
            "Failed to list organizations".to_string()
        })));
    }
    Ok(organizations.organ_list)
}

async fn create_organization(
    client: AuthClient,
    organization: NewOrganization,
) -> Result<String, Error> {
    let response = client.create_organization(&organization).await?;
    if !response.success {
        return Err(Error::Api(response.message.unwrap_or_else(|| {
            "Failed to create the organization".to_string()
        })));
    }
    response
        .organization
        .map(|o| o.organizationname)
        .ok_or_else(|| Error::Api("Missing organization in response".to_string()))
}

async fn register_user(client: AuthClient, user: RegisterUser) -> Result<String, Error> {
    let response = client.register_user(&user).await?;
    if response.success {
        Ok(response
            .message
            .unwrap_or_else(|| "Account created".to_string()))
    } else {
        Err(Error::Api(response.message.unwrap_or_else(|| {
            "Registration failed".to_string()
        })))
    }
}

fn apply_availability(field: &mut form::Value<String>, res: Result<ApiResult, AuthError>) {
    match res {
        Ok(result) => {
            if result.success {
                field.valid = true;
                field.warning = None;
            } else {
                field.valid = false;
                field.warning = result
                    .message
                    .or_else(|| Some("Already taken".to_string()));
            }
        }
        // Availability feedback is advisory, a transport failure does not
        // block editing.
        Err(e) => {
            warn!("{}", e);
        }
    }
}
